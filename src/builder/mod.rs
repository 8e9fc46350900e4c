//! UI builder: turns a UI description into custom parameters, a widget panel and
//! rename table.
//!
//! One [`UiBuilder::build_ui`] call tears down whatever the previous call
//! created and rebuilds it from the description:
//!
//! - every distinct leaf address becomes one [`Widget`]; input controls
//!   additionally get one custom [`Parameter`] with a unique legal name
//! - when a panel is supplied, groups become nested containers and leaves
//!   become bound widget instances; containers left with nothing useful in
//!   them are pruned
//! - finally each parameter is exported with its address so parameter
//!   changes can be routed back to DSP zones

pub mod filter;
pub mod placement;

use std::collections::HashMap;

use serde::Serialize;

use crate::config::BuilderConfig;
use crate::description::{
    Group, GroupKind, InputControl, InputKind, Meta, OutputControl, OutputKind, UiDescription,
    UiNode,
};
use crate::error::BuildError;
use crate::host::{ParameterHost, RenameSink, WidgetHost, WidgetTemplate};
use crate::legalize::{legal_address, ParNameAllocator};
use crate::parameter::Parameter;

use filter::VoiceFilter;
use placement::SEQUENCER_TABS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "kind", rename_all = "lowercase")]
pub enum WidgetKind {
    Input(InputKind),
    Output(OutputKind),
}

/// One distinct leaf control of the current pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub kind: WidgetKind,
    /// Legalized address, the dedup key.
    pub address: String,
    pub parameter: Option<Parameter>,
    pub meta: Meta,
    /// (min, max, step); zero for buttons and checkboxes.
    pub range: (f64, f64, f64),
}

/// Summary of one build pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub parameters: usize,
    pub widgets: usize,
    pub skipped: usize,
}

/// Rebuilds an operator's parameters and UI panel from a UI description.
#[derive(Debug, Clone)]
pub struct UiBuilder {
    config: BuilderConfig,
    widgets: Vec<Widget>,
    seen: HashMap<String, usize>,
    names: ParNameAllocator,
    voices: VoiceFilter,
    skipped: usize,
}

impl UiBuilder {
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            config,
            widgets: Vec::new(),
            seen: HashMap::new(),
            names: ParNameAllocator::new(),
            voices: VoiceFilter::default(),
            skipped: 0,
        }
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut BuilderConfig {
        &mut self.config
    }

    /// Widgets of the last pass, in creation order.
    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    /// Parse `text` and rebuild everything from it.
    ///
    /// Old state is torn down before parsing, so a malformed description
    /// leaves an empty operator rather than a mix of old and new. An empty
    /// description just clears. `widgets` may be `None` to build parameters
    /// without a panel.
    pub fn build_ui<P, W, R>(
        &mut self,
        text: &str,
        params: &mut P,
        mut widgets: Option<&mut W>,
        renames: &mut R,
    ) -> Result<BuildReport, BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
        R: RenameSink + ?Sized,
    {
        self.teardown(params, widgets.as_deref_mut(), renames)?;
        if text.trim().is_empty() {
            return Ok(BuildReport::default());
        }
        let description = UiDescription::parse(text)?;
        self.populate(&description, params, widgets, renames)
    }

    /// Rebuild from an already-parsed description.
    pub fn build_description<P, W, R>(
        &mut self,
        description: &UiDescription,
        params: &mut P,
        mut widgets: Option<&mut W>,
        renames: &mut R,
    ) -> Result<BuildReport, BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
        R: RenameSink + ?Sized,
    {
        self.teardown(params, widgets.as_deref_mut(), renames)?;
        self.populate(description, params, widgets, renames)
    }

    fn teardown<P, W, R>(
        &mut self,
        params: &mut P,
        widgets: Option<&mut W>,
        renames: &mut R,
    ) -> Result<(), BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
        R: RenameSink + ?Sized,
    {
        self.widgets.clear();
        self.seen.clear();
        self.names.clear();
        self.voices = VoiceFilter::default();
        self.skipped = 0;

        params.reset_page(&self.config.control_page)?;
        self.names.reserve(params.existing_names());
        if let Some(panel) = widgets {
            panel.clear()?;
        }
        renames.clear();
        Ok(())
    }

    fn populate<P, W, R>(
        &mut self,
        description: &UiDescription,
        params: &mut P,
        mut widgets: Option<&mut W>,
        renames: &mut R,
    ) -> Result<BuildReport, BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
        R: RenameSink + ?Sized,
    {
        let strip = self.config.strip_td_prefix;
        self.voices = VoiceFilter::new(
            &self.config,
            description
                .addresses()
                .into_iter()
                .map(|a| legal_address(a, strip)),
        );

        let root = widgets.as_deref().map(|panel| panel.root());
        for (i, node) in description.ui.iter().enumerate() {
            self.add_node(node, i, 0, params, widgets.as_deref_mut(), root)?;
        }

        if let (Some(panel), Some(root)) = (widgets.as_deref_mut(), root) {
            if let [only] = panel.children(root).as_slice() {
                if panel.template(*only) == Some(WidgetTemplate::Header) {
                    panel.destroy(*only)?;
                }
            }
        }

        for widget in &self.widgets {
            if let Some(parameter) = &widget.parameter {
                renames.append_row(&parameter.name, &widget.address);
            }
        }

        let report = BuildReport {
            parameters: self.widgets.iter().filter(|w| w.parameter.is_some()).count(),
            widgets: self.widgets.len(),
            skipped: self.skipped,
        };
        log::info!(
            "built {} parameters from {} widgets ({} skipped)",
            report.parameters,
            report.widgets,
            report.skipped
        );
        Ok(report)
    }

    fn add_node<P, W>(
        &mut self,
        node: &UiNode,
        index: usize,
        depth: usize,
        params: &mut P,
        panel: Option<&mut W>,
        container: Option<W::Id>,
    ) -> Result<(), BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
    {
        match node {
            UiNode::Input(control) => self.add_input(control, index, params, panel, container),
            UiNode::Output(control) => self.add_output(control, index, panel, container),
            UiNode::Group(group) => self.add_group(group, index, depth, params, panel, container),
            UiNode::Soundfile(_) => Ok(()),
        }
    }

    /// Legalize and filter a leaf address. `None` means the leaf is hidden.
    fn visible_address(&mut self, address: &str) -> Option<String> {
        let address = legal_address(address, self.config.strip_td_prefix);
        if let Some(reason) = self.voices.check(&address) {
            log::debug!("skipping {address}: {reason:?}");
            self.skipped += 1;
            return None;
        }
        Some(address)
    }

    fn add_input<P, W>(
        &mut self,
        control: &InputControl,
        index: usize,
        params: &mut P,
        panel: Option<&mut W>,
        container: Option<W::Id>,
    ) -> Result<(), BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
    {
        let Some(address) = self.visible_address(&control.address) else {
            return Ok(());
        };

        let slot = match self.seen.get(&address) {
            Some(&slot) => slot,
            None => {
                let name = self.names.allocate(&control.label);
                let parameter = Parameter::from_control(name, control);
                params.append_parameter(&self.config.control_page, &parameter)?;

                let range = match control.kind {
                    InputKind::Button | InputKind::Checkbox => (0.0, 0.0, 0.0),
                    _ => (control.range.min, control.range.max, control.range.step),
                };
                self.push_widget(Widget {
                    kind: WidgetKind::Input(control.kind),
                    address,
                    parameter: Some(parameter),
                    meta: control.meta.clone(),
                    range,
                })
            }
        };

        if let (Some(panel), Some(container)) = (panel, container) {
            if let Some(parameter) = &self.widgets[slot].parameter {
                placement::place_input(panel, container, control, parameter, index, &self.config)?;
            }
        }
        Ok(())
    }

    fn add_output<W>(
        &mut self,
        control: &OutputControl,
        index: usize,
        panel: Option<&mut W>,
        container: Option<W::Id>,
    ) -> Result<(), BuildError>
    where
        W: WidgetHost,
    {
        let Some(address) = self.visible_address(&control.address) else {
            return Ok(());
        };

        if !self.seen.contains_key(&address) {
            self.push_widget(Widget {
                kind: WidgetKind::Output(control.kind),
                address: address.clone(),
                parameter: None,
                meta: control.meta.clone(),
                range: (control.min, control.max, 0.0),
            });
        }

        if let (Some(panel), Some(container)) = (panel, container) {
            placement::place_output(panel, container, control, &address, index, &self.config)?;
        }
        Ok(())
    }

    fn push_widget(&mut self, widget: Widget) -> usize {
        let slot = self.widgets.len();
        self.seen.insert(widget.address.clone(), slot);
        self.widgets.push(widget);
        slot
    }

    fn add_group<P, W>(
        &mut self,
        group: &Group,
        index: usize,
        depth: usize,
        params: &mut P,
        mut panel: Option<&mut W>,
        container: Option<W::Id>,
    ) -> Result<(), BuildError>
    where
        P: ParameterHost + ?Sized,
        W: WidgetHost,
    {
        let structural = self.config.suppresses_header(&group.label);

        let mut inner = None;
        let mut selector = None;
        if let (Some(panel), Some(container)) = (panel.as_deref_mut(), container) {
            if !structural {
                placement::place_header(panel, container, &group.label, index, &self.config)?;
            }
            if !group.items.is_empty() {
                let id = placement::open_group(
                    panel,
                    container,
                    group.kind,
                    &group.label,
                    index,
                    &self.config,
                )?;
                if group.kind == GroupKind::TGroup {
                    selector = Some(placement::open_tab_selector(panel, id)?);
                }
                inner = Some(id);
            }
        }

        let sequencer = group.kind == GroupKind::TGroup
            && depth == 0
            && self.config.polyphony
            && group.label == self.config.sequencer_label;
        let child_depth = if structural { depth } else { depth + 1 };

        let mut tab_labels = Vec::new();
        for (j, child) in group.items.iter().enumerate() {
            let needs_slot =
                group.kind == GroupKind::TGroup || !matches!(child, UiNode::Input(_));
            let slot = match (panel.as_deref_mut(), inner) {
                (Some(panel), Some(inner)) if needs_slot => Some(placement::open_slot(
                    panel,
                    inner,
                    child.label(),
                    j,
                    &self.config,
                )?),
                _ => None,
            };

            let target = slot.or(inner).or(container);
            self.add_node(child, j, child_depth, params, panel.as_deref_mut(), target)?;

            if let (Some(panel), Some(slot)) = (panel.as_deref_mut(), slot) {
                let survived = placement::prune(panel, slot)?;
                if survived && selector.is_some() {
                    let tab = tab_labels.len();
                    placement::bind_tab_page(panel, slot, tab)?;
                    let label = match SEQUENCER_TABS.get(tab) {
                        Some(forced) if sequencer => forced.to_string(),
                        _ => child.label().to_string(),
                    };
                    tab_labels.push(label);
                }
            }
        }

        if let Some(panel) = panel.as_deref_mut() {
            if let Some(selector) = selector {
                placement::finish_tab_selector(panel, selector, &tab_labels)?;
            }
            if let Some(inner) = inner {
                placement::prune(panel, inner)?;
            }
        }
        Ok(())
    }
}
