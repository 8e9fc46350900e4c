//! Widget placement: containers, widget instances, bindings and pruning.

use crate::config::BuilderConfig;
use crate::description::{GroupKind, InputControl, InputKind, Meta, OutputControl, OutputKind};
use crate::error::BuildError;
use crate::host::{
    BindTarget, Binding, ContainerSpec, Layout, WidgetHost, WidgetSpec, WidgetTemplate,
};
use crate::legalize::{collapse_whitespace, legal_op_name};
use crate::parameter::Parameter;

/// Name of the radio selector inside a tab group's container.
pub const TAB_SELECTOR: &str = "tabs";

/// Forced tab labels for the root instrument/effect sequencer.
pub const SEQUENCER_TABS: [&str; 2] = ["Instrument", "Effect"];

fn is_knob(meta: &Meta) -> bool {
    meta.get_all("style").any(|s| s == "knob")
}

fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items
        .map(|i| format!("'{i}'"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn tooltip_property(meta: &Meta, properties: &mut Vec<(String, String)>) {
    if let Some(tooltip) = meta.tooltip() {
        properties.push(("Help".to_string(), collapse_whitespace(tooltip)));
    }
}

/// Copy the master widget for an input control and bind it to its parameter.
pub fn place_input<W: WidgetHost>(
    host: &mut W,
    container: W::Id,
    control: &InputControl,
    parameter: &Parameter,
    index: usize,
    config: &BuilderConfig,
) -> Result<W::Id, BuildError> {
    let knob = is_knob(&control.meta);
    let template = match control.kind {
        InputKind::VSlider if knob => WidgetTemplate::Knob,
        InputKind::HSlider if knob => WidgetTemplate::Knob,
        InputKind::Checkbox if knob => WidgetTemplate::Knob,
        InputKind::VSlider => WidgetTemplate::SliderVertical,
        InputKind::HSlider => WidgetTemplate::SliderHorizontal,
        InputKind::Button => WidgetTemplate::Button,
        InputKind::Checkbox => WidgetTemplate::Checkbox,
        InputKind::NEntry => WidgetTemplate::DropMenu,
    };

    let label = &parameter.label;
    let mut properties = Vec::new();
    match template {
        WidgetTemplate::Knob => properties.push(("Knoblabel".to_string(), label.clone())),
        WidgetTemplate::SliderVertical | WidgetTemplate::SliderHorizontal => {
            properties.push(("Sliderlabelnames".to_string(), format!("\"{label}\"")));
        }
        WidgetTemplate::Button => {
            properties.push(("Buttonofflabel".to_string(), label.clone()));
            properties.push(("Buttononlabel".to_string(), label.clone()));
        }
        WidgetTemplate::DropMenu => {
            let items = parameter.menu_items().unwrap_or_default();
            properties.push((
                "Menunames".to_string(),
                quoted_list(items.iter().map(|i| i.name.as_str())),
            ));
            properties.push((
                "Menulabels".to_string(),
                quoted_list(items.iter().map(|i| i.label.as_str())),
            ));
        }
        _ => {}
    }
    tooltip_property(&control.meta, &mut properties);

    let id = host.create_widget(
        container,
        WidgetSpec {
            template,
            name: parameter.name.clone(),
            x: index as i64 * config.node_spacing,
            properties,
        },
    )?;
    host.set_binding(
        id,
        Binding::TwoWay {
            target: BindTarget::Value,
            expression: format!("op(\"{}\").par.{}", config.operator_path, parameter.name),
        },
    )?;
    Ok(id)
}

/// Copy a bar graph and drive it from the live output value, remapped to 0..1.
pub fn place_output<W: WidgetHost>(
    host: &mut W,
    container: W::Id,
    control: &OutputControl,
    address: &str,
    index: usize,
    config: &BuilderConfig,
) -> Result<W::Id, BuildError> {
    let name = control.label.rsplit('/').next().unwrap_or(&control.label);
    let orient = match control.kind {
        OutputKind::HBargraph => "horz",
        OutputKind::VBargraph => "vert",
    };
    let mut properties = vec![
        ("Sliderorient".to_string(), orient.to_string()),
        ("Sliderlabelnames".to_string(), format!("\"{}\"", control.label)),
    ];
    tooltip_property(&control.meta, &mut properties);

    let id = host.create_widget(
        container,
        WidgetSpec {
            template: WidgetTemplate::BarGraph,
            name: legal_op_name(name),
            x: index as i64 * config.node_spacing,
            properties,
        },
    )?;
    host.set_binding(
        id,
        Binding::ReadOnly {
            target: BindTarget::Value,
            expression: format!(
                "tdu.remap(op(\"{}\").op(\"info1\")[\"{address}\"], {}, {}, 0, 1)",
                config.operator_path, control.min, control.max
            ),
        },
    )?;
    Ok(id)
}

pub fn place_header<W: WidgetHost>(
    host: &mut W,
    container: W::Id,
    label: &str,
    index: usize,
    config: &BuilderConfig,
) -> Result<W::Id, BuildError> {
    host.create_widget(
        container,
        WidgetSpec {
            template: WidgetTemplate::Header,
            name: legal_op_name(&label.replace('/', "_")),
            x: index as i64 * config.node_spacing,
            properties: vec![("Headerlabel".to_string(), label.to_string())],
        },
    )
}

/// Container holding a group's children, laid out along the group's axis.
pub fn open_group<W: WidgetHost>(
    host: &mut W,
    container: W::Id,
    kind: GroupKind,
    label: &str,
    index: usize,
    config: &BuilderConfig,
) -> Result<W::Id, BuildError> {
    let layout = match kind {
        GroupKind::HGroup => Layout::Horizontal,
        GroupKind::VGroup => Layout::Vertical,
        GroupKind::TGroup => Layout::TabRadio,
    };
    host.create_container(
        container,
        ContainerSpec {
            name: legal_op_name(&label.replace('/', "_")),
            layout,
            x: index as i64 * config.node_spacing,
            align_order: None,
        },
    )
}

/// Per-child wrapper inside a group container.
pub fn open_slot<W: WidgetHost>(
    host: &mut W,
    group: W::Id,
    label: &str,
    index: usize,
    config: &BuilderConfig,
) -> Result<W::Id, BuildError> {
    host.create_container(
        group,
        ContainerSpec {
            name: legal_op_name(&label.replace('/', "_")),
            layout: Layout::Vertical,
            x: index as i64 * config.node_spacing,
            align_order: Some(index),
        },
    )
}

pub fn open_tab_selector<W: WidgetHost>(host: &mut W, group: W::Id) -> Result<W::Id, BuildError> {
    host.create_widget(
        group,
        WidgetSpec {
            template: WidgetTemplate::TabSelector,
            name: TAB_SELECTOR.to_string(),
            x: 0,
            properties: Vec::new(),
        },
    )
}

/// Show `page` only while the selector picks `tab`.
pub fn bind_tab_page<W: WidgetHost>(host: &mut W, page: W::Id, tab: usize) -> Result<(), BuildError> {
    host.set_binding(
        page,
        Binding::ReadOnly {
            target: BindTarget::Display,
            expression: format!("op(\"../{TAB_SELECTOR}\").par.Value0 == {tab}"),
        },
    )
}

/// Fill in the selector's options, or remove it when no page survived.
pub fn finish_tab_selector<W: WidgetHost>(
    host: &mut W,
    selector: W::Id,
    labels: &[String],
) -> Result<(), BuildError> {
    if labels.is_empty() {
        return host.destroy(selector);
    }
    let names: Vec<String> = labels.iter().map(|l| legal_op_name(l)).collect();
    host.set_property(selector, "Menunames", &quoted_list(names.iter().map(String::as_str)))?;
    host.set_property(selector, "Menulabels", &quoted_list(labels.iter().map(String::as_str)))
}

/// Whether a container holds nothing but (at most) a bare header.
pub fn is_trivial<W: WidgetHost>(host: &W, container: W::Id) -> bool {
    match host.children(container).as_slice() {
        [] => true,
        [only] => host.template(*only) == Some(WidgetTemplate::Header),
        _ => false,
    }
}

/// Destroy `container` if it ended up trivial. Returns whether it survived.
pub fn prune<W: WidgetHost>(host: &mut W, container: W::Id) -> Result<bool, BuildError> {
    if is_trivial(host, container) {
        log::debug!("pruning empty container {container:?}");
        host.destroy(container)?;
        Ok(false)
    } else {
        Ok(true)
    }
}
