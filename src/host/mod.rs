//! Seams to the host application.
//!
//! The builder never owns the operator's parameters or its UI panel; it
//! drives them through these traits. [`memory`] provides in-process
//! implementations for tests and the command-line driver.

pub mod memory;

use std::fmt;

use serde::Serialize;

use crate::error::BuildError;
use crate::parameter::Parameter;

pub use memory::{ParameterSet, RenameRow, RenameTable, WidgetTree};

/// Custom parameter pages on the operator.
pub trait ParameterHost {
    /// Destroy the page called `page` (and every parameter on it), then
    /// append a fresh empty page with that name.
    fn reset_page(&mut self, page: &str) -> Result<(), BuildError>;

    /// Append a parameter to `page`.
    fn append_parameter(&mut self, page: &str, parameter: &Parameter) -> Result<(), BuildError>;

    /// Names of every parameter the operator already has, on any page.
    fn existing_names(&self) -> Vec<String>;
}

/// A nested panel of containers and widget instances.
pub trait WidgetHost {
    type Id: Copy + Eq + fmt::Debug;

    fn root(&self) -> Self::Id;

    /// Destroy every child of the root and reset its layout to vertical.
    fn clear(&mut self) -> Result<(), BuildError>;

    fn create_container(
        &mut self,
        parent: Self::Id,
        spec: ContainerSpec,
    ) -> Result<Self::Id, BuildError>;

    fn create_widget(&mut self, parent: Self::Id, spec: WidgetSpec)
        -> Result<Self::Id, BuildError>;

    fn set_binding(&mut self, node: Self::Id, binding: Binding) -> Result<(), BuildError>;

    /// Replace a property on an existing widget.
    fn set_property(&mut self, node: Self::Id, key: &str, value: &str) -> Result<(), BuildError>;

    fn children(&self, node: Self::Id) -> Vec<Self::Id>;

    /// The template a widget was copied from; `None` for containers.
    fn template(&self, node: Self::Id) -> Option<WidgetTemplate>;

    /// Destroy a node and everything under it.
    fn destroy(&mut self, node: Self::Id) -> Result<(), BuildError>;
}

/// Parameter name → DSP address lookup table.
pub trait RenameSink {
    fn clear(&mut self);
    fn append_row(&mut self, parameter: &str, address: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Horizontal,
    Vertical,
    /// Children stacked, one shown at a time by a tab selector.
    TabRadio,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerSpec {
    pub name: String,
    pub layout: Layout,
    pub x: i64,
    pub align_order: Option<usize>,
}

/// Master widgets the panel copies from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WidgetTemplate {
    SliderVertical,
    SliderHorizontal,
    Knob,
    Button,
    Checkbox,
    DropMenu,
    BarGraph,
    Header,
    TabSelector,
}

impl WidgetTemplate {
    /// Name of the master component in the widget library.
    pub fn source(self) -> &'static str {
        match self {
            WidgetTemplate::SliderVertical => "masterSlider_vert",
            WidgetTemplate::SliderHorizontal => "masterSlider_horz",
            WidgetTemplate::Knob => "masterKnob",
            WidgetTemplate::Button => "masterButton",
            WidgetTemplate::Checkbox => "masterCheckbox",
            WidgetTemplate::DropMenu => "masterDropMenu",
            WidgetTemplate::BarGraph => "masterBarGraph",
            WidgetTemplate::Header => "masterHeader",
            WidgetTemplate::TabSelector => "masterRadio",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetSpec {
    pub template: WidgetTemplate,
    pub name: String,
    pub x: i64,
    pub properties: Vec<(String, String)>,
}

/// Which widget parameter a binding drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BindTarget {
    Value,
    Display,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Binding {
    /// Two-way bind to an operator parameter, range included.
    TwoWay { target: BindTarget, expression: String },
    /// Evaluated expression, read only.
    ReadOnly { target: BindTarget, expression: String },
}

impl Binding {
    pub fn target(&self) -> BindTarget {
        match self {
            Binding::TwoWay { target, .. } | Binding::ReadOnly { target, .. } => *target,
        }
    }

    pub fn expression(&self) -> &str {
        match self {
            Binding::TwoWay { expression, .. } | Binding::ReadOnly { expression, .. } => {
                expression
            }
        }
    }
}
