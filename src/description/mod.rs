//! UI description documents emitted by the Faust compiler.
//!
//! Both the JSON dialect and the legacy XML dialect are read into the same
//! typed tree: every node is exactly one of an input control, an output
//! read-out, a group or a soundfile pass-through.

mod json;
mod legacy;
pub mod xml;

use serde::Serialize;

use crate::error::BuildError;

/// A parsed UI description.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UiDescription {
    pub name: Option<String>,
    pub inputs: Option<u32>,
    pub outputs: Option<u32>,
    pub meta: Meta,
    pub ui: Vec<UiNode>,
}

impl UiDescription {
    /// Parse either dialect. Documents whose first non-blank character is
    /// `<` are read as XML.
    pub fn parse(text: &str) -> Result<Self, BuildError> {
        if text.trim_start().starts_with('<') {
            Self::parse_xml(text)
        } else {
            Self::parse_json(text)
        }
    }

    pub fn parse_json(text: &str) -> Result<Self, BuildError> {
        json::parse(text)
    }

    pub fn parse_xml(text: &str) -> Result<Self, BuildError> {
        legacy::parse(text)
    }

    /// Every address-bearing node, pre-order.
    pub fn addresses(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for node in &self.ui {
            node.collect_addresses(&mut out);
        }
        out
    }
}

/// One node of the UI tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum UiNode {
    Input(InputControl),
    Output(OutputControl),
    Group(Group),
    Soundfile(Soundfile),
}

impl UiNode {
    /// The compiler's name for this node type.
    pub fn type_name(&self) -> &'static str {
        match self {
            UiNode::Input(c) => c.kind.type_name(),
            UiNode::Output(c) => c.kind.type_name(),
            UiNode::Group(g) => g.kind.type_name(),
            UiNode::Soundfile(_) => "soundfile",
        }
    }

    pub fn label(&self) -> &str {
        match self {
            UiNode::Input(c) => &c.label,
            UiNode::Output(c) => &c.label,
            UiNode::Group(g) => &g.label,
            UiNode::Soundfile(s) => &s.label,
        }
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            UiNode::Input(c) => Some(&c.address),
            UiNode::Output(c) => Some(&c.address),
            UiNode::Group(_) => None,
            UiNode::Soundfile(s) => s.address.as_deref(),
        }
    }

    fn collect_addresses<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            UiNode::Input(c) => out.push(&c.address),
            UiNode::Output(c) => out.push(&c.address),
            UiNode::Soundfile(_) => {}
            UiNode::Group(g) => {
                for item in &g.items {
                    item.collect_addresses(out);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Button,
    Checkbox,
    NEntry,
    HSlider,
    VSlider,
}

impl InputKind {
    pub fn type_name(self) -> &'static str {
        match self {
            InputKind::Button => "button",
            InputKind::Checkbox => "checkbox",
            InputKind::NEntry => "nentry",
            InputKind::HSlider => "hslider",
            InputKind::VSlider => "vslider",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    HBargraph,
    VBargraph,
}

impl OutputKind {
    pub fn type_name(self) -> &'static str {
        match self {
            OutputKind::HBargraph => "hbargraph",
            OutputKind::VBargraph => "vbargraph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKind {
    HGroup,
    VGroup,
    TGroup,
}

impl GroupKind {
    pub fn type_name(self) -> &'static str {
        match self {
            GroupKind::HGroup => "hgroup",
            GroupKind::VGroup => "vgroup",
            GroupKind::TGroup => "tgroup",
        }
    }
}

/// Classification of a compiler type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeType {
    Input(InputKind),
    Output(OutputKind),
    Group(GroupKind),
    Soundfile,
}

impl NodeType {
    pub(crate) fn from_name(name: &str) -> Result<Self, BuildError> {
        Ok(match name {
            "button" => NodeType::Input(InputKind::Button),
            "checkbox" => NodeType::Input(InputKind::Checkbox),
            "nentry" => NodeType::Input(InputKind::NEntry),
            "hslider" => NodeType::Input(InputKind::HSlider),
            "vslider" => NodeType::Input(InputKind::VSlider),
            "hbargraph" => NodeType::Output(OutputKind::HBargraph),
            "vbargraph" => NodeType::Output(OutputKind::VBargraph),
            "hgroup" => NodeType::Group(GroupKind::HGroup),
            "vgroup" => NodeType::Group(GroupKind::VGroup),
            "tgroup" => NodeType::Group(GroupKind::TGroup),
            "soundfile" => NodeType::Soundfile,
            other => return Err(BuildError::unknown_widget(other)),
        })
    }
}

/// Numeric facets of a leaf control. Absent facets are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub init: f64,
}

/// A user-editable control: button, checkbox, number entry or slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputControl {
    pub kind: InputKind,
    pub label: String,
    pub address: String,
    pub range: Range,
    pub meta: Meta,
}

/// A read-only DSP output (bar graph).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputControl {
    pub kind: OutputKind,
    pub label: String,
    pub address: String,
    pub min: f64,
    pub max: f64,
    pub meta: Meta,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub kind: GroupKind,
    pub label: String,
    pub meta: Meta,
    pub items: Vec<UiNode>,
}

/// Soundfile slots carry no host parameter and are passed over.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Soundfile {
    pub label: String,
    pub address: Option<String>,
    pub url: Option<String>,
}

/// Ordered `[key: value]` annotations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Meta(pub Vec<(String, String)>);

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.push((key.into(), value.into()));
    }

    /// All values for `key`, in document order.
    pub fn get_all<'a, 'k>(&'a self, key: &'k str) -> impl Iterator<Item = &'a str> + 'k
    where
        'a: 'k,
    {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Last value for `key`; later annotations win.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn style(&self) -> Option<&str> {
        self.get("style")
    }

    pub fn tooltip(&self) -> Option<&str> {
        self.get("tooltip")
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a numeric facet the way older compilers wrote them: plain numbers,
/// or C float literals with a trailing `f`.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let text = text.strip_suffix(['f', 'F']).unwrap_or(text);
    text.parse().ok().filter(|v: &f64| v.is_finite())
}
