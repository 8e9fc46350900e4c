//! JSON dialect reader.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{
    parse_number, Group, InputControl, Meta, NodeType, OutputControl, Range, Soundfile,
    UiDescription, UiNode,
};
use crate::error::BuildError;

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    inputs: Option<u32>,
    #[serde(default)]
    outputs: Option<u32>,
    #[serde(default)]
    meta: Vec<Map<String, Value>>,
    #[serde(default)]
    ui: Vec<RawNode>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    label: String,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    min: Option<Facet>,
    #[serde(default)]
    max: Option<Facet>,
    #[serde(default)]
    step: Option<Facet>,
    #[serde(default)]
    init: Option<Facet>,
    #[serde(default)]
    meta: Vec<Map<String, Value>>,
    #[serde(default)]
    items: Vec<RawNode>,
}

/// Older compilers quoted numeric facets.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Facet {
    Number(f64),
    Text(String),
}

pub(super) fn parse(text: &str) -> Result<UiDescription, BuildError> {
    let raw: RawDocument = serde_json::from_str(text)?;
    let ui = raw
        .ui
        .into_iter()
        .map(convert)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(UiDescription {
        name: raw.name,
        inputs: raw.inputs,
        outputs: raw.outputs,
        meta: convert_meta(raw.meta),
        ui,
    })
}

fn convert(raw: RawNode) -> Result<UiNode, BuildError> {
    let node_type = NodeType::from_name(&raw.kind)?;
    let meta = convert_meta(raw.meta);

    Ok(match node_type {
        NodeType::Input(kind) => {
            let range = Range {
                min: facet(&raw.min, "min", &raw.label)?,
                max: facet(&raw.max, "max", &raw.label)?,
                step: facet(&raw.step, "step", &raw.label)?,
                init: facet(&raw.init, "init", &raw.label)?,
            };
            UiNode::Input(InputControl {
                kind,
                address: required_address(raw.address, &raw.label)?,
                label: raw.label,
                range,
                meta,
            })
        }
        NodeType::Output(kind) => {
            let min = facet(&raw.min, "min", &raw.label)?;
            let max = facet(&raw.max, "max", &raw.label)?;
            UiNode::Output(OutputControl {
                kind,
                address: required_address(raw.address, &raw.label)?,
                label: raw.label,
                min,
                max,
                meta,
            })
        }
        NodeType::Group(kind) => UiNode::Group(Group {
            kind,
            label: raw.label,
            meta,
            items: raw
                .items
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>, _>>()?,
        }),
        NodeType::Soundfile => UiNode::Soundfile(Soundfile {
            label: raw.label,
            address: raw.address,
            url: raw.url,
        }),
    })
}

fn required_address(address: Option<String>, label: &str) -> Result<String, BuildError> {
    address.ok_or_else(|| BuildError::parse(format!("control '{label}' has no address"), 0, 0))
}

fn facet(value: &Option<Facet>, name: &str, label: &str) -> Result<f64, BuildError> {
    match value {
        None => Ok(0.0),
        Some(Facet::Number(n)) => Ok(*n),
        Some(Facet::Text(text)) => parse_number(text).ok_or_else(|| {
            BuildError::parse(format!("invalid {name} '{text}' on control '{label}'"), 0, 0)
        }),
    }
}

fn convert_meta(entries: Vec<Map<String, Value>>) -> Meta {
    let mut meta = Meta::new();
    for entry in entries {
        for (key, value) in entry {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            meta.push(key, value);
        }
    }
    meta
}
