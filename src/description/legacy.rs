//! Legacy XML dialect.
//!
//! Widgets are declared once in flat `<activewidgets>` / `<passivewidgets>`
//! lists and referenced from the `<layout>` tree by `<widgetref id>`. The
//! references are resolved here, so the builder sees the same tree shape as
//! the JSON dialect and deduplicates by address alone.

use std::collections::HashMap;

use super::xml::{parse_document, Element};
use super::{
    parse_number, Group, InputControl, Meta, NodeType, OutputControl, Range, Soundfile,
    UiDescription, UiNode,
};
use crate::error::BuildError;

pub(super) fn parse(text: &str) -> Result<UiDescription, BuildError> {
    let root = parse_document(text)?;
    let Some(ui) = root.find("ui") else {
        return Err(BuildError::parse("missing <ui> element", root.line, root.col));
    };

    let mut widgets = HashMap::new();
    for list in ["activewidgets", "passivewidgets", "soundfilewidgets"] {
        if let Some(list) = ui.child(list) {
            for widget in list.children_named("widget") {
                if let Some(id) = widget.attr("id") {
                    widgets.insert(id.to_string(), widget);
                }
            }
        }
    }

    let mut nodes = Vec::new();
    if let Some(layout) = ui.child("layout") {
        let mut path = Vec::new();
        for group in layout.children_named("group") {
            nodes.push(convert_group(group, &widgets, &mut path)?);
        }
    }

    let mut meta = Meta::new();
    for entry in root.children_named("meta") {
        if let Some(key) = entry.attr("key") {
            meta.push(key, entry.text());
        }
    }

    Ok(UiDescription {
        name: root.child_text("name").map(str::to_string),
        inputs: root.child_text("inputs").and_then(|t| t.parse().ok()),
        outputs: root.child_text("outputs").and_then(|t| t.parse().ok()),
        meta,
        ui: nodes,
    })
}

fn convert_group(
    element: &Element,
    widgets: &HashMap<String, &Element>,
    path: &mut Vec<String>,
) -> Result<UiNode, BuildError> {
    let type_name = element.attr("type").unwrap_or("vgroup");
    let NodeType::Group(kind) = NodeType::from_name(type_name)? else {
        return Err(BuildError::parse(
            format!("<group> has non-group type '{type_name}'"),
            element.line,
            element.col,
        ));
    };
    let label = element.child_text("label").unwrap_or_default().to_string();

    path.push(label.clone());
    let mut items = Vec::new();
    for child in &element.children {
        match child.name.as_str() {
            "group" => items.push(convert_group(child, widgets, path)?),
            "widgetref" => {
                let Some(id) = child.attr("id") else {
                    return Err(BuildError::parse("<widgetref> without id", child.line, child.col));
                };
                let Some(widget) = widgets.get(id) else {
                    return Err(BuildError::parse(
                        format!("<widgetref> to unknown widget '{id}'"),
                        child.line,
                        child.col,
                    ));
                };
                items.push(convert_widget(widget, path)?);
            }
            _ => {}
        }
    }
    path.pop();

    Ok(UiNode::Group(Group {
        kind,
        label,
        meta: widget_meta(element),
        items,
    }))
}

fn convert_widget(element: &Element, path: &[String]) -> Result<UiNode, BuildError> {
    let type_name = element.attr("type").unwrap_or_default();
    let node_type = NodeType::from_name(type_name)?;
    let label = element.child_text("label").unwrap_or_default().to_string();
    let address = format!("/{}", path.iter().chain([&label]).cloned().collect::<Vec<_>>().join("/"));
    let meta = widget_meta(element);

    Ok(match node_type {
        NodeType::Input(kind) => UiNode::Input(InputControl {
            kind,
            range: Range {
                min: facet(element, "min")?,
                max: facet(element, "max")?,
                step: facet(element, "step")?,
                init: facet(element, "init")?,
            },
            label,
            address,
            meta,
        }),
        NodeType::Output(kind) => UiNode::Output(OutputControl {
            kind,
            min: facet(element, "min")?,
            max: facet(element, "max")?,
            label,
            address,
            meta,
        }),
        NodeType::Soundfile => UiNode::Soundfile(Soundfile {
            url: element.child_text("url").map(str::to_string),
            label,
            address: Some(address),
        }),
        NodeType::Group(_) => {
            return Err(BuildError::parse(
                format!("<widget> has group type '{type_name}'"),
                element.line,
                element.col,
            ))
        }
    })
}

fn facet(element: &Element, name: &str) -> Result<f64, BuildError> {
    let Some(child) = element.child(name) else {
        return Ok(0.0);
    };
    parse_number(child.text()).ok_or_else(|| {
        BuildError::parse(
            format!("invalid <{name}> value '{}'", child.text()),
            child.line,
            child.col,
        )
    })
}

fn widget_meta(element: &Element) -> Meta {
    let mut meta = Meta::new();
    for entry in element.children_named("meta") {
        if let Some(key) = entry.attr("key") {
            meta.push(key, entry.text());
        }
    }
    meta
}
