//! Host custom parameters derived from input controls.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::description::{InputControl, InputKind};
use crate::legalize::collapse_whitespace;

/// A custom parameter on the operator's control page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub label: String,
    /// Tooltip text, whitespace-collapsed.
    pub help: Option<String>,
    pub kind: ParKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ParKind {
    Float(FloatRange),
    Pulse,
    Toggle { default: bool },
    Menu { items: Vec<MenuItem>, default: usize },
}

/// Numeric range with hard clamping at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FloatRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub clamp_min: bool,
    pub clamp_max: bool,
}

impl FloatRange {
    pub fn clamped(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
            clamp_min: true,
            clamp_max: true,
        }
    }

    pub fn clamp(&self, value: f64) -> f64 {
        let mut v = value;
        if self.clamp_min && v < self.min {
            v = self.min;
        }
        if self.clamp_max && v > self.max {
            v = self.max;
        }
        v
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub name: String,
    pub label: String,
    pub value: f64,
}

impl Parameter {
    /// Derive the parameter for an input control under an allocated name.
    pub fn from_control(name: String, control: &InputControl) -> Self {
        let range = control.range;
        let kind = match control.kind {
            InputKind::HSlider | InputKind::VSlider => {
                ParKind::Float(FloatRange::clamped(range.min, range.max, range.init))
            }
            InputKind::Button => ParKind::Pulse,
            InputKind::Checkbox => ParKind::Toggle {
                default: range.init != 0.0,
            },
            InputKind::NEntry => {
                let items = control
                    .meta
                    .get_all("style")
                    .find_map(menu_from_style)
                    .unwrap_or_else(|| menu_from_range(range.min, range.max, range.step));
                let default = items
                    .iter()
                    .position(|item| item.value == range.init)
                    .unwrap_or(0);
                ParKind::Menu { items, default }
            }
        };

        Self {
            name,
            label: control.label.clone(),
            help: control.meta.tooltip().map(collapse_whitespace),
            kind,
        }
    }

    pub fn menu_items(&self) -> Option<&[MenuItem]> {
        match &self.kind {
            ParKind::Menu { items, .. } => Some(items),
            _ => None,
        }
    }
}

/// Upper bound on the entries of a range-derived menu.
pub const MAX_MENU_ITEMS: usize = 1024;

/// Enumerate a regular numeric sequence: `floor((max - min) / step) + 1`
/// items, each capped at `max`, truncated to [`MAX_MENU_ITEMS`]
/// entries.
pub fn menu_from_range(min: f64, max: f64, step: f64) -> Vec<MenuItem> {
    let count = if step > 0.0 && max >= min {
        let steps = ((max - min) / step).floor();
        if steps.is_finite() && steps < MAX_MENU_ITEMS as f64 {
            steps as usize + 1
        } else {
            log::warn!(
                "menu range {min}..{max} step {step} exceeds {MAX_MENU_ITEMS} items, truncating"
            );
            MAX_MENU_ITEMS
        }
    } else {
        if step <= 0.0 {
            log::warn!("menu step {step} is not positive, using a single item");
        }
        1
    };

    (0..count)
        .map(|i| {
            let value = (min + step * i as f64).min(max);
            let text = format_value(value);
            MenuItem {
                name: text.clone(),
                label: text,
                value,
            }
        })
        .collect()
}

static MENU_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:'|_)(.+?)(?:'|_):([-+]?[0-9]*\.?[0-9]+?)").unwrap());

/// Parse an explicit `menu{'Label':value;...}` style annotation. Returns
/// `None` when the style is not a menu or names no entries.
pub fn menu_from_style(style: &str) -> Option<Vec<MenuItem>> {
    if !style.contains("menu") {
        return None;
    }
    let items: Vec<MenuItem> = MENU_ENTRY
        .captures_iter(style)
        .filter_map(|caps| {
            let label = caps.get(1)?.as_str();
            let value = caps.get(2)?.as_str().parse().ok()?;
            Some(MenuItem {
                name: label.replace(' ', "_"),
                label: label.to_string(),
                value,
            })
        })
        .collect();
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// Integral values print without a fractional part.
fn format_value(value: f64) -> String {
    format!("{value}")
}
