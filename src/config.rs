//! Builder configuration, loaded from ~/.faust-td/builder.yaml.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Settings for one operator's UI build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderConfig {
    /// The operator runs one DSP instance per voice.
    #[serde(default)]
    pub polyphony: bool,
    /// Voices share one set of controls; gate/gain/note/freq are driven by
    /// MIDI and hidden.
    #[serde(default = "default_true")]
    pub group_voices: bool,
    /// Drop the `/TD/` group from exported addresses.
    #[serde(default = "default_true")]
    pub strip_td_prefix: bool,
    /// Custom parameter page rebuilt on every pass.
    #[serde(default = "default_control_page")]
    pub control_page: String,
    /// Operator path used in binding expressions.
    #[serde(default = "default_operator_path")]
    pub operator_path: String,
    /// Horizontal distance between sibling nodes in the network.
    #[serde(default = "default_node_spacing")]
    pub node_spacing: i64,
    /// Group labels that never get a header widget.
    #[serde(default = "default_header_suppressed")]
    pub header_suppressed: Vec<String>,
    /// Label of the root tab group holding instrument and effect.
    #[serde(default = "default_sequencer_label")]
    pub sequencer_label: String,
}

fn default_true() -> bool {
    true
}

fn default_control_page() -> String {
    "Control".to_string()
}

fn default_operator_path() -> String {
    ".".to_string()
}

fn default_node_spacing() -> i64 {
    250
}

fn default_header_suppressed() -> Vec<String> {
    ["TD", "0x00", "Polyphonic", "Sequencer"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_sequencer_label() -> String {
    "Sequencer".to_string()
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            polyphony: false,
            group_voices: default_true(),
            strip_td_prefix: default_true(),
            control_page: default_control_page(),
            operator_path: default_operator_path(),
            node_spacing: default_node_spacing(),
            header_suppressed: default_header_suppressed(),
            sequencer_label: default_sequencer_label(),
        }
    }
}

/// Standard config location.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".faust-td").join("builder.yaml"))
}

impl BuilderConfig {
    /// Load config from the standard path.
    /// Returns None if the file doesn't exist or can't be read.
    pub fn load() -> Option<Self> {
        Self::load_if_present(&default_config_path()?)
    }

    /// Like [`BuilderConfig::load`], for an arbitrary path.
    pub fn load_if_present(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        serde_yaml::from_str(&content).ok()
    }

    /// Load config from an explicit path. Unlike [`BuilderConfig::load`],
    /// a missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, BuildError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| BuildError::config(format!("{}: {e}", path.display())))?;
        serde_yaml::from_str(&content)
            .map_err(|e| BuildError::config(format!("{}: {e}", path.display())))
    }

    pub fn suppresses_header(&self, label: &str) -> bool {
        self.header_suppressed.iter().any(|l| l == label)
    }
}
