//! Polyphony-aware visibility rules for leaf controls.

use std::collections::HashSet;

use crate::config::BuilderConfig;

/// Controls the polyphonic wrapper drives from MIDI when voices are grouped.
const VOICE_CONTROLS: [&str; 4] = ["gate", "gain", "note", "freq"];

/// Reserved control handled by the operator itself.
const PANIC: &str = "Panic";

/// Why a leaf was left out of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    Reserved,
    GroupedVoice,
    VoiceDuplicate,
}

/// Decides which leaves are exposed. Built once per pass from every
/// (legalized) address in the tree, since a per-voice control may be
/// visited before its canonical `Voice1` twin.
#[derive(Debug, Clone, Default)]
pub struct VoiceFilter {
    polyphony: bool,
    group_voices: bool,
    all_addresses: HashSet<String>,
}

impl VoiceFilter {
    pub fn new<I>(config: &BuilderConfig, addresses: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            polyphony: config.polyphony,
            group_voices: config.group_voices,
            all_addresses: addresses.into_iter().collect(),
        }
    }

    /// Check a legalized leaf address. Rules apply in order: reserved name,
    /// grouped-voice controls, then per-voice duplicates.
    pub fn check(&self, address: &str) -> Option<Skip> {
        let name = address.rsplit('/').next().unwrap_or(address);

        if name == PANIC {
            return Some(Skip::Reserved);
        }

        if self.polyphony
            && self.group_voices
            && VOICE_CONTROLS.iter().any(|c| name.eq_ignore_ascii_case(c))
        {
            return Some(Skip::GroupedVoice);
        }

        if self.polyphony && !self.group_voices {
            if let Some(canonical) = canonical_voice_address(address) {
                if self.all_addresses.contains(&canonical) {
                    return Some(Skip::VoiceDuplicate);
                }
            }
        }

        None
    }
}

/// Map `.../Polyphonic/Voices/...` to `.../Polyphonic/Voice1/...`.
/// Returns `None` for addresses outside a voices subtree.
pub fn canonical_voice_address(address: &str) -> Option<String> {
    let mut segments: Vec<&str> = address.split('/').collect();
    let at = segments
        .windows(2)
        .position(|w| w[0] == "Polyphonic" && w[1] == "Voices")?;
    if at + 2 >= segments.len() {
        return None;
    }
    segments[at + 1] = "Voice1";
    Some(segments.join("/"))
}
