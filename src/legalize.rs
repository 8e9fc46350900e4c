//! Label and address sanitizers.
//!
//! The channel-name rules must stay in lockstep with the operator's own
//! label cleaning (`FaustCHOPUI::cleanLabel`): both sides derive addresses
//! from the same compiler output independently, and a parameter only reaches
//! its DSP zone if both spell the address identically.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// Structural group that the operator prepends to relative addresses.
pub const TD_PREFIX: &str = "/TD/";

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Remove parentheses, then replace each run of whitespace with one underscore.
pub fn legal_chan_name(label: &str) -> String {
    let no_parens: String = label.chars().filter(|c| *c != '(' && *c != ')').collect();
    WHITESPACE.replace_all(&no_parens, "_").into_owned()
}

/// Drop a leading `/TD/` group. The operator re-adds it for any address
/// that does not start with `/`.
pub fn strip_td_prefix(address: &str) -> &str {
    address.strip_prefix(TD_PREFIX).unwrap_or(address)
}

/// Canonical form of a DSP address, used as the dedup key for widgets.
pub fn legal_address(address: &str, strip_prefix: bool) -> String {
    let chan = legal_chan_name(address);
    if strip_prefix {
        strip_td_prefix(&chan).to_string()
    } else {
        chan
    }
}

/// Turn a free-form label into a custom parameter name, without collision
/// handling.
///
/// Keeps alphanumerics only (underscores go too), uppercases the first
/// character and lowercases the rest. A leading digit gets a `P` in front,
/// as does a label with nothing usable left in it.
pub fn legal_parname_prefix(label: &str) -> String {
    let word: String = label.chars().filter(|c| c.is_alphanumeric()).collect();
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return "P".to_string();
    };

    let mut name = String::with_capacity(word.len() + 1);
    if first.is_numeric() {
        name.push('P');
        name.push(first);
    } else {
        name.extend(first.to_uppercase());
    }
    name.extend(chars.flat_map(char::to_lowercase));
    name
}

/// Hands out unique parameter names for one build pass.
#[derive(Debug, Default, Clone)]
pub struct ParNameAllocator {
    used: HashSet<String>,
}

impl ParNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Legalize `label` and append 1, 2, 3, ... until the name is unused.
    pub fn allocate(&mut self, label: &str) -> String {
        let prefix = legal_parname_prefix(label);
        let mut name = prefix.clone();
        let mut i = 0;
        while self.used.contains(&name) {
            i += 1;
            name = format!("{prefix}{i}");
        }
        self.used.insert(name.clone());
        name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.used.contains(name)
    }

    /// Mark names owned elsewhere as taken.
    pub fn reserve<I>(&mut self, names: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.used.extend(names);
    }

    pub fn clear(&mut self) {
        self.used.clear();
    }
}

/// Host object name: anything outside `[A-Za-z0-9_]` becomes `_`.
pub fn legal_op_name(label: &str) -> String {
    let name: String = label
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        "_".to_string()
    } else {
        name
    }
}

/// Collapse whitespace runs (newlines included) to single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}
