//! Player name handling.
//!
//! Chat participants are identified by their Minecraft username. Names are compared
//! case-insensitively everywhere, so the canonical form is trimmed ASCII lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized (trimmed, lowercase) username.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Normalize a raw name.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// Normalized name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name is empty after normalization.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-insensitive comparison against an unnormalized name.
    pub fn matches(&self, raw: &str) -> bool {
        self.0 == raw.trim().to_lowercase()
    }
}

impl From<String> for Username {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Username {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Strip leading bracketed rank/guild tags (`[MVP+] `, `[VIP] [GUILD] `) from a
/// display name. Unterminated brackets are left alone.
pub fn strip_rank_tags(display_name: &str) -> &str {
    let mut rest = display_name.trim();
    while rest.starts_with('[') {
        match rest.find(']') {
            Some(close) => rest = rest[close + 1..].trim_start(),
            None => break,
        }
    }
    rest.trim_end()
}
