//! Remote-control action vocabulary
//!
//! Maps the human-facing action names accepted on the command line to the key
//! names ECP expects after `/keypress`, `/keydown` and `/keyup`. The set is
//! fixed and must stay stable for scripts that already call `roku device send`.
//!
//! Key values: <https://developer.roku.com/docs/developer-program/debugging/external-control-api.md#keypress-key-values>

use std::collections::BTreeMap;

use crate::error::{EcpError, Result};

/// Every supported action, as `(name, wire path fragment)`.
pub const STANDARD_ACTIONS: &[(&str, &str)] = &[
    ("home", "/Home"),
    ("rev", "/Rev"),
    ("fwd", "/Fwd"),
    ("play", "/Play"),
    ("select", "/Select"),
    ("left", "/Left"),
    ("right", "/Right"),
    ("down", "/Down"),
    ("up", "/Up"),
    ("back", "/Back"),
    ("replay", "/InstantReplay"),
    ("info", "/Info"),
    ("backspace", "/Backspace"),
    ("search", "/Search"),
    ("enter", "/Enter"),
    ("find", "/FindRemote"),
    ("volumedown", "/VolumeDown"),
    ("mute", "/VolumeMute"),
    ("volumeup", "/VolumeUp"),
    ("poweroff", "/PowerOff"),
    ("channelup", "/ChannelUp"),
    ("channeldown", "/ChannelDown"),
    ("tuner", "/InputTuner"),
    ("HDMI1", "/InputHDMI1"),
    ("HDMI2", "/InputHDMI2"),
    ("HDMI3", "/InputHDMI3"),
    ("HDMI4", "/InputHDMI4"),
];

/// Immutable lookup table from action name to wire path fragment.
///
/// Names are case-sensitive: `HDMI1` exists, `hdmi1` does not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTable {
    entries: BTreeMap<&'static str, &'static str>,
}

impl ActionTable {
    /// Build a table from arbitrary entries. Later duplicates win.
    pub fn from_entries(entries: &[(&'static str, &'static str)]) -> Self {
        Self {
            entries: entries.iter().copied().collect(),
        }
    }

    /// The full ECP key vocabulary.
    pub fn standard() -> Self {
        Self::from_entries(STANDARD_ACTIONS)
    }

    /// Look up the wire fragment for `name`.
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.entries.get(name).copied()
    }

    /// Look up the wire fragment for `name`, failing with `UnrecognizedAction`.
    pub fn resolve(&self, name: &str) -> Result<&'static str> {
        self.get(name)
            .ok_or_else(|| EcpError::UnrecognizedAction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Action names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        Self::standard()
    }
}
