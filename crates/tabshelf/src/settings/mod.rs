//! # Settings
//!
//! The settings layer is a small reactive key/value store with **layered
//! overrides**. Every key has three sources, resolved in priority order:
//!
//! ```text
//! overrides[0]   <-- highest priority, set by rules only
//! overrides[1]
//! ...
//! stored value   <-- last value seen in persistent storage
//! default        <-- compiled in, always present
//! ```
//!
//! The first override slot that is *set* wins. A slot holding `null` or
//! `false` is still set: `Some(Value::Null)` forces the key to null, `None`
//! leaves the slot empty.
//!
//! ## Keys
//!
//! Keys form a closed enumeration ([`SettingKey`]). Code inside the crate can
//! never name an unknown key; string names coming from storage or a UI are
//! parsed with [`SettingKey::from_str`](std::str::FromStr), which is the only
//! place [`TabshelfError::InvalidKey`] can arise.
//!
//! | Key | Default |
//! |-----|---------|
//! | `show-clock` | `true` |
//! | `show-greeting` | `true` |
//! | `show-weather` | `true` |
//! | `temperature-unit` | `"fahrenheit"` |
//! | `background-source` | `"daily"` |
//! | `bookmarks-drawer-mode` | `"toggle"` |
//! | `bookmarks-drawer-small` | `true` |
//! | `enable-easter-egg` | `true` |
//!
//! ## Modules
//!
//! - [`store`]: the [`SettingsStore`](store::SettingsStore) itself
//! - [`rules`]: override rules reacting to other keys' changes
//! - [`storage`]: persistent storage backends (memory, JSON file)

use crate::error::TabshelfError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod rules;
pub mod storage;
pub mod store;

pub use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SettingKey {
    ShowClock,
    ShowGreeting,
    ShowWeather,
    TemperatureUnit,
    BackgroundSource,
    BookmarksDrawerMode,
    BookmarksDrawerSmall,
    EnableEasterEgg,
}

impl SettingKey {
    /// Every key, in load and notification order.
    pub const ALL: [SettingKey; 8] = [
        SettingKey::ShowClock,
        SettingKey::ShowGreeting,
        SettingKey::ShowWeather,
        SettingKey::TemperatureUnit,
        SettingKey::BackgroundSource,
        SettingKey::BookmarksDrawerMode,
        SettingKey::BookmarksDrawerSmall,
        SettingKey::EnableEasterEgg,
    ];

    /// The name used in persistent storage.
    pub fn name(self) -> &'static str {
        match self {
            SettingKey::ShowClock => "show-clock",
            SettingKey::ShowGreeting => "show-greeting",
            SettingKey::ShowWeather => "show-weather",
            SettingKey::TemperatureUnit => "temperature-unit",
            SettingKey::BackgroundSource => "background-source",
            SettingKey::BookmarksDrawerMode => "bookmarks-drawer-mode",
            SettingKey::BookmarksDrawerSmall => "bookmarks-drawer-small",
            SettingKey::EnableEasterEgg => "enable-easter-egg",
        }
    }

    pub fn default_value(self) -> Value {
        match self {
            SettingKey::ShowClock
            | SettingKey::ShowGreeting
            | SettingKey::ShowWeather
            | SettingKey::BookmarksDrawerSmall
            | SettingKey::EnableEasterEgg => Value::Bool(true),
            SettingKey::TemperatureUnit => Value::from("fahrenheit"),
            SettingKey::BackgroundSource => Value::from("daily"),
            SettingKey::BookmarksDrawerMode => Value::from("toggle"),
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|key| key.name()).collect()
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SettingKey {
    type Err = TabshelfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| TabshelfError::InvalidKey(s.to_string()))
    }
}

/// How the bookmarks drawer opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawerMode {
    Hover,
    Toggle,
    Always,
    Never,
}

impl DrawerMode {
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// Full diagnostic view of one setting, as delivered by `on_data_changed`.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingSnapshot {
    pub key: SettingKey,
    /// The effective value.
    pub value: Value,
    /// The raw value from persistent storage, `None` if never stored.
    pub stored: Option<Value>,
    /// Override slots by priority; `None` is an empty slot.
    pub overrides: Vec<Option<Value>>,
    /// Index of the slot currently supplying `value`, if any.
    pub active_override: Option<usize>,
}
