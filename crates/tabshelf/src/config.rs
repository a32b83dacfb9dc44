//! # Configuration
//!
//! Host-level configuration is loaded with [`clapfig`] from `tabshelf.toml`
//! in the data directory. It is separate from the user settings in
//! [`crate::settings`]: configuration is read once at startup and never
//! notified on.
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `settings_file` | `settings.json` | File the user settings are persisted to |
//! | `easter_egg_month` | `12` | Month (1-12) in which the easter egg may show |

use confique::Config;
use serde::{Deserialize, Serialize};

/// Configuration for tabshelf, stored in `tabshelf.toml`.
#[derive(Config, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TabshelfConfig {
    /// File name of the JSON settings storage, relative to the data directory.
    #[config(default = "settings.json")]
    pub settings_file: String,

    /// Month (1-12) in which the easter egg may show. Out-of-range values
    /// fall back to December.
    #[config(default = 12)]
    pub easter_egg_month: u32,
}

impl Default for TabshelfConfig {
    fn default() -> Self {
        Self {
            settings_file: "settings.json".to_string(),
            easter_egg_month: 12,
        }
    }
}

impl TabshelfConfig {
    /// The configured month, or December when out of range.
    pub fn easter_egg_month(&self) -> u32 {
        if (1..=12).contains(&self.easter_egg_month) {
            self.easter_egg_month
        } else {
            12
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TabshelfConfig::default();
        assert_eq!(config.settings_file, "settings.json");
        assert_eq!(config.easter_egg_month(), 12);
    }

    #[test]
    fn test_out_of_range_month_falls_back() {
        let config = TabshelfConfig {
            easter_egg_month: 13,
            ..Default::default()
        };
        assert_eq!(config.easter_egg_month(), 12);

        let config = TabshelfConfig {
            easter_egg_month: 4,
            ..Default::default()
        };
        assert_eq!(config.easter_egg_month(), 4);
    }

    #[test]
    fn test_config_deserializes() {
        let config: TabshelfConfig =
            serde_json::from_str(r#"{"settings_file": "prefs.json", "easter_egg_month": 10}"#)
                .unwrap();
        assert_eq!(config.settings_file, "prefs.json");
        assert_eq!(config.easter_egg_month(), 10);
    }
}
