//! TOML-based application configuration.
//!
//! Stores the notifier's tunables:
//! - lookback window for the first sync of a calendar
//! - display time zone for rendered timestamps
//! - alert username and the primary push endpoint
//!
//! Configuration is stored at `~/.config/calwatch/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::storage::data_dir;

/// Default endpoint for the primary push channel.
pub const ENDPOINT_LINE_NOTIFY_API: &str = "https://notify-api.line.me/api/notify";

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/calwatch/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Days to look back when a calendar has no stored sync token.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
    /// IANA zone rendered timestamps are converted into.
    #[serde(default = "default_display_timezone")]
    pub display_timezone: String,
    /// Username attached to alert webhook payloads.
    #[serde(default = "default_alert_username")]
    pub alert_username: String,
    /// Primary push endpoint. Overridable for testing.
    #[serde(default = "default_line_endpoint")]
    pub line_endpoint: String,
}

fn default_lookback_days() -> i64 {
    30
}
fn default_display_timezone() -> String {
    "Asia/Tokyo".to_string()
}
fn default_alert_username() -> String {
    "google-calendar-watchdog".to_string()
}
fn default_line_endpoint() -> String {
    ENDPOINT_LINE_NOTIFY_API.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lookback_days: default_lookback_days(),
            display_timezone: default_display_timezone(),
            alert_username: default_alert_username(),
            line_endpoint: default_line_endpoint(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file
    /// does not exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Save the configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Resolve the display time zone, rejecting unknown zone names.
    pub fn display_zone(&self) -> Result<chrono_tz::Tz> {
        self.display_timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|_| {
                ConfigError::InvalidValue {
                    key: "display_timezone".to_string(),
                    message: format!("unknown time zone: {}", self.display_timezone),
                }
                .into()
            })
    }
}
