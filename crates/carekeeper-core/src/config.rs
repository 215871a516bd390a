//! Application configuration management.
//!
//! `Config` covers app-level settings persisted between runs (server URL,
//! last used email); `SessionConfig` holds the session lifecycle tunables
//! passed to the store and expiry monitor.
//!
//! Configuration is stored at `~/.config/carekeeper/config.json`.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Application name used for config/storage directory paths
const APP_NAME: &str = "carekeeper";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Default session lifetime in days.
/// Matches the 7-day expiry of the tokens the care service issues.
const DEFAULT_TTL_DAYS: i64 = 7;

/// Default expiry monitor poll interval in minutes.
/// 5 minutes is frequent enough to catch the warning window well before a
/// 7-day session runs out.
const DEFAULT_POLL_INTERVAL_MINUTES: i64 = 5;

/// Default warning window before expiry in minutes.
/// A session with under an hour remaining is proactively extended.
const DEFAULT_EXPIRY_WARNING_MINUTES: i64 = 60;

/// Session lifecycle tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub default_ttl_days: i64,
    pub poll_interval_minutes: i64,
    pub expiry_warning_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_ttl_days: DEFAULT_TTL_DAYS,
            poll_interval_minutes: DEFAULT_POLL_INTERVAL_MINUTES,
            expiry_warning_minutes: DEFAULT_EXPIRY_WARNING_MINUTES,
        }
    }
}

impl SessionConfig {
    /// Session lifetime applied on creation and refresh.
    pub fn ttl(&self) -> Duration {
        Duration::days(self.default_ttl_days)
    }

    /// How often the expiry monitor wakes up.
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs((self.poll_interval_minutes.max(1) as u64) * 60)
    }

    /// Remaining-lifetime threshold below which the monitor refreshes.
    pub fn warning_window(&self) -> Duration {
        Duration::minutes(self.expiry_warning_minutes)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub server_url: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the durable session store.
    pub fn storage_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl(), Duration::days(7));
        assert_eq!(config.poll_interval(), std::time::Duration::from_secs(300));
        assert_eq!(config.warning_window(), Duration::hours(1));
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = SessionConfig {
            poll_interval_minutes: 0,
            ..SessionConfig::default()
        };
        // A zero interval would spin; clamp to one minute
        assert_eq!(config.poll_interval(), std::time::Duration::from_secs(60));
    }
}
