use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_URL_ENV: &str = "TIMEKEEP_API_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimekeepConfig {
    /// Base URL of the time-tracking API, e.g. "http://localhost:8080"
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Log filter for the file log. `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// How long success/error notifications stay on screen.
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_notification_secs() -> u64 {
    4
}

impl Default for TimekeepConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            log_level: default_log_level(),
            notification_secs: default_notification_secs(),
        }
    }
}

impl TimekeepConfig {
    pub fn config_path() -> Result<PathBuf> {
        Ok(dirs::config_dir()
            .context("Cannot determine config directory")?
            .join("timekeep")
            .join("config.toml"))
    }

    pub fn log_dir() -> Result<PathBuf> {
        Ok(dirs::data_dir()
            .context("Cannot determine data directory")?
            .join("timekeep")
            .join("logs"))
    }

    /// Load config from disk and apply environment overrides.
    /// Returns default config if the file doesn't exist.
    pub fn load() -> Result<Self> {
        let config = Self::load_from(&Self::config_path()?)?;
        Ok(config.with_api_url_override(std::env::var(API_URL_ENV).ok()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("Failed to parse config at {}", path.display()))?;
        Ok(config)
    }

    pub fn with_api_url_override(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    /// Write the default config unless a file is already there.
    pub fn ensure_exists(path: &Path) -> Result<bool> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(&Self::default())?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write config at {}", path.display()))?;
        Ok(true)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "api_url = \"https://time.example.com\"\n").unwrap();

        let config = TimekeepConfig::load_from(&path).unwrap();
        assert_eq!(config.api_url, "https://time.example.com");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.notification_secs, 4);
    }

    #[test]
    fn missing_file_is_default_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = TimekeepConfig::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, TimekeepConfig::default());
    }

    #[test]
    fn env_override_replaces_api_url() {
        let config = TimekeepConfig::default()
            .with_api_url_override(Some("http://10.0.0.2:3000".to_string()));
        assert_eq!(config.api_url, "http://10.0.0.2:3000");

        let config = TimekeepConfig::default().with_api_url_override(Some("  ".to_string()));
        assert_eq!(config.api_url, "http://localhost:8080");
    }

    #[test]
    fn ensure_exists_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("timekeep").join("config.toml");

        assert!(TimekeepConfig::ensure_exists(&path).unwrap());
        assert!(!TimekeepConfig::ensure_exists(&path).unwrap());
        assert_eq!(
            TimekeepConfig::load_from(&path).unwrap(),
            TimekeepConfig::default()
        );
    }
}
