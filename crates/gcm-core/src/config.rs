use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::INITIAL_BACKOFF_MS;

/// Google Cloud Messaging endpoint.
pub const GCM_URL: &str = "https://android.googleapis.com/gcm/send";
/// Firebase Cloud Messaging legacy HTTP endpoint.
pub const FCM_URL: &str = "https://fcm.googleapis.com/fcm/send";

/// Global configuration loaded from `~/.config/gcm/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GcmConfig {
    /// Server API key; the CLI `--api-key` flag takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Gateway send endpoint.
    #[serde(default = "default_url")]
    pub url: String,
    /// Starting backoff window in milliseconds.
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
    /// TCP/TLS connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_url() -> String {
    GCM_URL.to_string()
}

fn default_initial_backoff_ms() -> u64 {
    INITIAL_BACKOFF_MS
}

fn default_connect_timeout_secs() -> u64 {
    15
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GcmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            url: default_url(),
            initial_backoff_ms: default_initial_backoff_ms(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl GcmConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: GcmConfig =
            toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("gcm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<GcmConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = GcmConfig::default();
        default_cfg.save_to_path(&path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    GcmConfig::load_from_path(&path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = GcmConfig::default();
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.url, GCM_URL);
        assert_eq!(cfg.initial_backoff_ms, 1000);
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = GcmConfig {
            api_key: Some("my_api_key".into()),
            ..GcmConfig::default()
        };
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: GcmConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            url = "https://fcm.googleapis.com/fcm/send"
            initial_backoff_ms = 250
        "#;
        let cfg: GcmConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.url, FCM_URL);
        assert_eq!(cfg.initial_backoff_ms, 250);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = GcmConfig {
            api_key: Some("k".into()),
            timeout_secs: 5,
            ..GcmConfig::default()
        };
        cfg.save_to_path(&path).unwrap();
        let loaded = GcmConfig::load_from_path(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn load_from_missing_path_fails() {
        let dir = tempdir().unwrap();
        assert!(GcmConfig::load_from_path(&dir.path().join("absent.toml")).is_err());
    }
}
