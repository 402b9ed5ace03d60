//! Shared configuration: backend location, request timeout, session file.
//!
//! Resolution order, later wins: built-in defaults, `~/.config/trackdesk/config.json`,
//! `TRACKDESK_URL` / `TRACKDESK_TIMEOUT_SECS`, then whatever the caller overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::CoreError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const URL_VAR: &str = "TRACKDESK_URL";
const TIMEOUT_VAR: &str = "TRACKDESK_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Where the signed-in session is persisted. `None` means next to the config file.
    pub session_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_path: None,
        }
    }
}

impl Config {
    /// Load from the default location and apply environment overrides.
    pub fn load() -> Result<Self, CoreError> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path`, or defaults if the file does not exist.
    ///
    /// A zero timeout is logged and replaced with the default.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = serde_json::from_str(&content)?;
        if config.timeout_secs == 0 {
            warn!(
                "{}: timeout_secs must be positive, using {DEFAULT_TIMEOUT_SECS}s",
                path.display()
            );
            config.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let io = |source: std::io::Error| CoreError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io)
    }

    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn config_dir() -> Result<PathBuf, CoreError> {
        let home = dirs::home_dir().ok_or(CoreError::NoHomeDir)?;
        Ok(home.join(".config").join("trackdesk"))
    }

    pub fn config_path() -> Result<PathBuf, CoreError> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn session_path(&self) -> Result<PathBuf, CoreError> {
        match &self.session_path {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::config_dir()?.join("session.json")),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Apply overrides from an environment lookup. Invalid values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(URL_VAR).filter(|u| !u.trim().is_empty()) {
            info!("{URL_VAR} set, using {url}");
            self.base_url = url;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.timeout_secs = secs,
                _ => warn!("Invalid {TIMEOUT_VAR} value {raw:?}, keeping {}s", self.timeout_secs),
            }
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trackdesk").join("config.json");
        let config = Config {
            base_url: "https://cargo.example.kz".into(),
            timeout_secs: 10,
            session_path: Some(dir.path().join("s.json")),
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 5}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn zero_timeout_in_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"base_url": "http://b:9", "timeout_secs": 0}"#).unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://b:9");
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.timeout() > Duration::ZERO);
    }

    #[test]
    fn env_overrides_and_trims_slash() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            "TRACKDESK_URL" => Some("http://10.0.0.2:8000/".into()),
            "TRACKDESK_TIMEOUT_SECS" => Some("7".into()),
            _ => None,
        });
        assert_eq!(config.base_url, "http://10.0.0.2:8000");
        assert_eq!(config.timeout_secs, 7);
    }

    #[test]
    fn bad_timeout_is_ignored() {
        let mut config = Config::default();
        config.apply_env(|key| (key == "TRACKDESK_TIMEOUT_SECS").then(|| "soon".to_string()));
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }
}
