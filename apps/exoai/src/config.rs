//! # Configuration
//!
//! Settings are layered, later layers winning:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`exoai.toml` unless `--config` says otherwise)
//! 3. environment: `EXOAI_API_URL`, `EXOAI_API_KEY`, `EXOAI_TIMEOUT_SECS`,
//!    `EXOAI_HISTORY_DB`
//! 4. CLI flags (applied by the CLI on top of the returned `Config`)
//!
//! ```toml
//! [client]
//! base_url = "http://localhost:8000"
//! timeout_secs = 10
//!
//! [storage]
//! history_db = "exoai-history.redb"
//!
//! [server]
//! host = "127.0.0.1"
//! port = 8000
//! ```

use crate::client::ClientConfig;
use exoai_core::primitives::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "exoai.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
}

/// Transport settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub api_key: Option<String>,
}

impl Default for ClientSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            api_key: None,
        }
    }
}

/// Where the latest classification is kept.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub history_db: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            history_db: PathBuf::from("exoai-history.redb"),
        }
    }
}

/// Stub server bind address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub client: ClientSection,
    pub storage: StorageSection,
    pub server: ServerSection,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Defaults overlaid with `path`, if given.
    ///
    /// Without an explicit path, `exoai.toml` is read when it exists and
    /// silently skipped otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&raw, &path.display().to_string())
    }

    /// Overlay the process environment.
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Overlay variables resolved through `lookup`.
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("EXOAI_API_URL").filter(|v| !v.is_empty()) {
            self.client.base_url = url;
        }
        if let Some(key) = lookup("EXOAI_API_KEY").filter(|v| !v.is_empty()) {
            self.client.api_key = Some(key);
        }
        if let Some(raw) = lookup("EXOAI_TIMEOUT_SECS") {
            self.client.timeout_secs = raw.trim().parse().map_err(|e| ConfigError::Env {
                var: "EXOAI_TIMEOUT_SECS",
                reason: format!("{e}"),
            })?;
        }
        if let Some(db) = lookup("EXOAI_HISTORY_DB").filter(|v| !v.is_empty()) {
            self.storage.history_db = PathBuf::from(db);
        }
        Ok(self)
    }

    /// Transport settings for `ExoClient::new`.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.client.base_url.clone(),
            timeout: Duration::from_secs(self.client.timeout_secs),
            api_key: self.client.api_key.clone(),
        }
    }

    /// `host:port` for the stub server.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_point_at_local_service() {
        let config = Config::default();
        let client = config.client_config();
        assert_eq!(client.base_url, "http://localhost:8000");
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.api_key, None);
        assert_eq!(config.server_addr(), "127.0.0.1:8000");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml(
            "[client]\nbase_url = \"https://exo.example\"\n",
            "inline",
        )
        .unwrap();
        assert_eq!(config.client.base_url, "https://exo.example");
        assert_eq!(config.client.timeout_secs, 10);
        assert_eq!(config.server, ServerSection::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Config::from_toml("[client]\nretries = 3\n", "inline").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn environment_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("EXOAI_API_URL", "http://10.0.0.2:9000"),
            ("EXOAI_API_KEY", "secret"),
            ("EXOAI_TIMEOUT_SECS", " 3 "),
            ("EXOAI_HISTORY_DB", "/tmp/h.redb"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_toml("[client]\ntimeout_secs = 30\n", "inline")
            .unwrap()
            .apply_env_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.client.base_url, "http://10.0.0.2:9000");
        assert_eq!(config.client.api_key.as_deref(), Some("secret"));
        assert_eq!(config.client.timeout_secs, 3);
        assert_eq!(config.storage.history_db, PathBuf::from("/tmp/h.redb"));
    }

    #[test]
    fn bad_timeout_in_environment_is_an_error() {
        let err = Config::default()
            .apply_env_from(|k| (k == "EXOAI_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                var: "EXOAI_TIMEOUT_SECS",
                ..
            }
        ));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn load_reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exoai.toml");
        std::fs::write(&path, "[server]\nport = 9100\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.client, ClientSection::default());
    }
}
