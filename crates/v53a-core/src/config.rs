//! Client configuration management.
//!
//! `ClientConfig` carries what the `ApiClient` needs to reach the API.
//! `Config` is the persisted user configuration (base URL, auth endpoint,
//! last username, timeout), stored at `~/.config/v53a-client/config.json`.
//! Tokens are never written to disk.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config directory paths
const APP_NAME: &str = "v53a-client";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "http://aiprediction.us";

pub const DEFAULT_AUTH_ENDPOINT: &str = "api-token-auth/";

/// HTTP request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    auth_endpoint: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_endpoint: DEFAULT_AUTH_ENDPOINT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn with_auth_endpoint(mut self, endpoint: &str) -> Self {
        self.auth_endpoint = endpoint.trim_start_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn auth_endpoint(&self) -> &str {
        &self.auth_endpoint
    }

    pub fn auth_url(&self) -> String {
        self.url_for(&self.auth_endpoint)
    }

    /// Join a relative path onto the base URL
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub base_url: Option<String>,
    pub auth_endpoint: Option<String>,
    pub last_username: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Client settings from this file, falling back to defaults
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL));
        if let Some(ref endpoint) = self.auth_endpoint {
            config = config.with_auth_endpoint(endpoint);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_normalization() {
        let config = ClientConfig::new("http://example.test///").with_auth_endpoint("/custom/auth/");
        assert_eq!(config.base_url(), "http://example.test");
        assert_eq!(config.auth_url(), "http://example.test/custom/auth/");
        assert_eq!(config.url_for("api/v53a/"), "http://example.test/api/v53a/");
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.auth_url(), "http://aiprediction.us/api-token-auth/");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert_eq!(Config::load_from(&path).unwrap(), Config::default());

        let config = Config {
            base_url: Some("http://example.test/".into()),
            auth_endpoint: Some("auth/".into()),
            last_username: Some("alice".into()),
            timeout_secs: Some(5),
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        let client = loaded.client_config();
        assert_eq!(client.auth_url(), "http://example.test/auth/");
        assert_eq!(client.timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_corrupt_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
