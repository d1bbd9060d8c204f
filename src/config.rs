//! Configuration Management
//!
//! Client settings with layered sources: built-in defaults, a JSON file in
//! the user config directory, then `VULTR_*` environment variables.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.vultr.com";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_RETRY_LIMIT: u32 = 3;
const DEFAULT_RETRY_WAIT_MIN_MS: u64 = 1_000;
const DEFAULT_RETRY_WAIT_MAX_MS: u64 = 30_000;

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API key sent as a bearer token. Never persisted to disk.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Scheme and host of the API, without the `/v2` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Retries for idempotent requests on transient failures
    #[serde(default = "default_retry_limit")]
    pub retry_limit: u32,
    /// Initial backoff between retries, in milliseconds
    #[serde(default = "default_retry_wait_min_ms")]
    pub retry_wait_min_ms: u64,
    /// Backoff ceiling, in milliseconds
    #[serde(default = "default_retry_wait_max_ms")]
    pub retry_wait_max_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_retry_limit() -> u32 {
    DEFAULT_RETRY_LIMIT
}

fn default_retry_wait_min_ms() -> u64 {
    DEFAULT_RETRY_WAIT_MIN_MS
}

fn default_retry_wait_max_ms() -> u64 {
    DEFAULT_RETRY_WAIT_MAX_MS
}

fn default_user_agent() -> String {
    format!("vultr-registry/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_limit: DEFAULT_RETRY_LIMIT,
            retry_wait_min_ms: DEFAULT_RETRY_WAIT_MIN_MS,
            retry_wait_max_ms: DEFAULT_RETRY_WAIT_MAX_MS,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vcr").join("config.json"))
    }

    /// Load configuration from disk, falling back to defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`. A missing or malformed file yields defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk (the API key is left out)
    pub fn save(&self) -> Result<()> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Config(format!("cannot create {:?}: {}", parent, e)))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(e.to_string()))?;
        std::fs::write(path, content)
            .map_err(|e| Error::Config(format!("cannot write {:?}: {}", path, e)))?;

        Ok(())
    }

    /// Overlay settings from the process environment.
    ///
    /// Environment variables:
    /// - `VULTR_API_KEY`: API key
    /// - `VULTR_API_URL`: base URL (default: "https://api.vultr.com")
    /// - `VULTR_TIMEOUT_SECS`: request timeout in seconds (default: 60)
    /// - `VULTR_RETRY_LIMIT`: retries for idempotent requests (default: 3)
    pub fn with_env(self) -> Result<Self> {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay settings from an arbitrary variable lookup
    pub fn with_env_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("VULTR_API_KEY").filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }

        if let Some(url) = lookup("VULTR_API_URL").filter(|u| !u.is_empty()) {
            self.base_url = url;
        }

        if let Some(secs) = lookup("VULTR_TIMEOUT_SECS") {
            let secs: u64 = secs
                .parse()
                .map_err(|e| Error::Config(format!("invalid VULTR_TIMEOUT_SECS: {}", e)))?;
            self.timeout_secs = secs.max(1);
        }

        if let Some(limit) = lookup("VULTR_RETRY_LIMIT") {
            self.retry_limit = limit
                .parse()
                .map_err(|e| Error::Config(format!("invalid VULTR_RETRY_LIMIT: {}", e)))?;
        }

        Ok(self)
    }

    /// Set the API key
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the base URL
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set the retry limit for idempotent requests
    pub fn with_retry_limit(mut self, limit: u32) -> Self {
        self.retry_limit = limit;
        self
    }

    /// Set the retry backoff window
    pub fn with_retry_wait(mut self, min: Duration, max: Duration) -> Self {
        self.retry_wait_min_ms = min.as_millis() as u64;
        self.retry_wait_max_ms = max.as_millis().max(min.as_millis()) as u64;
        self
    }

    /// Request timeout, never shorter than one second
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn retry_wait_min(&self) -> Duration {
        Duration::from_millis(self.retry_wait_min_ms)
    }

    pub fn retry_wait_max(&self) -> Duration {
        Duration::from_millis(self.retry_wait_max_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.retry_limit, 3);
        assert!(config.api_key.is_none());
        assert!(config.user_agent.starts_with("vultr-registry/"));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::default()
            .with_env_from(lookup(&[
                ("VULTR_API_KEY", "secret"),
                ("VULTR_API_URL", "http://localhost:9000"),
                ("VULTR_TIMEOUT_SECS", "5"),
                ("VULTR_RETRY_LIMIT", "0"),
            ]))
            .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.base_url, "http://localhost:9000");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.retry_limit, 0);
    }

    #[test]
    fn test_invalid_env_value_is_rejected() {
        let err = Config::default()
            .with_env_from(lookup(&[("VULTR_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_zero_timeout_is_clamped() {
        let config = Config::default()
            .with_env_from(lookup(&[("VULTR_TIMEOUT_SECS", "0")]))
            .unwrap();
        assert_eq!(config.timeout_secs, 1);

        let config: Config = serde_json::from_str(r#"{"timeout_secs": 0}"#).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(1));
    }

    #[test]
    fn test_api_key_is_never_serialized() {
        let config = Config::default().with_api_key("secret");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("api_key"));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"retry_limit": 7}"#).unwrap();
        assert_eq!(config.retry_limit, 7);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::new()
            .with_base_url("http://127.0.0.1:8080")
            .with_timeout(Duration::from_secs(5))
            .with_retry_wait(Duration::from_millis(10), Duration::from_millis(5));

        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.retry_wait_min(), Duration::from_millis(10));
        // ceiling never drops below the floor
        assert_eq!(config.retry_wait_max(), Duration::from_millis(10));
    }
}
