//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{ServerAddress, TRANSLATE_COM_ADDR};
use crate::core::transport::{StaticProxy, TransportConfig, DEFAULT_USER_AGENT};

/// Configuration for the translate client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Translate host, one of the two supported addresses
    pub server: String,
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,
    /// `User-Agent` header for every request
    pub user_agent: String,
    /// Proxy URL applied to every request
    pub proxy: Option<String>,
    /// Lifetime of a fetched signing key pair
    pub key_ttl_secs: u64,
    /// Maximum cached results; 0 disables result caching
    pub result_cache_capacity: u64,
    /// Lifetime of a cached result
    pub result_cache_ttl_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: TRANSLATE_COM_ADDR.to_string(),
            timeout_ms: 10_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            proxy: None,
            key_ttl_secs: 600,
            result_cache_capacity: 0,
            result_cache_ttl_secs: 600,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let server = std::env::var("GTRANSLATE_SERVER").unwrap_or(defaults.server);
        let user_agent = std::env::var("GTRANSLATE_USER_AGENT").unwrap_or(defaults.user_agent);
        let proxy = std::env::var("GTRANSLATE_PROXY")
            .ok()
            .filter(|p| !p.trim().is_empty());

        let timeout_ms = env_number("GTRANSLATE_TIMEOUT_MS", defaults.timeout_ms)?;
        let key_ttl_secs = env_number("GTRANSLATE_KEY_TTL_SECS", defaults.key_ttl_secs)?;
        let result_cache_capacity =
            env_number("GTRANSLATE_RESULT_CACHE", defaults.result_cache_capacity)?;
        let result_cache_ttl_secs =
            env_number("GTRANSLATE_RESULT_CACHE_TTL_SECS", defaults.result_cache_ttl_secs)?;

        Ok(Self {
            server,
            timeout_ms,
            user_agent,
            proxy,
            key_ttl_secs,
            result_cache_capacity,
            result_cache_ttl_secs,
        })
    }

    /// Load from a JSON or YAML file, chosen by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = if is_yaml(path) {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };
        Ok(config)
    }

    /// Save configuration to a JSON or YAML file, chosen by extension
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.server_address()?;

        if self.timeout_ms == 0 {
            return Err(TranslationError::Config {
                message: "timeout_ms must be greater than 0".to_string(),
            });
        }

        if self.key_ttl_secs == 0 {
            warn!("key_ttl_secs is 0, a key pair will be fetched for every request");
        }

        if let Some(proxy) = &self.proxy {
            StaticProxy::new(proxy)?;
        }

        Ok(())
    }

    /// Parsed `server`, rejecting hosts outside the whitelist
    pub fn server_address(&self) -> Result<ServerAddress> {
        self.server.parse()
    }

    /// `key_ttl_secs` as a duration
    pub fn key_ttl(&self) -> Duration {
        Duration::from_secs(self.key_ttl_secs)
    }

    /// `result_cache_ttl_secs` as a duration
    pub fn result_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.result_cache_ttl_secs)
    }

    /// Transport settings described by this configuration
    pub fn transport_config(&self) -> Result<TransportConfig> {
        let mut transport = TransportConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            user_agent: self.user_agent.clone(),
            proxy: None,
        };

        if let Some(proxy) = &self.proxy {
            transport = transport.with_proxy(Arc::new(StaticProxy::new(proxy)?));
        }

        Ok(transport)
    }
}

fn env_number(name: &str, default: u64) -> Result<u64> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse::<u64>().map_err(|_| TranslationError::Config {
            message: format!("{} must be a non-negative integer, got '{}'", name, value),
        }),
        Err(_) => Ok(default),
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "yaml" || ext == "yml"
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server_address().unwrap(), ServerAddress::International);
        assert_eq!(config.key_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_validation_rejects_unknown_server() {
        let config = ClientConfig {
            server: "https://example.com".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, TranslationError::UnsupportedAddress { .. }));
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = ClientConfig {
            timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_proxy() {
        let config = ClientConfig {
            proxy: Some("::not-a-proxy".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_transport_config() {
        let config = ClientConfig {
            timeout_ms: 2500,
            proxy: Some("http://127.0.0.1:6152".to_string()),
            ..Default::default()
        };
        let transport = config.transport_config().unwrap();
        assert_eq!(transport.timeout, Duration::from_millis(2500));
        assert!(transport.proxy.is_some());
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gtranslate.json");

        let config = ClientConfig {
            server: "http://translate.google.cn".to_string(),
            result_cache_capacity: 128,
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        assert_eq!(ClientConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gtranslate.yaml");
        std::fs::write(&path, "server: http://translate.google.cn\ntimeout_ms: 3000\n").unwrap();

        let config = ClientConfig::from_file(&path).unwrap();
        assert_eq!(config.server_address().unwrap(), ServerAddress::Regional);
        assert_eq!(config.timeout_ms, 3000);
        assert_eq!(config.key_ttl_secs, 600);
        assert_eq!(config.proxy, None);
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gtranslate.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = ClientConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, TranslationError::Json(_)));
    }
}
