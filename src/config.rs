//! Registry Configuration
//!
//! Recognized options of the Nacos adapter, sourced from the environment.
//! Values are read once at startup and treated as read-only afterwards.

use crate::error::RegistryError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Namespace substituted when the configured namespace is empty
pub const DEFAULT_NAMESPACE: &str = "local";

/// Configuration for the Nacos registry adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Comma-separated registry server addresses; the first element is used
    pub server_addresses: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    /// Registry namespace; an empty value maps to "local"
    pub namespace: String,
    /// Publish instances as ephemeral (heartbeat-kept)
    pub ephemeral: bool,
    /// Heartbeat interval in milliseconds, stamped into instance metadata
    pub heartbeat_interval_ms: u64,
    /// Heartbeat timeout in milliseconds, stamped into instance metadata
    pub heartbeat_timeout_ms: u64,
    /// Per-instance weight
    pub weight: f64,
    /// Per-call blocking bound in seconds
    pub async_timeout_secs: u64,
}

impl RegistryConfig {
    pub fn from_env() -> Self {
        Self {
            server_addresses: std::env::var("REGISTRY_CENTER_SERVER_ADDRESSES")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            username: std::env::var("NACOS_USERNAME").ok(),
            password: std::env::var("NACOS_PASSWORD").ok(),
            access_key: std::env::var("NACOS_ACCESS_KEY").ok(),
            secret_key: std::env::var("NACOS_SECRET_KEY").ok(),
            namespace: std::env::var("NACOS_NAMESPACE").unwrap_or_default(),
            ephemeral: std::env::var("NACOS_IS_EPHEMERAL")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            heartbeat_interval_ms: std::env::var("NACOS_HEART_BEAT_INTERVAL")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .unwrap_or(5000),
            heartbeat_timeout_ms: std::env::var("NACOS_HEART_BEAT_TIMEOUT")
                .unwrap_or_else(|_| "15000".to_string())
                .parse()
                .unwrap_or(15000),
            weight: std::env::var("NACOS_WEIGHT")
                .unwrap_or_else(|_| "1.0".to_string())
                .parse()
                .unwrap_or(1.0),
            async_timeout_secs: std::env::var("NACOS_ASYNC_TIMEOUT")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
        }
    }

    /// Missing server addresses are fatal at first use
    pub fn validate(&self) -> Result<(), RegistryError> {
        if self.server_addresses.is_empty() {
            return Err(RegistryError::Config(
                "registry-center.server.addresses is required".to_string(),
            ));
        }
        Ok(())
    }

    /// The effective namespace, with the empty value mapped to "local"
    pub fn effective_namespace(&self) -> &str {
        if self.namespace.is_empty() {
            DEFAULT_NAMESPACE
        } else {
            &self.namespace
        }
    }

    /// The caller-side blocking bound for a single registry operation
    pub fn async_timeout(&self) -> Duration {
        Duration::from_secs(self.async_timeout_secs)
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            server_addresses: Vec::new(),
            username: None,
            password: None,
            access_key: None,
            secret_key: None,
            namespace: String::new(),
            ephemeral: true,
            heartbeat_interval_ms: 5000,
            heartbeat_timeout_ms: 15000,
            weight: 1.0,
            async_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for key in [
            "REGISTRY_CENTER_SERVER_ADDRESSES",
            "NACOS_USERNAME",
            "NACOS_PASSWORD",
            "NACOS_ACCESS_KEY",
            "NACOS_SECRET_KEY",
            "NACOS_NAMESPACE",
            "NACOS_IS_EPHEMERAL",
            "NACOS_HEART_BEAT_INTERVAL",
            "NACOS_HEART_BEAT_TIMEOUT",
            "NACOS_WEIGHT",
            "NACOS_ASYNC_TIMEOUT",
        ] {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_env();
        let config = RegistryConfig::from_env();

        assert!(config.server_addresses.is_empty());
        assert!(config.ephemeral);
        assert_eq!(config.heartbeat_interval_ms, 5000);
        assert_eq!(config.heartbeat_timeout_ms, 15000);
        assert_eq!(config.weight, 1.0);
        assert_eq!(config.async_timeout_secs, 10);
        assert_eq!(config.effective_namespace(), "local");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_values() {
        clear_env();
        std::env::set_var(
            "REGISTRY_CENTER_SERVER_ADDRESSES",
            "10.0.0.1:8848, 10.0.0.2:8848",
        );
        std::env::set_var("NACOS_NAMESPACE", "prod");
        std::env::set_var("NACOS_WEIGHT", "2.5");
        std::env::set_var("NACOS_IS_EPHEMERAL", "false");

        let config = RegistryConfig::from_env();
        clear_env();

        assert_eq!(
            config.server_addresses,
            vec!["10.0.0.1:8848".to_string(), "10.0.0.2:8848".to_string()]
        );
        assert_eq!(config.effective_namespace(), "prod");
        assert_eq!(config.weight, 2.5);
        assert!(!config.ephemeral);
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_unparseable_values_fall_back_to_defaults() {
        clear_env();
        std::env::set_var("NACOS_HEART_BEAT_INTERVAL", "not-a-number");
        std::env::set_var("NACOS_WEIGHT", "heavy");

        let config = RegistryConfig::from_env();
        clear_env();

        assert_eq!(config.heartbeat_interval_ms, 5000);
        assert_eq!(config.weight, 1.0);
    }

    #[test]
    fn test_validate_rejects_missing_addresses() {
        let config = RegistryConfig::default();
        assert!(matches!(
            config.validate(),
            Err(RegistryError::Config(_))
        ));
    }
}
