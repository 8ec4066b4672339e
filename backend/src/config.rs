//! Runtime configuration for the dashboard backend.
//!
//! Every setting has a default; environment variables override them. A value
//! that fails to parse is logged and the default is kept, so a typo never
//! prevents the server from starting.

use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::auth::DecodeFailurePolicy;

const ENV_PORT: &str = "AUDIT_DASHBOARD_PORT";
const ENV_ALLOWED_ORIGIN: &str = "AUDIT_DASHBOARD_ALLOWED_ORIGIN";
const ENV_DATA_DIR: &str = "AUDIT_DASHBOARD_DATA_DIR";
const ENV_EXPORT_DIR: &str = "AUDIT_DASHBOARD_EXPORT_DIR";
const ENV_TOKEN_SECRET: &str = "AUDIT_DASHBOARD_TOKEN_SECRET";
const ENV_DECODE_FAILURE_POLICY: &str = "AUDIT_DASHBOARD_DECODE_FAILURE_POLICY";
const ENV_RENEWAL_INTERVAL_SECS: &str = "AUDIT_DASHBOARD_RENEWAL_INTERVAL_SECS";

/// Name of the durable entry holding the auth session
pub const DEFAULT_STORAGE_NAME: &str = "auth-storage";

/// Secret for the demo tokens. Demo only, override in any shared deployment.
const DEFAULT_TOKEN_SECRET: &str = "audit-dashboard-demo-secret";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub allowed_origin: String,
    pub data_dir: PathBuf,
    pub export_dir: PathBuf,
    pub storage_name: String,
    pub token_secret: String,
    pub decode_failure_policy: DecodeFailurePolicy,
    pub renewal_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            port: 3000,
            allowed_origin: "http://localhost:8080".to_string(),
            export_dir: data_dir.join("exports"),
            data_dir,
            storage_name: DEFAULT_STORAGE_NAME.to_string(),
            token_secret: DEFAULT_TOKEN_SECRET.to_string(),
            decode_failure_policy: DecodeFailurePolicy::Logout,
            renewal_interval: Duration::from_secs(5 * 60),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup(ENV_PORT) {
            match port.trim().parse::<u16>() {
                Ok(port) => config.port = port,
                Err(e) => warn!("Invalid {} '{}': {}. Using {}", ENV_PORT, port, e, config.port),
            }
        }

        if let Some(origin) = non_empty(lookup(ENV_ALLOWED_ORIGIN)) {
            config.allowed_origin = origin;
        }

        if let Some(data_dir) = non_empty(lookup(ENV_DATA_DIR)) {
            config.data_dir = PathBuf::from(data_dir);
            config.export_dir = config.data_dir.join("exports");
        }

        if let Some(export_dir) = non_empty(lookup(ENV_EXPORT_DIR)) {
            config.export_dir = PathBuf::from(export_dir);
        }

        if let Some(secret) = non_empty(lookup(ENV_TOKEN_SECRET)) {
            config.token_secret = secret;
        }

        if let Some(policy) = lookup(ENV_DECODE_FAILURE_POLICY) {
            match policy.parse::<DecodeFailurePolicy>() {
                Ok(policy) => config.decode_failure_policy = policy,
                Err(e) => warn!("Invalid {}: {}. Using {:?}", ENV_DECODE_FAILURE_POLICY, e, config.decode_failure_policy),
            }
        }

        if let Some(secs) = lookup(ENV_RENEWAL_INTERVAL_SECS) {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.renewal_interval = Duration::from_secs(secs),
                _ => warn!(
                    "Invalid {} '{}'. Using {}s",
                    ENV_RENEWAL_INTERVAL_SECS,
                    secs,
                    config.renewal_interval.as_secs()
                ),
            }
        }

        info!(
            "Configuration: port={}, data_dir={}, export_dir={}, policy={:?}",
            config.port,
            config.data_dir.display(),
            config.export_dir.display(),
            config.decode_failure_policy
        );
        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Platform data directory, falling back to the working directory
fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Audit Dashboard")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage_name, "auth-storage");
        assert_eq!(config.decode_failure_policy, DecodeFailurePolicy::Logout);
        assert_eq!(config.renewal_interval, Duration::from_secs(300));
        assert_eq!(config.export_dir, config.data_dir.join("exports"));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (ENV_PORT, "4000"),
            (ENV_DATA_DIR, "/tmp/audit"),
            (ENV_DECODE_FAILURE_POLICY, "ignore"),
            (ENV_RENEWAL_INTERVAL_SECS, "60"),
        ]);
        assert_eq!(config.port, 4000);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/audit"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/audit/exports"));
        assert_eq!(config.decode_failure_policy, DecodeFailurePolicy::Ignore);
        assert_eq!(config.renewal_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[
            (ENV_PORT, "not-a-port"),
            (ENV_DECODE_FAILURE_POLICY, "sometimes"),
            (ENV_RENEWAL_INTERVAL_SECS, "0"),
            (ENV_TOKEN_SECRET, "   "),
        ]);
        assert_eq!(config.port, 3000);
        assert_eq!(config.decode_failure_policy, DecodeFailurePolicy::Logout);
        assert_eq!(config.renewal_interval, Duration::from_secs(300));
        assert_eq!(config.token_secret, DEFAULT_TOKEN_SECRET);
    }
}
