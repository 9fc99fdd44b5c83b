//! Auth service configuration.

use std::env;

use common::{env_or, DatabaseConfig, HashingConfig};
use domain::{DEFAULT_AUTH_SERVICE_PORT, DEFAULT_SERVER_HOST};

/// Auth service configuration.
#[derive(Debug, Clone)]
pub struct AuthServiceConfig {
    pub database: DatabaseConfig,
    pub hashing: HashingConfig,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl AuthServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            hashing: HashingConfig::from_env(),
            host: env::var("AUTH_SERVICE_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env_or("AUTH_SERVICE_PORT", DEFAULT_AUTH_SERVICE_PORT),
        }
    }

    /// Apply command-line overrides; `None` keeps the configured value.
    pub fn with_bind(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            hashing: HashingConfig::default(),
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_AUTH_SERVICE_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_points_at_auth_port() {
        let config = AuthServiceConfig::default();
        assert_eq!(config.port, 8081);
        assert_eq!(config.database.connect_attempts, 10);
        assert_eq!(config.database.operation_timeout_secs, 3);
    }

    #[test]
    fn test_debug_never_prints_dsn_credentials() {
        let mut config = AuthServiceConfig::default();
        config.database.url = "postgres://postgres:hunter2@db:5432/users".to_string();

        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_bind_overrides_only_what_is_given() {
        let base = AuthServiceConfig {
            host: "10.0.0.5".to_string(),
            port: 9000,
            ..AuthServiceConfig::default()
        };

        let untouched = base.clone().with_bind(None, None);
        assert_eq!(untouched.host, "10.0.0.5");
        assert_eq!(untouched.port, 9000);

        let port_only = base.clone().with_bind(None, Some(7000));
        assert_eq!(port_only.host, "10.0.0.5");
        assert_eq!(port_only.port, 7000);

        let both = base.with_bind(Some("127.0.0.1".to_string()), Some(7001));
        assert_eq!(both.host, "127.0.0.1");
        assert_eq!(both.port, 7001);
    }
}
