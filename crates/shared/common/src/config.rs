//! Shared configuration structures.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use domain::{
    HashingParams, DEFAULT_CONNECT_ATTEMPTS, DEFAULT_CONNECT_BACKOFF_SECS, DEFAULT_DSN,
    DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM,
    DEFAULT_MAX_CONNECTIONS, DEFAULT_MIN_CONNECTIONS, DEFAULT_OPERATION_TIMEOUT_SECS,
};

/// Parse an environment variable, falling back when unset or unparsable.
pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Database configuration.
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Data-source string
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Startup retries after the first attempt before giving up
    pub connect_attempts: u32,
    /// Fixed delay between startup attempts
    pub connect_backoff_secs: u64,
    /// Deadline applied to every repository operation
    pub operation_timeout_secs: u64,
}

// Don't expose credentials embedded in the DSN
impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"[REDACTED]")
            .field("max_connections", &self.max_connections)
            .field("min_connections", &self.min_connections)
            .field("connect_attempts", &self.connect_attempts)
            .field("connect_backoff_secs", &self.connect_backoff_secs)
            .field("operation_timeout_secs", &self.operation_timeout_secs)
            .finish()
    }
}

impl DatabaseConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: env::var("DSN")
                .or_else(|_| env::var("DATABASE_URL"))
                .unwrap_or_else(|_| DEFAULT_DSN.to_string()),
            max_connections: env_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            min_connections: env_or("DB_MIN_CONNECTIONS", DEFAULT_MIN_CONNECTIONS),
            connect_attempts: env_or("DB_CONNECT_ATTEMPTS", DEFAULT_CONNECT_ATTEMPTS),
            connect_backoff_secs: env_or("DB_CONNECT_BACKOFF_SECS", DEFAULT_CONNECT_BACKOFF_SECS),
            operation_timeout_secs: env_or(
                "DB_OPERATION_TIMEOUT_SECS",
                DEFAULT_OPERATION_TIMEOUT_SECS,
            ),
        }
    }

    pub fn connect_backoff(&self) -> Duration {
        Duration::from_secs(self.connect_backoff_secs)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DSN.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_attempts: DEFAULT_CONNECT_ATTEMPTS,
            connect_backoff_secs: DEFAULT_CONNECT_BACKOFF_SECS,
            operation_timeout_secs: DEFAULT_OPERATION_TIMEOUT_SECS,
        }
    }
}

/// Credential hashing work factor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HashingConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl HashingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            memory_kib: env_or("HASH_MEMORY_KIB", DEFAULT_HASH_MEMORY_KIB),
            iterations: env_or("HASH_ITERATIONS", DEFAULT_HASH_ITERATIONS),
            parallelism: env_or("HASH_PARALLELISM", DEFAULT_HASH_PARALLELISM),
        }
    }
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

impl From<&HashingConfig> for HashingParams {
    fn from(config: &HashingConfig) -> Self {
        HashingParams {
            memory_kib: config.memory_kib,
            iterations: config.iterations,
            parallelism: config.parallelism,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_defaults() {
        let config = DatabaseConfig::default();
        assert_eq!(config.connect_attempts, 10);
        assert_eq!(config.connect_backoff(), Duration::from_secs(2));
        assert_eq!(config.operation_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_debug_redacts_dsn() {
        let config = DatabaseConfig {
            url: "postgres://postgres:hunter2@db:5432/users".to_string(),
            ..DatabaseConfig::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_env_or_falls_back_on_garbage() {
        assert_eq!(env_or("COMMON_TEST_SURELY_UNSET_VAR", 42u32), 42);
    }

    #[test]
    fn test_hashing_config_into_params() {
        let params = HashingParams::from(&HashingConfig::default());
        assert_eq!(params, HashingParams::default());
    }
}
