//! Broker configuration.

use std::env;

use common::env_or;
use domain::{DEFAULT_BROKER_PORT, DEFAULT_SERVER_HOST};

/// Broker configuration.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
}

impl BrokerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("BROKER_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            port: env_or("BROKER_PORT", DEFAULT_BROKER_PORT),
        }
    }
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SERVER_HOST.to_string(),
            port: DEFAULT_BROKER_PORT,
        }
    }
}
