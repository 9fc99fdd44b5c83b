//! Startup connection acquisition.
//!
//! The store is opened and pinged once before the service accepts traffic.
//! Failures are retried on a fixed interval; once the retry budget is spent
//! the caller gets `AppError::ConnectionExhausted` and the process should not
//! start.

use std::time::Duration;

use async_trait::async_trait;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbErr,
    Statement,
};
use tracing::{error, info, warn};

use common::{AppError, AppResult, DatabaseConfig};
use domain::{
    DEFAULT_CONNECT_ATTEMPTS, DEFAULT_CONNECT_BACKOFF_SECS, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS, DEFAULT_OPERATION_TIMEOUT_SECS,
};

/// Opens and health-checks a handle to the backing store.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Send + Sync;

    /// Open a handle for the given data-source string.
    async fn open(&self, dsn: &str) -> Result<Self::Connection, DbErr>;

    /// Round-trip to the store to prove the handle is live.
    async fn ping(&self, connection: &Self::Connection) -> Result<(), DbErr>;
}

/// SeaORM/Postgres connector with pool settings.
#[derive(Debug, Clone)]
pub struct PostgresConnector {
    max_connections: u32,
    min_connections: u32,
    connect_timeout: Duration,
}

impl PostgresConnector {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            connect_timeout: config.operation_timeout(),
        }
    }
}

impl Default for PostgresConnector {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_MAX_CONNECTIONS,
            min_connections: DEFAULT_MIN_CONNECTIONS,
            connect_timeout: Duration::from_secs(DEFAULT_OPERATION_TIMEOUT_SECS),
        }
    }
}

#[async_trait]
impl Connector for PostgresConnector {
    type Connection = DatabaseConnection;

    async fn open(&self, dsn: &str) -> Result<DatabaseConnection, DbErr> {
        let mut options = ConnectOptions::new(dsn.to_owned());
        options
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(self.connect_timeout)
            .sqlx_logging(false);

        SeaDatabase::connect(options).await
    }

    async fn ping(&self, connection: &DatabaseConnection) -> Result<(), DbErr> {
        connection
            .execute(Statement::from_string(
                connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}

/// Fixed-interval retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_attempts: u32,
    /// Sleep between consecutive attempts
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_CONNECT_ATTEMPTS,
            backoff: Duration::from_secs(DEFAULT_CONNECT_BACKOFF_SECS),
        }
    }
}

impl From<&DatabaseConfig> for RetryPolicy {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_attempts: config.connect_attempts,
            backoff: config.connect_backoff(),
        }
    }
}

/// Acquires a live connection at startup, retrying with fixed backoff.
pub struct ConnectionManager<C> {
    connector: C,
    policy: RetryPolicy,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, policy: RetryPolicy) -> Self {
        Self { connector, policy }
    }

    /// Open and ping the store until it answers or the budget runs out.
    ///
    /// The first attempt is always made; `max_attempts` more follow it
    /// before the store is declared unreachable.
    pub async fn connect(&self, dsn: &str) -> AppResult<C::Connection> {
        let max_attempts = self.policy.max_attempts;
        let mut failures = 0;

        loop {
            let attempt = failures + 1;
            match self.try_connect(dsn).await {
                Ok(connection) => {
                    info!(attempt, "Connected to postgres");
                    return Ok(connection);
                }
                Err(e) => {
                    failures += 1;
                    warn!(attempt, max_attempts, error = %e, "Postgres not yet ready");

                    if failures > max_attempts {
                        error!(attempts = failures, "Giving up on postgres");
                        return Err(AppError::ConnectionExhausted { attempts: failures });
                    }

                    info!(
                        backoff_ms = self.policy.backoff.as_millis() as u64,
                        "Backing off before next attempt"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                }
            }
        }
    }

    async fn try_connect(&self, dsn: &str) -> Result<C::Connection, DbErr> {
        let connection = self.connector.open(dsn).await?;
        self.connector.ping(&connection).await?;
        Ok(connection)
    }
}

/// Connect to Postgres with the given retry budget and default pool settings.
pub async fn connect(
    dsn: &str,
    max_attempts: u32,
    backoff: Duration,
) -> AppResult<DatabaseConnection> {
    ConnectionManager::new(
        PostgresConnector::default(),
        RetryPolicy {
            max_attempts,
            backoff,
        },
    )
    .connect(dsn)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_from_config() {
        let config = DatabaseConfig {
            connect_attempts: 4,
            connect_backoff_secs: 7,
            ..DatabaseConfig::default()
        };
        let policy = RetryPolicy::from(&config);

        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.backoff, Duration::from_secs(7));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 10);
        assert_eq!(policy.backoff, Duration::from_secs(2));
    }
}
