//! Store handle shared by the repository and the health check.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::{MigrationStatus, MigratorTrait};
use tracing::info;

use common::{AppResult, DatabaseConfig};

use super::connection::{ConnectionManager, Connector, PostgresConnector, RetryPolicy};
use super::migrations::Migrator;

/// Live store connection plus schema management.
#[derive(Clone)]
pub struct Database {
    connection: Arc<DatabaseConnection>,
    connector: PostgresConnector,
}

impl Database {
    /// Acquire a connection (retrying per config) and bring the schema up to date.
    pub async fn open(config: &DatabaseConfig) -> AppResult<Self> {
        let db = Self::open_unmigrated(config).await?;
        db.migrate_up().await?;
        info!("Schema up to date");
        Ok(db)
    }

    /// Acquire a connection without touching the schema.
    pub async fn open_unmigrated(config: &DatabaseConfig) -> AppResult<Self> {
        let connector = PostgresConnector::from_config(config);
        let connection = ConnectionManager::new(connector.clone(), RetryPolicy::from(config))
            .connect(&config.url)
            .await?;
        Ok(Self {
            connection: Arc::new(connection),
            connector,
        })
    }

    /// Wrap a connection that is already established.
    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Self {
            connection: Arc::new(connection),
            connector: PostgresConnector::default(),
        }
    }

    /// Pooled handle for the repository.
    pub fn handle(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.connection)
    }

    pub async fn migrate_up(&self) -> Result<(), DbErr> {
        Migrator::up(self.connection.as_ref(), None).await
    }

    /// Revert the most recent migration.
    pub async fn migrate_down(&self) -> Result<(), DbErr> {
        Migrator::down(self.connection.as_ref(), Some(1)).await
    }

    /// Every known migration with whether it has been applied.
    pub async fn migration_report(&self) -> Result<Vec<(String, bool)>, DbErr> {
        let report = Migrator::get_migration_with_status(self.connection.as_ref())
            .await?
            .iter()
            .map(|m| (m.name().to_string(), matches!(m.status(), MigrationStatus::Applied)))
            .collect();
        Ok(report)
    }

    /// Drop everything and reapply all migrations.
    pub async fn reset(&self) -> Result<(), DbErr> {
        Migrator::fresh(self.connection.as_ref()).await
    }

    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connector.ping(self.connection.as_ref()).await
    }
}
