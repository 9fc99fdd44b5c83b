//! Infrastructure layer - store connection and schema.

pub mod connection;
mod db;
pub mod migrations;

pub use connection::{connect, ConnectionManager, Connector, PostgresConnector, RetryPolicy};
pub use db::Database;
pub use migrations::Migrator;
