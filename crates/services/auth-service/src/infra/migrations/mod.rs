//! Schema for the users table.

use sea_orm_migration::prelude::*;

mod m20240101_000001_create_users_table;

/// Applied at boot and by the `migrate` subcommands.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_users_table::Migration)]
    }
}
