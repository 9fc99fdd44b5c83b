//! Auth Service Library
//!
//! User persistence and credential checks over HTTP. The service owns the
//! users table: it acquires the store connection at boot (retrying with a
//! fixed backoff), applies migrations, and exposes `/authenticate` and
//! `/health`.

pub mod config;
pub mod extractors;
pub mod handlers;
pub mod infra;
pub mod repository;
pub mod routes;
pub mod service;
pub mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use domain::{CreateUser, CredentialHasher, HashingParams, UserId};

use crate::config::AuthServiceConfig;
use crate::infra::Database;
use crate::repository::{UserRepository, UserStore};
use crate::service::Authenticator;
use crate::state::AppState;

/// Run the auth service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthServiceConfig::from_env().with_bind(Some(host.to_string()), Some(port));
    run(config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AuthServiceConfig::from_env();
    let db = Database::open_unmigrated(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.migrate_up().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.migrate_down().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_report().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.reset().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Insert one user through the repository (for seeding from the CLI).
pub async fn create_user(candidate: CreateUser) -> Result<UserId, Box<dyn std::error::Error>> {
    let config = AuthServiceConfig::from_env();
    let db = Database::open(&config.database).await?;
    let repo = build_repository(&config, &db)?;

    let id = repo.insert(candidate).await?;
    info!(user_id = id, "User created");
    Ok(id)
}

fn build_repository(
    config: &AuthServiceConfig,
    db: &Database,
) -> Result<UserStore, Box<dyn std::error::Error>> {
    let hasher = CredentialHasher::new(HashingParams::from(&config.hashing))?;
    Ok(UserStore::new(db.handle(), hasher)
        .with_operation_timeout(config.database.operation_timeout()))
}

/// Run the HTTP server on the configured address.
pub async fn run(config: AuthServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Connection first; nothing is served until the store answers
    let db = Database::open(&config.database).await?;

    let hasher = CredentialHasher::new(HashingParams::from(&config.hashing))?;
    let user_repo: Arc<dyn UserRepository> = Arc::new(build_repository(&config, &db)?);
    let authenticator = Arc::new(Authenticator::new(user_repo, hasher)?);

    let state = AppState::new(authenticator, db);
    let app = routes::create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Auth service listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
