//! Combined binary for development - runs the auth service and the broker in one process.

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "user-platform")]
#[command(about = "Auth service and broker in a single binary for development")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run both services in a single process (development mode)
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
        #[arg(long, env = "BROKER_PORT", default_value = "8082")]
        broker_port: u16,
        #[arg(long, env = "AUTH_SERVICE_PORT", default_value = "8081")]
        auth_port: u16,
    },
    /// Run database migrations for the auth service
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            broker_port,
            auth_port,
        } => {
            info!(
                broker = %format!("http://{}:{}", host, broker_port),
                auth_service = %format!("http://{}:{}", host, auth_port),
                "Starting combined services in development mode"
            );

            // Both run on this task; the first failure ends the process
            let result = tokio::try_join!(
                auth_service_lib::run_embedded(&host, auth_port),
                broker_lib::run_embedded(&host, broker_port),
            );
            if let Err(e) = result {
                error!("Service exited: {}", e);
                return Err(e);
            }
        }
        Commands::Migrate { action } => {
            let migrate_action = match action {
                MigrateAction::Up => auth_service_lib::MigrateAction::Up,
                MigrateAction::Down => auth_service_lib::MigrateAction::Down,
                MigrateAction::Status => auth_service_lib::MigrateAction::Status,
                MigrateAction::Fresh => auth_service_lib::MigrateAction::Fresh,
            };

            auth_service_lib::run_migrations(migrate_action).await?;
        }
    }

    Ok(())
}
