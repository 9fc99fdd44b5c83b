//! Broker Library
//!
//! The public entry point in front of the auth service. It currently only
//! acknowledges requests.

pub mod config;
pub mod handlers;
pub mod routes;

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::info;

use crate::routes::create_router;

/// Run the broker as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router().layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Broker listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
