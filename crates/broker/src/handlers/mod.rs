//! HTTP handlers.

mod broker_handler;
mod health_handler;

pub use broker_handler::{broker, broker_routes};
pub use health_handler::{health_check, health_routes};
