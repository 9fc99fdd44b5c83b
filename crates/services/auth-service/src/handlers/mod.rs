//! HTTP handlers.

mod auth_handler;
mod health_handler;

pub use auth_handler::{auth_routes, authenticate, AuthenticateRequest};
pub use health_handler::{health_check, health_routes};
