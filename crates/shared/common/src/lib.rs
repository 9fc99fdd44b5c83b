//! Common utilities shared across all services.
//!
//! This crate provides:
//! - Unified error handling for the core and its HTTP callers
//! - Configuration structures
//! - The JSON response envelope every service speaks

pub mod config;
pub mod error;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use response::JsonResponse;
