//! Application state for dependency injection.

use std::sync::Arc;

use crate::infra::Database;
use crate::service::CredentialCheck;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<dyn CredentialCheck>,
    pub db: Database,
}

impl AppState {
    /// Create new app state.
    pub fn new(authenticator: Arc<dyn CredentialCheck>, db: Database) -> Self {
        Self { authenticator, db }
    }
}
