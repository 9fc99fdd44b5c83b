//! Credential check - the login-side caller of the credential hasher.
//!
//! Confirms that an email/password pair matches a stored record. It issues
//! no tokens and keeps no session; callers decide what a successful check
//! grants.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use common::{AppError, AppResult};
use domain::{CredentialHasher, User};

use crate::repository::UserRepository;

/// Credential check trait for dependency injection.
#[async_trait]
pub trait CredentialCheck: Send + Sync {
    /// Return the user when `password` matches the stored credential for `email`
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User>;
}

/// Concrete credential check backed by the user repository.
pub struct Authenticator {
    repo: Arc<dyn UserRepository>,
    hasher: CredentialHasher,
    dummy_hash: String,
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Errors
    /// Fails if the hasher cannot produce the placeholder hash used for
    /// unknown emails.
    pub fn new(repo: Arc<dyn UserRepository>, hasher: CredentialHasher) -> AppResult<Self> {
        let dummy_hash = hasher.hash("placeholder-credential")?;
        Ok(Self {
            repo,
            hasher,
            dummy_hash,
        })
    }
}

#[async_trait]
impl CredentialCheck for Authenticator {
    async fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        let user = match self.repo.get_by_email(email).await {
            Ok(user) => Some(user),
            Err(AppError::NotFound) => None,
            Err(e) => return Err(e),
        };

        // Verify even when the email is unknown so response timing does not
        // reveal which emails exist.
        let stored_hash = user
            .as_ref()
            .map(|u| u.password_hash.clone())
            .unwrap_or_else(|| self.dummy_hash.clone());
        let hasher = self.hasher.clone();
        let password = password.to_owned();
        let password_valid =
            tokio::task::spawn_blocking(move || hasher.verify(&password, &stored_hash))
                .await
                .map_err(|e| AppError::internal(format!("Verification task failed: {}", e)))??;

        match user {
            Some(user) if password_valid => {
                info!(user_id = user.id, "User authenticated");
                Ok(user)
            }
            _ => {
                warn!("Authentication failed");
                Err(AppError::InvalidCredentials)
            }
        }
    }
}
