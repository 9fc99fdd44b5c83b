//! Domain-level errors.
//!
//! Everything the credential hasher can fail on. Store and transport
//! failures live in `common::AppError`.

use thiserror::Error;

/// Credential hashing failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The configured work factor is not accepted by Argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Plaintext longer than the hasher accepts
    #[error("Credential is {len} bytes, limit is {max}")]
    CredentialTooLong { len: usize, max: usize },

    /// Stored value does not parse as a PHC hash string
    #[error("Malformed credential hash: {0}")]
    MalformedHash(String),

    /// The algorithm itself failed
    #[error("Hashing error: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn hashing(msg: impl Into<String>) -> Self {
        DomainError::Hashing(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
