//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! the user record, the insertion candidate, and the credential hasher that
//! every write of a credential goes through.

pub mod constants;
pub mod error;
pub mod password;
pub mod user;

pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use password::{CredentialHasher, HashingParams};
pub use user::{CreateUser, User, UserId, UserResponse};
