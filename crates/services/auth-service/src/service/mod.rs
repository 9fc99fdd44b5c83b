//! Service layer - use cases built on the repository.

mod authenticator;

pub use authenticator::{Authenticator, CredentialCheck};
