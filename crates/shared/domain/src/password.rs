//! Credential hasher - the only place plaintext credentials are transformed
//! or compared.
//!
//! Hashes are Argon2id PHC strings with a random per-hash salt. The work
//! factor is fixed per hasher instance; verification reads the parameters
//! back out of the stored hash, so raising the work factor later does not
//! invalidate existing records.

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::constants::{
    DEFAULT_HASH_ITERATIONS, DEFAULT_HASH_MEMORY_KIB, DEFAULT_HASH_PARALLELISM,
    MAX_CREDENTIAL_BYTES,
};
use crate::error::{DomainError, DomainResult};

/// Argon2 work factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingParams {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_kib: DEFAULT_HASH_MEMORY_KIB,
            iterations: DEFAULT_HASH_ITERATIONS,
            parallelism: DEFAULT_HASH_PARALLELISM,
        }
    }
}

/// Stateless Argon2id hasher; cheap to clone and safe to share across threads.
#[derive(Debug, Clone)]
pub struct CredentialHasher {
    params: Params,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self {
            params: Params::default(),
        }
    }
}

impl CredentialHasher {
    /// Build a hasher with the given work factor.
    ///
    /// # Errors
    /// Returns a hashing error if Argon2 rejects the parameters
    /// (e.g. memory below `8 * parallelism` KiB).
    pub fn new(params: HashingParams) -> DomainResult<Self> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            None,
        )
        .map_err(|e| DomainError::InvalidParams(e.to_string()))?;
        Ok(Self { params })
    }

    /// Hash a plaintext credential for storage.
    ///
    /// # Errors
    /// Fails only when the plaintext exceeds `MAX_CREDENTIAL_BYTES` or the
    /// algorithm itself errors.
    pub fn hash(&self, plaintext: &str) -> DomainResult<String> {
        if plaintext.len() > MAX_CREDENTIAL_BYTES {
            return Err(DomainError::CredentialTooLong {
                len: plaintext.len(),
                max: MAX_CREDENTIAL_BYTES,
            });
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| DomainError::hashing(format!("Password hash failed: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a plaintext credential against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch.
    ///
    /// # Errors
    /// Fails only when `stored_hash` is not a valid hash string.
    pub fn verify(&self, plaintext: &str, stored_hash: &str) -> DomainResult<bool> {
        let parsed = PasswordHash::new(stored_hash)
            .map_err(|e| DomainError::MalformedHash(e.to_string()))?;

        // Nothing this long was ever hashed
        if plaintext.len() > MAX_CREDENTIAL_BYTES {
            return Ok(false);
        }

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(DomainError::hashing(format!("Password verify failed: {}", e))),
        }
    }

    #[inline]
    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}
