//! Password hashing capability.

use std::sync::Arc;

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use reviewboard_common::{AppError, AppResult};

/// One-way, salted password hashing.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password.
    fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// Check a plaintext password against a stored digest.
    fn verify(&self, plaintext: &str, digest: &str) -> AppResult<bool>;
}

pub type SharedPasswordHasher = Arc<dyn PasswordHasher>;

/// Argon2id with default parameters, stored as a PHC string.
#[derive(Clone, Default)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
    }

    fn verify(&self, plaintext: &str, digest: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(digest)
            .map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

        Ok(Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
