//! Password hashing using Argon2id.
//!
//! Plaintext credentials never reach the persistence layer: the user
//! service hashes them here first and stores the PHC-format string.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

use crate::domain::Error;

/// Hash a plaintext password with Argon2id and a fresh random salt.
///
/// Returns the PHC-format hash string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::internal(format!("password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, or an internal
/// error if the stored hash is malformed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, Error> {
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| Error::internal(format!("invalid hash format: {e}")))?;

    let argon2 = Argon2::default();
    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(Error::internal(format!("verify error: {e}"))),
    }
}
