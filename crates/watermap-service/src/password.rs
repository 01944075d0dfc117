//! Password hashing and verification.
//!
//! Argon2id with per-password random salts, stored as PHC strings.
//! Verification reuses the argon2 crate's comparison, which is
//! constant-time by construction.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

use crate::error::ApiError;

/// Hash a password into a PHC-format string.
///
/// # Errors
///
/// Returns [`ApiError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            ApiError::Internal("password hashing failed".into())
        })
}

/// Verify a password against a stored PHC hash.
///
/// Returns `false` for malformed hashes as well as mismatches; callers do
/// not learn which it was.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
