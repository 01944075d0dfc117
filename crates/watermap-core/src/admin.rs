//! Admin account type.

use crate::AdminId;

/// The administrative account.
///
/// The bootstrap service guarantees at most one admin row exists at any
/// time; rotation replaces the row rather than appending.
#[derive(Debug, Clone, PartialEq)]
pub struct Admin {
    /// Storage-assigned identifier.
    pub id: AdminId,
    /// Login username, unique.
    pub username: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}
