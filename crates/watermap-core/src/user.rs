//! User account type.

use crate::UserId;

/// A registered user of the service.
///
/// `bonus_balance` and `total_volume` are owned by the payment engine: no
/// other code path mutates them. `total_volume` is monotonically
/// non-decreasing over the lifetime of the account.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    /// Storage-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique across users.
    pub email: String,
    /// Argon2 PHC-format password hash. Never serialized to clients.
    pub password_hash: String,
    /// Loyalty balance in liters.
    pub bonus_balance: f64,
    /// Lifetime purchased volume in liters.
    pub total_volume: f64,
}
