//! Payment ledger types and the purchase-settlement rule.
//!
//! Settlement is the one real algorithm in the system: given a purchase, it
//! validates the quantities, decides how much bonus balance to debit, and
//! computes the bonus accrual. The transactional application of a
//! settlement (balance update plus ledger append) lives in the storage
//! layer; everything here is pure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LedgerError, Result};
use crate::{PaymentId, PointId, UserId};

// ============================================================================
// Constants
// ============================================================================

/// Size of a purchase block that earns bonus, in liters.
pub const BONUS_BLOCK_LITERS: f64 = 20.0;

/// Bonus liters earned per complete purchase block.
pub const BONUS_PER_BLOCK: f64 = 5.0;

/// How a purchase was paid for.
///
/// This is a closed label set: `bonus` redeems loyalty balance directly,
/// anything else settles externally (no gateway integration exists — the
/// label is recorded as-is on the ledger row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// The purchase amount is redeemed from the user's bonus balance.
    Bonus,
    /// Card payment, settled outside the system.
    Card,
}

impl PaymentMethod {
    /// The wire/storage label for this method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bonus => "bonus",
            Self::Card => "card",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bonus" => Ok(Self::Bonus),
            "card" => Ok(Self::Card),
            other => Err(LedgerError::UnknownPaymentMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable, append-only ledger row recording one purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    /// Storage-assigned identifier.
    pub id: PaymentId,
    /// The paying user.
    pub user_id: UserId,
    /// Where the water was purchased.
    pub water_point_id: PointId,
    /// Purchased volume in liters.
    pub volume: f64,
    /// Paid amount (liters for `bonus`, currency units otherwise).
    pub amount: f64,
    /// How the purchase was paid for.
    pub payment_method: PaymentMethod,
    /// Bonus liters actually debited from the user's balance.
    pub bonus_used: f64,
    /// Bonus liters credited by the accrual rule. Always server-computed.
    pub bonus_earned: f64,
    /// Server-stamped time of the purchase.
    pub timestamp: DateTime<Utc>,
}

/// The validated outcome of applying the settlement rule to a purchase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    /// How the purchase is paid for.
    pub method: PaymentMethod,
    /// Bonus liters to debit from the balance.
    pub debit: f64,
    /// Bonus liters to credit by the accrual rule.
    pub bonus_earned: f64,
}

/// Bonus accrual for a purchased volume: 5 bonus liters per complete
/// 20-liter block.
#[must_use]
pub fn bonus_earned(volume: f64) -> f64 {
    if volume <= 0.0 {
        return 0.0;
    }
    (volume / BONUS_BLOCK_LITERS).floor() * BONUS_PER_BLOCK
}

/// Validate a purchase and compute its settlement.
///
/// For the `bonus` method the whole `amount` is redeemed from the balance;
/// for other methods only the explicitly requested `bonus_used` is. The
/// sufficiency of the balance itself is checked transactionally by the
/// storage layer, not here.
///
/// # Errors
///
/// Returns a [`LedgerError`] when volume or amount is not strictly positive
/// or `bonus_used` is negative. The comparisons are written so that NaN
/// inputs are rejected as well.
pub fn settle_purchase(
    method: PaymentMethod,
    volume: f64,
    amount: f64,
    bonus_used: f64,
) -> Result<Settlement> {
    if !(volume > 0.0) {
        return Err(LedgerError::NonPositiveVolume(volume));
    }
    if !(amount > 0.0) {
        return Err(LedgerError::NonPositiveAmount(amount));
    }
    if !(bonus_used >= 0.0) {
        return Err(LedgerError::NegativeBonusUsed(bonus_used));
    }

    let debit = match method {
        PaymentMethod::Bonus => amount,
        PaymentMethod::Card => bonus_used,
    };

    Ok(Settlement {
        method,
        debit,
        bonus_earned: bonus_earned(volume),
    })
}
