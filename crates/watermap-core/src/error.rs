//! Error types for WaterMap core rules.

/// Result type for core ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by the purchase-settlement rule.
///
/// These are the "schema-valid but semantically rejected" conditions: the
/// request deserialized fine, but the values violate a ledger invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    /// Purchase volume must be strictly positive.
    #[error("volume must be positive, got {0}")]
    NonPositiveVolume(f64),

    /// Payment amount must be strictly positive.
    #[error("amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    /// Redeemed bonus cannot be negative.
    #[error("bonus_used must not be negative, got {0}")]
    NegativeBonusUsed(f64),

    /// The payment method is not one of the accepted labels.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}
