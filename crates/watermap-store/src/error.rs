//! Error types for WaterMap storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(String),

    /// Record not found.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up.
        entity: &'static str,
        /// The id that did not resolve.
        id: i64,
    },

    /// A uniqueness constraint was violated (duplicate email or username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Bonus debit exceeds the current balance.
    #[error("insufficient bonus balance: balance={balance}, required={required}")]
    InsufficientBalance {
        /// Balance observed inside the transaction.
        balance: f64,
        /// The debit that was requested.
        required: f64,
    },
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl StoreError {
    /// Convert an insert error into [`StoreError::Conflict`] when it was a
    /// uniqueness violation, passing other errors through as `Database`.
    pub(crate) fn conflict_on_unique(err: sqlx::Error, message: &str) -> Self {
        if err
            .as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            Self::Conflict(message.to_string())
        } else {
            Self::from(err)
        }
    }
}
