//! SQLite storage layer for WaterMap.
//!
//! This crate provides persistent storage for water points, users, the
//! payment ledger, and the admin account using `sqlx` over SQLite.
//!
//! # Architecture
//!
//! Four tables (see [`schema`]): `water_points`, `users`, `payments`,
//! `admins`. Schema creation is an explicit, idempotent
//! [`SqliteStore::migrate`] call made by binaries before serving — never
//! implicitly per request.
//!
//! The one compound operation is [`Store::record_payment`], which applies a
//! settlement (balance debit/credit, volume increment, ledger append) as a
//! single transaction with a guarded conditional debit, so a stale balance
//! read can never double-spend.
//!
//! # Example
//!
//! ```no_run
//! use watermap_store::{SqliteStore, Store};
//!
//! # async fn demo() -> watermap_store::Result<()> {
//! let store = SqliteStore::connect("sqlite://watermap.db").await?;
//! store.migrate().await?;
//!
//! let points = store.list_points(0, 100).await?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod schema;
pub mod sqlite;

pub use error::{Result, StoreError};
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use watermap_core::{
    Admin, Payment, PaymentMethod, PointId, User, UserId, WaterPoint, WaterPointDraft,
};

/// Filter for catalog search.
///
/// `query` is a case-insensitive substring matched against name,
/// description, and address (OR-combined); the remaining filters are exact
/// matches except `min_rating`, which is an inclusive lower bound.
#[derive(Debug, Clone, Default)]
pub struct PointFilter {
    /// Substring to match against name/description/address.
    pub query: Option<String>,
    /// Exact point category label.
    pub kind: Option<String>,
    /// Exact city name.
    pub city: Option<String>,
    /// Exact region name.
    pub region: Option<String>,
    /// Inclusive lower bound on rating.
    pub min_rating: Option<f64>,
    /// Pagination offset.
    pub offset: i64,
    /// Pagination limit.
    pub limit: i64,
}

/// Payload for creating a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email, unique.
    pub email: String,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
}

/// Payload for updating a user's own fields.
///
/// Loyalty counters are deliberately absent: only the payment engine moves
/// them.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    /// New display name.
    pub name: String,
    /// New login email.
    pub email: String,
    /// New password hash, when the password is being changed.
    pub password_hash: Option<String>,
}

/// A validated purchase ready to be applied transactionally.
///
/// `debit` and `bonus_earned` come from the core settlement rule; the store
/// trusts them but still guards the debit against the live balance.
#[derive(Debug, Clone)]
pub struct PaymentOrder {
    /// The paying user.
    pub user_id: UserId,
    /// Where the water was purchased.
    pub water_point_id: PointId,
    /// Purchased volume in liters.
    pub volume: f64,
    /// Paid amount.
    pub amount: f64,
    /// How the purchase was paid for.
    pub method: PaymentMethod,
    /// Bonus liters to debit (settlement output). Recorded on the ledger
    /// row as the actual `bonus_used`.
    pub debit: f64,
    /// Bonus liters to credit (settlement output).
    pub bonus_earned: f64,
}

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different
/// implementations (e.g. SQLite, in-memory for testing).
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Water Point Operations
    // =========================================================================

    /// List water points in insertion order with offset/limit pagination.
    async fn list_points(&self, offset: i64, limit: i64) -> Result<Vec<WaterPoint>>;

    /// Search water points by the given filter, in insertion order.
    async fn search_points(&self, filter: &PointFilter) -> Result<Vec<WaterPoint>>;

    /// Get a water point by id.
    async fn get_point(&self, id: PointId) -> Result<Option<WaterPoint>>;

    /// Insert a new water point and return it with its assigned id.
    async fn create_point(&self, draft: &WaterPointDraft) -> Result<WaterPoint>;

    /// Fully replace a water point's fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist.
    async fn update_point(&self, id: PointId, draft: &WaterPointDraft) -> Result<WaterPoint>;

    /// Delete a water point.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist.
    async fn delete_point(&self, id: PointId) -> Result<()>;

    /// Bulk-insert water points in one transaction, returning the count.
    async fn import_points(&self, drafts: &[WaterPointDraft]) -> Result<u64>;

    // =========================================================================
    // User Operations
    // =========================================================================

    /// Insert a new user with zeroed loyalty counters.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the email is already registered.
    async fn create_user(&self, new: &NewUser) -> Result<User>;

    /// Get a user by id.
    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Get a user by email (for login).
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// List all users in insertion order.
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Update a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist, or
    /// [`StoreError::Conflict`] if the new email collides.
    async fn update_user(&self, id: UserId, update: &UserUpdate) -> Result<User>;

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the id does not exist.
    async fn delete_user(&self, id: UserId) -> Result<()>;

    // =========================================================================
    // Payment Operations
    // =========================================================================

    /// Apply a settled purchase as one atomic unit: guard-debit and credit
    /// the user's balance, increment total volume, and append the ledger
    /// row with a server-stamped timestamp.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the user or water point is absent.
    /// - [`StoreError::InsufficientBalance`] if the balance cannot cover
    ///   the debit.
    /// - [`StoreError::Database`] on storage failure; no partial state is
    ///   left behind.
    async fn record_payment(&self, order: &PaymentOrder) -> Result<Payment>;

    /// List a user's payments in insertion order.
    async fn list_payments_by_user(&self, user_id: UserId) -> Result<Vec<Payment>>;

    // =========================================================================
    // Admin Operations
    // =========================================================================

    /// Number of admin rows (0 or 1 by construction).
    async fn count_admins(&self) -> Result<i64>;

    /// Get the admin by username (for login).
    async fn get_admin_by_username(&self, username: &str) -> Result<Option<Admin>>;

    /// Create the first admin if and only if no admin exists yet.
    ///
    /// Returns `None` without writing anything when an admin row is
    /// already present.
    async fn bootstrap_admin(&self, username: &str, password_hash: &str) -> Result<Option<Admin>>;

    /// Replace the current admin with a new one in a single transaction
    /// (delete-then-insert, preserving the single-admin invariant).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if the new username matches the
    /// current admin's; the table is left unchanged.
    async fn rotate_admin(&self, username: &str, password_hash: &str) -> Result<Admin>;

    /// Delete every admin row (maintenance utility only), returning the
    /// count removed.
    async fn delete_all_admins(&self) -> Result<u64>;
}
