//! Database schema definitions.
//!
//! This module defines the DDL for the four WaterMap tables. Every
//! statement is idempotent (`CREATE TABLE IF NOT EXISTS`) so that
//! [`migrate`](crate::SqliteStore::migrate) can run at every deployment
//! without inspecting current state.
//!
//! Payments intentionally carry no foreign-key constraints: referential
//! integrity against users and water points is checked inside the payment
//! transaction instead.

/// DDL statements for the WaterMap database.
pub mod ddl {
    /// Catalog of water-access points.
    pub const WATER_POINTS: &str = "\
CREATE TABLE IF NOT EXISTS water_points (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    description   TEXT,
    type          TEXT,
    address       TEXT,
    city          TEXT,
    country       TEXT,
    rating        REAL,
    website       TEXT,
    reviews_count INTEGER,
    region        TEXT,
    timezone      TEXT,
    phone         TEXT,
    latitude      REAL NOT NULL,
    longitude     REAL NOT NULL
)";

    /// Registered users with their loyalty counters.
    pub const USERS: &str = "\
CREATE TABLE IF NOT EXISTS users (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    name          TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    bonus_balance REAL NOT NULL DEFAULT 0,
    total_volume  REAL NOT NULL DEFAULT 0
)";

    /// Append-only payment ledger.
    pub const PAYMENTS: &str = "\
CREATE TABLE IF NOT EXISTS payments (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id        INTEGER NOT NULL,
    water_point_id INTEGER NOT NULL,
    volume         REAL NOT NULL,
    amount         REAL NOT NULL,
    payment_method TEXT NOT NULL,
    bonus_used     REAL NOT NULL DEFAULT 0,
    bonus_earned   REAL NOT NULL DEFAULT 0,
    timestamp      TEXT NOT NULL
)";

    /// The administrative account (at most one row).
    pub const ADMINS: &str = "\
CREATE TABLE IF NOT EXISTS admins (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
)";
}

/// Returns all DDL statements in creation order.
#[must_use]
pub fn all_tables() -> Vec<&'static str> {
    vec![ddl::WATER_POINTS, ddl::USERS, ddl::PAYMENTS, ddl::ADMINS]
}
