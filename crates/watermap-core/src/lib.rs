//! Core types and rules for the WaterMap platform.
//!
//! This crate provides the foundational types used throughout WaterMap:
//!
//! - **Identifiers**: `PointId`, `UserId`, `PaymentId`, `AdminId`
//! - **Catalog**: `WaterPoint`, `WaterPointDraft`
//! - **Accounts**: `User`, `Admin`
//! - **Ledger**: `Payment`, `PaymentMethod`, purchase settlement
//!
//! # Bonus Unit
//!
//! Bonus balance is denominated in liters: every complete 20-liter block in
//! a purchase earns 5 bonus liters, spendable toward future purchases.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod admin;
pub mod error;
pub mod ids;
pub mod payment;
pub mod point;
pub mod user;

pub use admin::Admin;
pub use error::{LedgerError, Result};
pub use ids::{AdminId, PaymentId, PointId, UserId};
pub use payment::{
    bonus_earned, settle_purchase, Payment, PaymentMethod, Settlement, BONUS_BLOCK_LITERS,
    BONUS_PER_BLOCK,
};
pub use point::{WaterPoint, WaterPointDraft};
pub use user::User;
