//! Identifier types for WaterMap.
//!
//! This module provides strongly-typed identifiers for catalog points, users,
//! payments, and admins.
//!
//! # Macro-based ID Types
//!
//! The `row_id_type!` macro reduces boilerplate for the storage-assigned
//! integer identifier types, ensuring consistent implementation of
//! serialization, parsing, and display traits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Macro to define an integer row-identifier type with standard trait
/// implementations.
///
/// This macro generates a newtype wrapper around `i64` with implementations
/// for:
/// - `Clone`, `Copy`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - `Serialize`, `Deserialize` (as a bare integer)
/// - `FromStr`, `Display`, `Debug`
/// - `From<i64>`
macro_rules! row_id_type {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Create an identifier from a raw row id.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Return the underlying integer.
            #[must_use]
            pub const fn as_i64(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<i64>().map(Self)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id_type!(
    PointId,
    "A water-point identifier, assigned by the storage layer on insert."
);
row_id_type!(
    UserId,
    "A user identifier, assigned by the storage layer on insert.\n\nUser ids also appear in the `id` claim of bearer tokens."
);
row_id_type!(
    PaymentId,
    "A payment identifier, assigned by the storage layer on insert.\n\nPayment rows are append-only, so ids reflect insertion order."
);
row_id_type!(
    AdminId,
    "An admin identifier, assigned by the storage layer on insert."
);
