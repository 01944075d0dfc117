//! WaterMap HTTP API Service.
//!
//! This crate provides the HTTP API for the WaterMap platform, including:
//!
//! - Water-point catalog CRUD and search
//! - User registration and profiles
//! - The loyalty/payment ledger
//! - Admin bootstrap, rotation, and login
//!
//! # Authentication
//!
//! The service issues HS256-signed bearer tokens from `/login` and
//! `/admin-login`; admin tokens additionally carry an `is_admin` claim.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Handlers need async for routing consistency

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod password;
pub mod routes;
pub mod state;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
