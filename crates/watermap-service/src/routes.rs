//! Router configuration.
//!
//! This module sets up the Axum router with all routes and middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, payments, points, users};
use crate::state::AppState;

/// Maximum concurrent requests on the payment endpoint. Payments hold a
/// write transaction on the single-writer database, so there is no point
/// letting a burst pile up inside the handler.
const PAY_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Create the service router with all routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
/// - `GET /water-points` - Paginated catalog list
/// - `GET /water-points/search` - Filtered search
/// - `GET /water-points/{id}` - Fetch one point
/// - `POST /users`, `POST /register` - Register a user
/// - `GET /users/{id}` - Fetch a user
/// - `GET /users/{id}/payments` - Payment history
/// - `POST /login`, `POST /admin-login` - Issue tokens
/// - `POST /admin-create` - Bootstrap (token required once an admin exists)
///
/// ## Authenticated
/// - `POST/PUT/DELETE /water-points*` - Admin token
/// - `GET /users` - Admin token
/// - `PUT /users/{id}` - Self or admin token
/// - `DELETE /users/{id}` - Admin token
/// - `POST /pay` - User token (self) or admin token
pub fn create_router(state: AppState) -> Router {
    // Extract config values before moving state
    let cors_origins = state.config.cors_origins.clone();
    let max_body_bytes = state.config.max_body_bytes;
    let request_timeout_seconds = state.config.request_timeout_seconds;

    let cors = build_cors_layer(&cors_origins);

    let state = Arc::new(state);

    Router::new()
        .route("/health", get(health::health))
        // Catalog
        .route(
            "/water-points",
            get(points::list_points).post(points::create_point),
        )
        .route("/water-points/search", get(points::search_points))
        .route(
            "/water-points/:id",
            get(points::get_point)
                .put(points::update_point)
                .delete(points::delete_point),
        )
        // Users
        .route("/users", get(users::list_users).post(users::register))
        .route("/register", post(users::register))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/:id/payments", get(payments::list_user_payments))
        // Auth
        .route("/login", post(users::login))
        .route("/admin-login", post(admin::admin_login))
        .route("/admin-create", post(admin::create_admin))
        // Ledger
        .route(
            "/pay",
            post(payments::pay).layer(ConcurrencyLimitLayer::new(PAY_MAX_CONCURRENT_REQUESTS)),
        )
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            request_timeout_seconds,
        )))
        .with_state(state)
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
