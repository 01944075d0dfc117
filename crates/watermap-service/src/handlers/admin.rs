//! Admin bootstrap, rotation, and login handlers.
//!
//! The admin table holds at most one row. Its lifecycle:
//!
//! - **0 rows**: `/admin-create` (and process startup) creates the single
//!   admin from the configured well-known credentials, ignoring any
//!   request body.
//! - **1 row**: `/admin-create` requires an admin token and replaces the
//!   row with the supplied credentials; the new username must not collide
//!   with the current one.
//!
//! There is no HTTP path that deletes the last admin; the `reset-admins`
//! binary exists for out-of-band recovery.

use std::sync::Arc;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::{Form, Json};
use serde::Deserialize;

use watermap_store::{SqliteStore, Store};

use crate::auth;
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::handlers::users::{LoginForm, TokenResponse};
use crate::password;
use crate::state::AppState;

/// Rotation request body.
#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    /// New admin username.
    pub username: String,
    /// New admin password.
    pub password: String,
}

/// Create the bootstrap admin if no admin exists yet. Shared between
/// process startup and the zero-row `/admin-create` branch.
pub async fn ensure_bootstrap_admin(
    store: &SqliteStore,
    config: &ServiceConfig,
) -> Result<bool, ApiError> {
    if store.count_admins().await? > 0 {
        return Ok(false);
    }

    let hash = password::hash_password(&config.bootstrap_admin_password)?;
    match store
        .bootstrap_admin(&config.bootstrap_admin_username, &hash)
        .await?
    {
        Some(admin) => {
            tracing::info!(
                username = %admin.username,
                "Bootstrap admin created - rotate the well-known credentials before going live"
            );
            Ok(true)
        }
        // Lost a bootstrap race; the invariant already holds.
        None => Ok(false),
    }
}

/// Bootstrap or rotate the admin account.
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Option<Json<CreateAdminRequest>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if state.store.count_admins().await? == 0 {
        // First run: the body is ignored, the configured credentials win.
        ensure_bootstrap_admin(&state.store, &state.config).await?;
        return Ok(Json(serde_json::json!({
            "username": state.config.bootstrap_admin_username,
            "bootstrapped": true,
        })));
    }

    let claims = auth::require_admin(&headers, &state.config.jwt_secret)?;
    let Json(body) =
        body.ok_or_else(|| ApiError::BadRequest("username and password are required".into()))?;

    let hash = password::hash_password(&body.password)?;
    let admin = state.store.rotate_admin(&body.username, &hash).await?;

    tracing::info!(
        old_admin = %claims.sub,
        new_admin = %admin.username,
        "Admin rotated"
    );

    Ok(Json(serde_json::json!({
        "username": admin.username,
        "bootstrapped": false,
    })))
}

/// Issue an admin token for valid credentials.
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let admin = state
        .store
        .get_admin_by_username(&form.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !password::verify_password(&form.password, &admin.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::issue_token(
        &state.config.jwt_secret,
        &admin.username,
        admin.id.as_i64(),
        true,
    )?;

    tracing::debug!(username = %admin.username, "Admin logged in");

    Ok(Json(TokenResponse::bearer(token)))
}
