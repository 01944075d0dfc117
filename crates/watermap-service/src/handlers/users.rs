//! User registration, profile, and login handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use watermap_core::{User, UserId};
use watermap_store::{NewUser, Store, UserUpdate};

use crate::auth::{self, AdminAuth, AuthUser};
use crate::error::ApiError;
use crate::password;
use crate::state::AppState;

/// User response, without the password hash.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Loyalty balance in liters.
    pub bonus_balance: f64,
    /// Lifetime purchased volume in liters.
    pub total_volume: f64,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            bonus_balance: user.bonus_balance,
            total_volume: user.total_volume,
        }
    }
}

/// Registration request.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Login email, unique.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

/// Profile update request. Omitting `password` keeps the current one.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New display name.
    pub name: String,
    /// New login email.
    pub email: String,
    /// New password, when changing it.
    #[serde(default)]
    pub password: Option<String>,
}

/// Login form (`application/x-www-form-urlencoded`). The `username` field
/// carries the account email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Account email.
    pub username: String,
    /// Plaintext password.
    pub password: String,
}

/// Issued-token response.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: &'static str,
}

impl TokenResponse {
    pub(crate) fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Register a new user.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let password_hash = password::hash_password(&body.password)?;

    let user = state
        .store
        .create_user(&NewUser {
            name: body.name,
            email: body.email,
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(UserResponse::from(&user)))
}

/// Fetch one user by id.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .store
        .get_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user not found: {id}")))?;

    Ok(Json(UserResponse::from(&user)))
}

/// List all users.
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminAuth,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.store.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Update a user's profile. Callers may update themselves; admins may
/// update anyone.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    auth: AuthUser,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    if !auth.is_admin && auth.user_id != id {
        return Err(ApiError::Forbidden);
    }

    let password_hash = body
        .password
        .as_deref()
        .map(password::hash_password)
        .transpose()?;

    let user = state
        .store
        .update_user(
            id,
            &UserUpdate {
                name: body.name,
                email: body.email,
                password_hash,
            },
        )
        .await?;

    tracing::info!(user_id = %id, "User updated");

    Ok(Json(UserResponse::from(&user)))
}

/// Delete a user.
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    admin: AdminAuth,
    Path(id): Path<UserId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_user(id).await?;

    tracing::info!(user_id = %id, admin = %admin.username, "User deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Issue a user token for valid credentials.
///
/// Bad email and bad password are indistinguishable to the caller.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .store
        .get_user_by_email(&form.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !password::verify_password(&form.password, &user.password_hash) {
        return Err(ApiError::Unauthorized);
    }

    let token = auth::issue_token(&state.config.jwt_secret, &user.email, user.id.as_i64(), false)?;

    tracing::debug!(user_id = %user.id, "User logged in");

    Ok(Json(TokenResponse::bearer(token)))
}
