//! Token issuance, verification, and request extractors.
//!
//! This module provides:
//! - [`issue_token`] / [`verify_token`] - HS256 bearer tokens with a
//!   60-minute lifetime
//! - [`AuthUser`] - extractor for any authenticated caller
//! - [`AdminAuth`] - extractor for admin-flagged tokens
//!
//! Every verification failure — bad signature, expired, malformed, missing
//! claim — surfaces as the same [`ApiError::Unauthorized`], so callers
//! cannot probe which check failed.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use watermap_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// Token lifetime in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Claims carried by WaterMap bearer tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identity: user email, or admin username.
    pub sub: String,
    /// Numeric row id of the subject.
    pub id: i64,
    /// Present and `true` only on admin tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiration (unix seconds).
    pub exp: i64,
}

/// Sign a bearer token for the given subject.
pub fn issue_token(secret: &str, sub: &str, id: i64, is_admin: bool) -> Result<String, ApiError> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: sub.to_string(),
        id,
        is_admin: is_admin.then_some(true),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!(error = %e, "Token signing failed");
        ApiError::Internal("token signing failed".into())
    })
}

/// Verify a bearer token and return its claims.
pub fn verify_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, "Token verification failed");
        ApiError::Unauthorized
    })
}

/// Pull the bearer token out of an `Authorization` header.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(ApiError::Unauthorized)
}

/// Verify the request's token and require the admin flag.
///
/// A valid non-admin token is [`ApiError::Forbidden`]; everything else is
/// [`ApiError::Unauthorized`].
pub fn require_admin(headers: &HeaderMap, secret: &str) -> Result<Claims, ApiError> {
    let claims = verify_token(secret, bearer_token(headers)?)?;
    if claims.is_admin != Some(true) {
        return Err(ApiError::Forbidden);
    }
    Ok(claims)
}

/// An authenticated caller extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The caller's user id (admin row id for admin tokens).
    pub user_id: UserId,
    /// The raw subject claim.
    pub subject: String,
    /// Whether the token carries the admin flag.
    pub is_admin: bool,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let token = bearer_token(&parts.headers)?;
            let claims = verify_token(&state.config.jwt_secret, token)?;

            Ok(AuthUser {
                user_id: UserId::new(claims.id),
                subject: claims.sub,
                is_admin: claims.is_admin == Some(true),
            })
        })
    }
}

/// An authenticated admin extracted from an admin-flagged bearer token.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    /// Admin username (for audit logging).
    pub username: String,
}

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let claims = require_admin(&parts.headers, &state.config.jwt_secret)?;

            tracing::debug!(username = %claims.sub, "Admin authenticated");

            Ok(AdminAuth {
                username: claims.sub,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_roundtrip_preserves_claims() {
        let token = issue_token(SECRET, "user@example.com", 7, false).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, "user@example.com");
        assert_eq!(claims.id, 7);
        assert_eq!(claims.is_admin, None);
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_SECS);
    }

    #[test]
    fn admin_flag_is_carried() {
        let token = issue_token(SECRET, "root", 1, true).unwrap();
        let claims = verify_token(SECRET, &token).unwrap();
        assert_eq!(claims.is_admin, Some(true));
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let token = issue_token(SECRET, "user@example.com", 7, false).unwrap();
        assert!(matches!(
            verify_token("other-secret", &token),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn expired_token_fails_verification() {
        // Sign a token whose lifetime has already elapsed, past the
        // validator's leeway.
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: "user@example.com".into(),
            id: 7,
            is_admin: None,
            iat: now - 2 * TOKEN_TTL_SECS,
            exp: now - TOKEN_TTL_SECS,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(
            verify_token(SECRET, &token),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn garbage_token_fails_verification() {
        assert!(matches!(
            verify_token(SECRET, "not.a.token"),
            Err(ApiError::Unauthorized)
        ));
    }

    #[test]
    fn require_admin_rejects_plain_user_tokens() {
        let token = issue_token(SECRET, "user@example.com", 7, false).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

        assert!(matches!(
            require_admin(&headers, SECRET),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn require_admin_accepts_admin_tokens() {
        let token = issue_token(SECRET, "root", 1, true).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("authorization", format!("Bearer {token}").parse().unwrap());

        let claims = require_admin(&headers, SECRET).unwrap();
        assert_eq!(claims.sub, "root");
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let headers = HeaderMap::new();
        assert!(matches!(
            require_admin(&headers, SECRET),
            Err(ApiError::Unauthorized)
        ));
    }
}
