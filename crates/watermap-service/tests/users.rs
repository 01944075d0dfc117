//! User registration, profile, and login integration tests.

mod common;

use axum::http::StatusCode;
use common::{bearer, TestHarness};
use serde_json::json;

// ============================================================================
// Registration
// ============================================================================

#[tokio::test]
async fn register_returns_profile_without_password() {
    let harness = TestHarness::new().await;

    let response = harness
        .server
        .post("/register")
        .json(&json!({
            "name": "Aigul",
            "email": "aigul@example.com",
            "password": "clear-stream-5",
        }))
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Aigul");
    assert_eq!(body["email"], "aigul@example.com");
    assert_eq!(body["bonus_balance"], 0.0);
    assert_eq!(body["total_volume"], 0.0);
    assert!(body.get("password").is_none());
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn users_route_also_registers() {
    let harness = TestHarness::new().await;

    harness
        .server
        .post("/users")
        .json(&json!({
            "name": "Bulat",
            "email": "bulat@example.com",
            "password": "clear-stream-5",
        }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let harness = TestHarness::new().await;
    harness
        .register_user("First", "dup@example.com", "clear-stream-5")
        .await;

    let response = harness
        .server
        .post("/register")
        .json(&json!({
            "name": "Second",
            "email": "dup@example.com",
            "password": "other-password",
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_issues_a_bearer_token() {
    let harness = TestHarness::new().await;
    harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;

    let response = harness
        .server
        .post("/login")
        .form(&[("username", "aigul@example.com"), ("password", "clear-stream-5")])
        .await;
    response.assert_status_ok();

    let body: serde_json::Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].as_str().is_some());
}

#[tokio::test]
async fn wrong_password_and_unknown_email_are_indistinguishable() {
    let harness = TestHarness::new().await;
    harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;

    let wrong_password = harness
        .server
        .post("/login")
        .form(&[("username", "aigul@example.com"), ("password", "wrong")])
        .await;
    wrong_password.assert_status_unauthorized();

    let unknown_email = harness
        .server
        .post("/login")
        .form(&[("username", "ghost@example.com"), ("password", "wrong")])
        .await;
    unknown_email.assert_status_unauthorized();

    let a: serde_json::Value = wrong_password.json();
    let b: serde_json::Value = unknown_email.json();
    assert_eq!(a, b);
}

// ============================================================================
// Profiles
// ============================================================================

#[tokio::test]
async fn fetch_user_by_id_is_public() {
    let harness = TestHarness::new().await;
    let id = harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;

    let response = harness.server.get(&format!("/users/{id}")).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn fetch_missing_user_is_not_found() {
    let harness = TestHarness::new().await;
    harness.server.get("/users/999").await.assert_status_not_found();
}

#[tokio::test]
async fn listing_users_requires_admin() {
    let harness = TestHarness::new().await;
    harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;

    harness.server.get("/users").await.assert_status_unauthorized();

    let token = harness.user_token("aigul@example.com", "clear-stream-5").await;
    harness
        .server
        .get("/users")
        .add_header("authorization", bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = harness.admin_token().await;
    let response = harness
        .server
        .get("/users")
        .add_header("authorization", bearer(&admin))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn users_update_their_own_profile() {
    let harness = TestHarness::new().await;
    let id = harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;
    let token = harness.user_token("aigul@example.com", "clear-stream-5").await;

    let response = harness
        .server
        .put(&format!("/users/{id}"))
        .add_header("authorization", bearer(&token))
        .json(&json!({ "name": "Aigul R.", "email": "aigul@example.com" }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Aigul R.");

    // Password unchanged: the old one still logs in.
    harness.user_token("aigul@example.com", "clear-stream-5").await;
}

#[tokio::test]
async fn password_change_takes_effect() {
    let harness = TestHarness::new().await;
    let id = harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;
    let token = harness.user_token("aigul@example.com", "clear-stream-5").await;

    harness
        .server
        .put(&format!("/users/{id}"))
        .add_header("authorization", bearer(&token))
        .json(&json!({
            "name": "Aigul",
            "email": "aigul@example.com",
            "password": "new-river-6",
        }))
        .await
        .assert_status_ok();

    harness
        .server
        .post("/login")
        .form(&[("username", "aigul@example.com"), ("password", "clear-stream-5")])
        .await
        .assert_status_unauthorized();

    harness.user_token("aigul@example.com", "new-river-6").await;
}

#[tokio::test]
async fn users_cannot_update_someone_else() {
    let harness = TestHarness::new().await;
    harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;
    let other = harness
        .register_user("Bulat", "bulat@example.com", "clear-stream-5")
        .await;
    let token = harness.user_token("aigul@example.com", "clear-stream-5").await;

    harness
        .server
        .put(&format!("/users/{other}"))
        .add_header("authorization", bearer(&token))
        .json(&json!({ "name": "Hacked", "email": "bulat@example.com" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn deleting_users_requires_admin() {
    let harness = TestHarness::new().await;
    let id = harness
        .register_user("Aigul", "aigul@example.com", "clear-stream-5")
        .await;
    let token = harness.user_token("aigul@example.com", "clear-stream-5").await;

    harness
        .server
        .delete(&format!("/users/{id}"))
        .await
        .assert_status_unauthorized();

    harness
        .server
        .delete(&format!("/users/{id}"))
        .add_header("authorization", bearer(&token))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    let admin = harness.admin_token().await;
    harness
        .server
        .delete(&format!("/users/{id}"))
        .add_header("authorization", bearer(&admin))
        .await
        .assert_status_ok();

    harness
        .server
        .get(&format!("/users/{id}"))
        .await
        .assert_status_not_found();
}
