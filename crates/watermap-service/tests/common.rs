//! Common test utilities for watermap integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;
use serde_json::json;
use tempfile::TempDir;

use watermap_service::handlers::admin::ensure_bootstrap_admin;
use watermap_service::{create_router, AppState, ServiceConfig};
use watermap_store::SqliteStore;

/// Well-known bootstrap credentials used by every harness.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// Temporary directory for the database (kept alive for test duration).
    pub _temp_dir: TempDir,
    /// Direct handle to the store, for setup shortcuts.
    pub store: Arc<SqliteStore>,
    /// The configuration behind the server.
    pub config: ServiceConfig,
}

impl TestHarness {
    /// Create a new test harness with a fresh database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let database_url = format!(
            "sqlite://{}",
            temp_dir.path().join("watermap.db").display()
        );

        let store = Arc::new(
            SqliteStore::connect(&database_url)
                .await
                .expect("Failed to open store"),
        );
        store.migrate().await.expect("Failed to migrate");

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            database_url,
            jwt_secret: "test-secret".into(),
            bootstrap_admin_username: ADMIN_USERNAME.into(),
            bootstrap_admin_password: ADMIN_PASSWORD.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        };

        let state = AppState::new(store.clone(), config.clone());
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            _temp_dir: temp_dir,
            store,
            config,
        }
    }

    /// Register a user and return its id.
    pub async fn register_user(&self, name: &str, email: &str, password: &str) -> i64 {
        let response = self
            .server
            .post("/register")
            .json(&json!({ "name": name, "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["id"].as_i64().expect("registration returns an id")
    }

    /// Log a user in and return the bearer token.
    pub async fn user_token(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/login")
            .form(&[("username", email), ("password", password)])
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["access_token"]
            .as_str()
            .expect("login returns a token")
            .to_string()
    }

    /// Bootstrap the admin (idempotent) and return an admin bearer token.
    pub async fn admin_token(&self) -> String {
        ensure_bootstrap_admin(&self.store, &self.config)
            .await
            .expect("Failed to bootstrap admin");

        let response = self
            .server
            .post("/admin-login")
            .form(&[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)])
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["access_token"]
            .as_str()
            .expect("admin login returns a token")
            .to_string()
    }

    /// Create a water point as admin and return its id.
    pub async fn create_point(&self, admin_token: &str, body: serde_json::Value) -> i64 {
        let response = self
            .server
            .post("/water-points")
            .add_header("authorization", bearer(admin_token))
            .json(&body)
            .await;
        response.assert_status_ok();
        let created: serde_json::Value = response.json();
        created["id"].as_i64().expect("creation returns an id")
    }
}

/// Format a token as an `Authorization` header value.
pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

/// A minimal valid water-point body.
pub fn point_body(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "latitude": 54.73,
        "longitude": 55.97,
    })
}
