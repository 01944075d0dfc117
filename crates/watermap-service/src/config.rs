//! Service configuration.
//!
//! Every secret the service needs — the token signing key and the
//! bootstrap admin credentials — lives here and is injected into the
//! components that use it; nothing is hard-coded at point of use. The
//! defaults exist so a development instance starts out of the box, and
//! their use is loudly logged.

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// SQLite database URL (default: "sqlite://watermap.db").
    pub database_url: String,

    /// Shared secret for HS256 token signatures.
    pub jwt_secret: String,

    /// Username for the first-run admin account.
    pub bootstrap_admin_username: String,

    /// Password for the first-run admin account. A one-time setup secret:
    /// rotate it through `/admin-create` before exposing the service.
    pub bootstrap_admin_password: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

/// Development-only fallback signing secret.
const DEV_JWT_SECRET: &str = "watermap-dev-secret";

/// Well-known first-run admin credentials.
const DEFAULT_BOOTSTRAP_USERNAME: &str = "admin";
const DEFAULT_BOOTSTRAP_PASSWORD: &str = "admin123";

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set - using the insecure development secret");
            DEV_JWT_SECRET.into()
        });

        let bootstrap_admin_password =
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD").unwrap_or_else(|_| {
                tracing::warn!(
                    "BOOTSTRAP_ADMIN_PASSWORD not set - using the well-known default; \
                     rotate the admin account before exposing the service"
                );
                DEFAULT_BOOTSTRAP_PASSWORD.into()
            });

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://watermap.db".into()),
            jwt_secret,
            bootstrap_admin_username: std::env::var("BOOTSTRAP_ADMIN_USERNAME")
                .unwrap_or_else(|_| DEFAULT_BOOTSTRAP_USERNAME.into()),
            bootstrap_admin_password,
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: std::env::var("MAX_BODY_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            database_url: "sqlite://watermap.db".into(),
            jwt_secret: DEV_JWT_SECRET.into(),
            bootstrap_admin_username: DEFAULT_BOOTSTRAP_USERNAME.into(),
            bootstrap_admin_password: DEFAULT_BOOTSTRAP_PASSWORD.into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
        }
    }
}
