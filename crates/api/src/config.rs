//! Environment-driven configuration.

use chrono::Duration;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HS256 signing secret for access tokens.
    pub jwt_secret: String,
    /// Socket address the server binds to.
    pub bind_addr: String,
    /// Base API domain; hosts of the form `<slug>.<base>` resolve the tenant
    /// by subdomain.
    pub base_domain: String,
    /// Access-token lifetime.
    pub token_ttl: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let base_domain =
            std::env::var("API_BASE_DOMAIN").unwrap_or_else(|_| "merx.localhost".to_string());

        let token_ttl = std::env::var("TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .map(Duration::minutes)
            .unwrap_or_else(|| Duration::hours(24));

        Self {
            jwt_secret,
            bind_addr,
            base_domain,
            token_ttl,
        }
    }
}
