use anyhow::Context;
use serde::Deserialize;

/// Settings for session-token signing and lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub session_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = std::env::var("SECRET_KEY").context("SECRET_KEY must be set")?;
        // An empty secret signs tokens anyone can forge; refuse to start.
        anyhow::ensure!(!secret.trim().is_empty(), "SECRET_KEY must not be empty");

        let auth = AuthConfig {
            secret,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "tasknest".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "tasknest-users".into()),
            session_ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        Ok(Self { database_url, auth })
    }
}
