use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, error, warn};

use crate::auth::repo_types::User;
use crate::auth::services::{self, AuthError};
use crate::config::AuthConfig;
use crate::state::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth";

/// Payload of a session token. `sub` is the username the session belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
}

/// Signing and verification keys for session tokens, derived from the
/// server-held secret. The token itself is stateless: validity is re-derived
/// from signature and expiry on every request, nothing is stored server-side.
#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub session_ttl: Duration,
}

impl SessionKeys {
    pub fn from_config(cfg: &AuthConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            session_ttl: Duration::from_secs((cfg.session_ttl_minutes as u64) * 60),
        }
    }

    /// Mint a token bound to `username`, expiring after the configured TTL.
    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.session_ttl.as_secs() as i64);
        let claims = Claims {
            sub: username.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%username, "session token issued");
        Ok(token)
    }

    /// Resolve a token back to its claims. Fails on a bad signature, a
    /// malformed payload, a wrong issuer/audience, or expiry.
    pub fn resolve(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(username = %data.claims.sub, "session token resolved");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.auth)
    }
}

/// Extractor gating protected pages: reads the `auth` cookie and materializes
/// the current user. The user is re-fetched from the store on every request,
/// so a deleted account stops authenticating even while its token is live.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get(AUTH_COOKIE) {
            Some(c) => c.value().to_string(),
            None => return Err(Redirect::to("/login").into_response()),
        };

        match services::current_user(state, &token).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(AuthError::Infrastructure(e)) => {
                error!(error = %e, "session user lookup failed");
                Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response())
            }
            Err(_) => {
                warn!("invalid or expired session token");
                Err(Redirect::to("/login").into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> SessionKeys {
        SessionKeys::from_config(&AuthConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            session_ttl_minutes: 60,
        })
    }

    #[test]
    fn issue_and_resolve_roundtrip() {
        let keys = make_keys();
        let token = keys.issue("alice").expect("issue");
        let claims = keys.resolve(&token).expect("resolve");
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn resolve_rejects_expired_token() {
        let keys = make_keys();
        // Sign claims whose expiry is far enough in the past to clear the
        // validation leeway.
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let claims = Claims {
            sub: "alice".into(),
            iat: (past - TimeDuration::hours(1)).unix_timestamp() as usize,
            exp: past.unix_timestamp() as usize,
            iss: keys.issuer.clone(),
            aud: keys.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(keys.resolve(&token).is_err());
    }

    #[test]
    fn resolve_rejects_foreign_signature() {
        let keys = make_keys();
        let other = SessionKeys::from_config(&AuthConfig {
            secret: "a-different-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            session_ttl_minutes: 60,
        });
        let token = other.issue("mallory").expect("issue");
        assert!(keys.resolve(&token).is_err());
    }

    #[test]
    fn resolve_rejects_wrong_issuer_or_audience() {
        let keys = make_keys();
        let other = SessionKeys::from_config(&AuthConfig {
            secret: "test-secret".into(),
            issuer: "someone-else".into(),
            audience: "someone-elses-users".into(),
            session_ttl_minutes: 60,
        });
        let token = other.issue("alice").expect("issue");
        assert!(keys.resolve(&token).is_err());
    }

    #[test]
    fn resolve_rejects_garbage() {
        let keys = make_keys();
        assert!(keys.resolve("not-a-token").is_err());
        assert!(keys.resolve("").is_err());
    }
}
