use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::warn;

use crate::auth::dto::RegisterForm;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::User;
use crate::auth::session::SessionKeys;
use crate::state::AppState;

/// Failures of the authentication flow. The first three are recovered at the
/// route layer into user-facing pages; infrastructure failures bubble up.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username or email already registered")]
    DuplicateCredential,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Infrastructure(#[from] anyhow::Error),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Register a new user. Does not authenticate; the caller must log in after.
///
/// The lookups are a fast path only. Uniqueness of username and email is
/// enforced by the store's constraints, and a conflicting concurrent insert
/// surfaces here as a unique violation mapped to [`AuthError::DuplicateCredential`].
pub async fn register(state: &AppState, form: &RegisterForm) -> Result<User, AuthError> {
    if User::find_by_username(&state.db, &form.username)
        .await?
        .is_some()
    {
        warn!(username = %form.username, "username already registered");
        return Err(AuthError::DuplicateCredential);
    }
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        warn!(email = %form.email, "email already registered");
        return Err(AuthError::DuplicateCredential);
    }

    let password_hash = hash_password(&form.password)?;

    match User::create(
        &state.db,
        &form.username,
        &form.email,
        &form.name,
        &password_hash,
    )
    .await
    {
        Ok(user) => Ok(user),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            warn!(username = %form.username, "registration lost a uniqueness race");
            Err(AuthError::DuplicateCredential)
        }
        Err(e) => Err(AuthError::Infrastructure(e.into())),
    }
}

/// Verify credentials for login. An unknown username and a wrong password
/// yield the same error so the caller cannot tell which case occurred.
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<User, AuthError> {
    let user = match User::find_by_username(&state.db, username).await? {
        Some(u) => u,
        None => {
            warn!(%username, "login for unknown username");
            return Err(AuthError::InvalidCredentials);
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = %user.id, "login with wrong password");
        return Err(AuthError::InvalidCredentials);
    }

    Ok(user)
}

/// Resolve a session token to the current user. The store is consulted on
/// every call so the freshest profile wins and a deleted account no longer
/// authenticates, even though the token itself carries no server-side state.
pub async fn current_user(state: &AppState, token: &str) -> Result<User, AuthError> {
    let keys = SessionKeys::from_config(&state.config.auth);
    let claims = keys
        .resolve(token)
        .map_err(|_| AuthError::NotAuthenticated)?;

    match User::find_by_username(&state.db, &claims.sub).await? {
        Some(user) => Ok(user),
        None => Err(AuthError::NotAuthenticated),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("bob@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("bob"));
        assert!(!is_valid_email("bob@"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("bob@x"));
        assert!(!is_valid_email("bob @x.com"));
    }

    #[test]
    fn auth_error_messages_do_not_distinguish_login_failures() {
        // Unknown user and wrong password must render identically.
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "invalid credentials"
        );
    }
}
