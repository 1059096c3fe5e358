//! Session authentication service.
//!
//! Credentials are stored as hex-encoded salted SHA-256 digests and compared
//! in constant time. Sessions are opaque uuid tokens with a fixed lifetime;
//! the HTTP layer carries them in an http-only cookie.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use perch_api_types::{LoginRequest, SignupRequest};

use crate::application::repos::{CreateUserParams, RepoError, SessionsRepo, UsersRepo};
use crate::domain::entities::{SessionRecord, UserRecord};

const SESSION_LIFETIME_DAYS: i64 = 30;
const MIN_PASSWORD_LEN: usize = 6;
const MAX_USERNAME_LEN: usize = 30;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Username is already taken")]
    UsernameTaken,
    #[error("Email is already taken")]
    EmailTaken,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Unauthorized")]
    Unauthorized,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub struct AuthService {
    users: Arc<dyn UsersRepo>,
    sessions: Arc<dyn SessionsRepo>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UsersRepo>, sessions: Arc<dyn SessionsRepo>) -> Self {
        Self { users, sessions }
    }

    pub async fn signup(
        &self,
        req: &SignupRequest,
    ) -> Result<(UserRecord, SessionRecord), AuthError> {
        validate_username(&req.username)?;
        validate_email(&req.email)?;
        validate_password(&req.password)?;
        if req.full_name.trim().is_empty() {
            return Err(AuthError::Validation("Full name is required".to_string()));
        }

        if self
            .users
            .find_user_by_username(&req.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }
        if self.users.find_user_by_email(&req.email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let salt = generate_salt();
        let user = self
            .users
            .create_user(CreateUserParams {
                id: Uuid::new_v4(),
                username: req.username.clone(),
                full_name: req.full_name.trim().to_string(),
                email: req.email.clone(),
                hashed_password: hash_password(&req.password, &salt),
                password_salt: salt,
            })
            .await
            .map_err(|err| match err {
                RepoError::Duplicate { constraint } if constraint.contains("email") => {
                    AuthError::EmailTaken
                }
                RepoError::Duplicate { .. } => AuthError::UsernameTaken,
                other => AuthError::Repo(other),
            })?;

        let session = self.open_session(user.id).await?;
        debug!(username = %user.username, "user signed up");
        Ok((user, session))
    }

    pub async fn login(
        &self,
        req: &LoginRequest,
    ) -> Result<(UserRecord, SessionRecord), AuthError> {
        let user = self
            .users
            .find_user_by_username(&req.username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&req.password, &user.password_salt, &user.hashed_password) {
            return Err(AuthError::InvalidCredentials);
        }

        let session = self.open_session(user.id).await?;
        Ok((user, session))
    }

    pub async fn logout(&self, token: Uuid) -> Result<(), AuthError> {
        self.sessions.delete_session(token).await?;
        Ok(())
    }

    /// Resolve a session token to its user. Expired or unknown tokens are
    /// both reported as `Unauthorized` so callers cannot distinguish them.
    pub async fn authenticate(&self, token: Uuid) -> Result<UserRecord, AuthError> {
        let session = self
            .sessions
            .find_session(token)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if session.is_expired(OffsetDateTime::now_utc()) {
            // best-effort cleanup; the auth result does not depend on it
            let _ = self.sessions.delete_session(token).await;
            return Err(AuthError::Unauthorized);
        }

        self.users
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(AuthError::Unauthorized)
    }

    async fn open_session(&self, user_id: Uuid) -> Result<SessionRecord, AuthError> {
        let now = OffsetDateTime::now_utc();
        let session = SessionRecord {
            token: Uuid::new_v4(),
            user_id,
            created_at: now,
            expires_at: now + Duration::days(SESSION_LIFETIME_DAYS),
        };
        self.sessions.insert_session(session.clone()).await?;
        Ok(session)
    }
}

pub(crate) fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.len() < 3 || username.len() > MAX_USERNAME_LEN {
        return Err(AuthError::Validation(
            "Username must be between 3 and 30 characters".to_string(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AuthError::Validation(
            "Username may only contain letters, digits, and underscores".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AuthError::Validation("Invalid email format".to_string()));
    }
    Ok(())
}

pub(crate) fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn generate_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

pub(crate) fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub(crate) fn verify_password(password: &str, salt: &str, stored_hex: &str) -> bool {
    let computed = hash_password(password, salt);
    computed.as_bytes().ct_eq(stored_hex.as_bytes()).unwrap_u8() == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_verifies_with_same_salt_only() {
        let salt = generate_salt();
        let stored = hash_password("hunter22", &salt);

        assert!(verify_password("hunter22", &salt, &stored));
        assert!(!verify_password("hunter23", &salt, &stored));
        assert!(!verify_password("hunter22", &generate_salt(), &stored));
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("robin_wren").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(31)).is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("wren@example.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("wren@localhost").is_err());
    }
}
