//! Registration, credential checks, and the public user view.

use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

use crate::error::ProviderError;
use crate::state::{Store, UserRecord};

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// What the provider reveals about a user: never the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

impl From<&UserRecord> for UserView {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: format_timestamp(user.created_at),
        }
    }
}

pub(crate) fn format_timestamp(at: OffsetDateTime) -> String {
    at.format(&Rfc3339).unwrap_or_default()
}

// =============================================================================
// PASSWORDS
// =============================================================================

/// Argon2 PHC string with a fresh random salt.
///
/// # Errors
///
/// `Internal` if the salt cannot be encoded or hashing fails.
pub fn hash_password(password: &str) -> Result<String, ProviderError> {
    let salt_bytes: [u8; 16] = rand::random();
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
        tracing::error!(error = %e, "password salt encoding failed");
        ProviderError::Internal
    })?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing failed");
            ProviderError::Internal
        })
}

/// False for a wrong password and for a stored value that is not a PHC string.
#[must_use]
pub fn verify_password(stored: &str, password: &str) -> bool {
    PasswordHash::new(stored).is_ok_and(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
}

// =============================================================================
// OPERATIONS
// =============================================================================

/// Create a user. Does not sign them in.
///
/// # Errors
///
/// `InvalidRegistration` for blank fields or a malformed email,
/// `UsernameTaken` / `EmailTaken` for case-insensitive duplicates,
/// `Internal` if the password cannot be hashed.
pub fn register(store: &mut Store, input: RegisterInput) -> Result<UserView, ProviderError> {
    let username = input.username.trim();
    let email = input.email.trim();
    if username.is_empty() {
        return Err(ProviderError::InvalidRegistration("Username is required".into()));
    }
    if input.password.is_empty() {
        return Err(ProviderError::InvalidRegistration("Password is required".into()));
    }
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(ProviderError::InvalidRegistration("Email is invalid".into()));
    }
    if username.contains('@') {
        return Err(ProviderError::InvalidRegistration("Username must not contain '@'".into()));
    }

    if store.users.values().any(|u| u.username.eq_ignore_ascii_case(username)) {
        return Err(ProviderError::UsernameTaken);
    }
    if store.users.values().any(|u| u.email.eq_ignore_ascii_case(email)) {
        return Err(ProviderError::EmailTaken);
    }

    let user = UserRecord {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        email: email.to_owned(),
        password_hash: hash_password(&input.password)?,
        created_at: OffsetDateTime::now_utc(),
    };
    let view = UserView::from(&user);
    store.users.insert(user.id, user);
    tracing::info!(user_id = %view.id, username = %view.username, "user registered");
    Ok(view)
}

/// Check credentials for a username or email.
///
/// # Errors
///
/// `UnknownUser` when no user matches, `WrongPassword` otherwise.
pub fn authenticate<'a>(store: &'a Store, identifier: &str, password: &str) -> Result<&'a UserRecord, ProviderError> {
    let user = store
        .find_by_identifier(identifier.trim())
        .ok_or(ProviderError::UnknownUser)?;
    if !verify_password(&user.password_hash, password) {
        return Err(ProviderError::WrongPassword);
    }
    Ok(user)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
