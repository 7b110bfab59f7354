//! Access and refresh token management.
//!
//! ARCHITECTURE
//! ============
//! Login issues a short-lived access token and a long-lived refresh token,
//! both opaque random hex carried in HttpOnly cookies. Refresh mints a new
//! access token from a live refresh token; the refresh token itself is not
//! rotated.
//!
//! TRADE-OFFS
//! ==========
//! Tokens are looked up, not verified cryptographically, so revocation is a
//! map removal. Expired entries of both kinds are pruned whenever a token is
//! minted, so the maps hold at most the live tokens plus one batch.

use std::fmt::Write;
use std::time::Duration;

use rand::Rng;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::state::{Store, TokenRecord};

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedTokens {
    pub access: String,
    pub refresh: String,
}

fn expiry(ttl: Duration) -> OffsetDateTime {
    OffsetDateTime::now_utc() + ttl
}

/// Issue a fresh access/refresh pair for `user_id`.
pub fn issue(store: &mut Store, user_id: Uuid, access_ttl: Duration, refresh_ttl: Duration) -> IssuedTokens {
    prune_expired(store);
    let access = generate_token();
    let refresh = generate_token();
    store
        .access_tokens
        .insert(access.clone(), TokenRecord { user_id, expires_at: expiry(access_ttl) });
    store
        .refresh_tokens
        .insert(refresh.clone(), TokenRecord { user_id, expires_at: expiry(refresh_ttl) });
    IssuedTokens { access, refresh }
}

/// User behind a live access token.
#[must_use]
pub fn validate_access(store: &Store, token: &str) -> Option<Uuid> {
    live(store.access_tokens.get(token)?)
}

/// Mint a new access token from a live refresh token. `None` when the
/// refresh token is unknown, expired, or its user no longer exists.
pub fn refresh(store: &mut Store, refresh_token: &str, access_ttl: Duration) -> Option<String> {
    let Some(user_id) = store.refresh_tokens.get(refresh_token).and_then(live) else {
        store.refresh_tokens.remove(refresh_token);
        return None;
    };
    if !store.users.contains_key(&user_id) {
        return None;
    }

    prune_expired(store);
    let access = generate_token();
    store
        .access_tokens
        .insert(access.clone(), TokenRecord { user_id, expires_at: expiry(access_ttl) });
    Some(access)
}

/// Forget both tokens. Unknown tokens are ignored.
pub fn revoke(store: &mut Store, access: Option<&str>, refresh: Option<&str>) {
    if let Some(token) = access {
        store.access_tokens.remove(token);
    }
    if let Some(token) = refresh {
        store.refresh_tokens.remove(token);
    }
}

/// Drop every expired access and refresh token.
pub fn prune_expired(store: &mut Store) {
    let now = OffsetDateTime::now_utc();
    store.access_tokens.retain(|_, record| record.expires_at > now);
    store.refresh_tokens.retain(|_, record| record.expires_at > now);
}

fn live(record: &TokenRecord) -> Option<Uuid> {
    (record.expires_at > OffsetDateTime::now_utc()).then_some(record.user_id)
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
