//! Shared provider state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the typed config and one in-memory `Store` behind an async lock.
//! Service functions take `&Store` / `&mut Store` and never lock themselves,
//! so each handler decides the critical section and services stay sync.
//!
//! TRADE-OFFS
//! ==========
//! Nothing is persisted; a restart forgets every user, session and invite.
//! This provider exists to exercise the client contract, not to be deployed.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::ServerConfig;

// =============================================================================
// RECORDS
// =============================================================================

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenRecord {
    pub user_id: Uuid,
    pub expires_at: OffsetDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
}

#[derive(Debug, Clone)]
pub struct InviteRecord {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub invitee_identifier: String,
    pub status: InviteStatus,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// STORE
// =============================================================================

#[derive(Debug, Default)]
pub struct Store {
    pub users: HashMap<Uuid, UserRecord>,
    pub access_tokens: HashMap<String, TokenRecord>,
    pub refresh_tokens: HashMap<String, TokenRecord>,
    /// Creation order; listings preserve it.
    pub invites: Vec<InviteRecord>,
}

impl Store {
    /// Resolve a login or invite identifier: username or email, ASCII
    /// case-insensitive.
    #[must_use]
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&UserRecord> {
        self.users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(identifier) || u.email.eq_ignore_ascii_case(identifier))
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Clone is required by Axum; every field is `Arc`-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<RwLock<Store>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), store: Arc::new(RwLock::new(Store::default())) }
    }

    /// Drop every access token while keeping refresh tokens, as if all
    /// access credentials had expired at once. Returns how many were dropped.
    pub async fn revoke_access_tokens(&self) -> usize {
        let mut store = self.store.write().await;
        let count = store.access_tokens.len();
        store.access_tokens.clear();
        tracing::info!(count, "access tokens revoked");
        count
    }

    /// Drop every refresh token, so the next expired access token is final.
    pub async fn revoke_refresh_tokens(&self) -> usize {
        let mut store = self.store.write().await;
        let count = store.refresh_tokens.len();
        store.refresh_tokens.clear();
        tracing::info!(count, "refresh tokens revoked");
        count
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
