//! Session state: the single in-memory record of who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Constructed once and handed to the navigator, route guard and invite
//! coordinator. Readers take snapshots; `login`, `logout` and
//! `identity_check` are the only writers.
//!
//! INVARIANTS
//! ==========
//! - Identity id and display name are stored as one `Option<Identity>`, so
//!   they are set and cleared together.
//! - The lock is never held across an await.
//! - Logout is optimistic: local state is cleared before the provider is
//!   told, and a failed provider call never restores it.
//! - A check that started before a login or logout never overwrites what
//!   that login or logout wrote.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::navigation::NavigationTicket;
use crate::net::types::{LoginRequest, ProfileResponse};
use crate::net::{ApiClient, ApiError, ReqwestBackend, Transport};

// =============================================================================
// IDENTITY
// =============================================================================

/// A confirmed identity: internal id plus the name shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: String,
    display_name: String,
}

impl Identity {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: id.into(), display_name: display_name.into() }
    }

    /// Build from a provider body. A missing or blank `id` means no
    /// identity; a missing or blank username falls back to the id so the
    /// pair is never half-populated.
    #[must_use]
    pub fn from_profile(profile: ProfileResponse) -> Option<Self> {
        let id = profile.id.filter(|id| !id.trim().is_empty())?;
        let display_name = profile.username.filter(|name| !name.trim().is_empty()).unwrap_or_else(|| id.clone());
        Some(Self { id, display_name })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }
}

/// Result of an identity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityStatus {
    /// The provider confirmed this identity; session state now holds it.
    Confirmed(Identity),
    /// The provider reports no identity; session state is now empty.
    Unconfirmed,
    /// A newer navigation started while the check was in flight; nothing
    /// was written.
    Superseded,
}

#[derive(Debug, Default)]
struct SessionRecord {
    identity: Option<Identity>,
    confirmed_at: Option<Instant>,
    /// Bumped by login and logout so in-flight checks can tell they are stale.
    generation: u64,
}

// =============================================================================
// SESSION STATE
// =============================================================================

/// Shared session handle. Clones observe and mutate the same record.
#[derive(Clone)]
pub struct SessionState {
    api: ApiClient,
    record: Arc<RwLock<SessionRecord>>,
    cache_ttl: Duration,
}

impl SessionState {
    /// Empty session over the given client. Identity caching is off.
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, record: Arc::new(RwLock::new(SessionRecord::default())), cache_ttl: Duration::ZERO }
    }

    /// Reuse a confirmed identity for up to `ttl` without asking the provider.
    /// The session may then report an identity the provider already revoked
    /// for at most that long.
    #[must_use]
    pub fn with_identity_cache(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Session backed by the native HTTP backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let backend = ReqwestBackend::new(config)?;
        let api = ApiClient::new(Transport::new(Arc::new(backend)));
        Ok(Self::new(api).with_identity_cache(config.identity_cache_ttl))
    }

    /// The provider client this session talks through.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current identity.
    #[must_use]
    pub fn current(&self) -> Option<Identity> {
        self.read(|record| record.identity.clone())
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.read(|record| record.identity.is_some())
    }

    /// Sign in. On failure the record is left exactly as it was.
    ///
    /// # Errors
    ///
    /// `Validation` for rejected credentials, `Parse` if the provider answers
    /// without an identity, `Network` on transport failure.
    pub async fn login(&self, identifier: &str, credential: &str) -> Result<Identity, ApiError> {
        let request = LoginRequest { identifier: identifier.to_owned(), password: credential.to_owned() };
        let profile = self.api.login(&request).await?;
        let identity = Identity::from_profile(profile)
            .ok_or_else(|| ApiError::Parse("login response carried no identity".to_owned()))?;

        self.write(|record| {
            record.identity = Some(identity.clone());
            record.confirmed_at = Some(Instant::now());
            record.generation += 1;
        });
        info!(identity = %identity.id, "signed in");
        Ok(identity)
    }

    /// Sign out locally at once, then tell the provider.
    ///
    /// # Errors
    ///
    /// Returns the provider call's failure. Local state is already cleared
    /// and stays cleared.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.write(|record| {
            record.identity = None;
            record.confirmed_at = None;
            record.generation += 1;
        });
        info!("signed out locally");

        self.api.logout().await.inspect_err(|e| {
            warn!(error = %e, "provider logout failed; local session stays cleared");
        })
    }

    /// Ask the provider who is signed in and record the answer.
    ///
    /// # Errors
    ///
    /// `Network`, `Parse`, or `Http`. The record is untouched on error.
    pub async fn identity_check(&self) -> Result<IdentityStatus, ApiError> {
        self.check(None).await
    }

    /// Like `identity_check`, but the answer is dropped if `ticket` is no
    /// longer current when it arrives.
    ///
    /// # Errors
    ///
    /// Same as `identity_check`.
    pub async fn identity_check_for(&self, ticket: &NavigationTicket) -> Result<IdentityStatus, ApiError> {
        self.check(Some(ticket)).await
    }

    async fn check(&self, ticket: Option<&NavigationTicket>) -> Result<IdentityStatus, ApiError> {
        if let Some(identity) = self.cached() {
            debug!(identity = %identity.id, "identity served from cache");
            return Ok(IdentityStatus::Confirmed(identity));
        }

        let generation = self.read(|record| record.generation);
        let profile = self.api.profile().await?;

        if ticket.is_some_and(|t| !t.is_current()) {
            debug!("navigation moved on; discarding identity check");
            return Ok(IdentityStatus::Superseded);
        }

        let identity = profile.and_then(Identity::from_profile);
        let applied = self.write(|record| {
            if record.generation != generation {
                return false;
            }
            record.confirmed_at = identity.as_ref().map(|_| Instant::now());
            record.identity.clone_from(&identity);
            true
        });
        if !applied {
            debug!("signed in or out during identity check; discarding result");
            return Ok(self.current().map_or(IdentityStatus::Unconfirmed, IdentityStatus::Confirmed));
        }

        Ok(match identity {
            Some(identity) => IdentityStatus::Confirmed(identity),
            None => IdentityStatus::Unconfirmed,
        })
    }

    fn cached(&self) -> Option<Identity> {
        if self.cache_ttl.is_zero() {
            return None;
        }
        self.read(|record| {
            let fresh = record.confirmed_at.is_some_and(|at| at.elapsed() < self.cache_ttl);
            if fresh { record.identity.clone() } else { None }
        })
    }

    fn read<T>(&self, f: impl FnOnce(&SessionRecord) -> T) -> T {
        let record = self.record.read().unwrap_or_else(PoisonError::into_inner);
        f(&record)
    }

    fn write<T>(&self, f: impl FnOnce(&mut SessionRecord) -> T) -> T {
        let mut record = self.record.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut record)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
