//! Invite coordination on top of session state.
//!
//! SYSTEM CONTEXT
//! ==============
//! The representative authenticated mutation. Calls go through the shared
//! `ApiClient`, so expired credentials are refreshed transparently; when the
//! session is truly gone the coordinator signs the user out through
//! `SessionState::logout` before surfacing `UnrecoverableAuth`, keeping
//! session state single-writer.
//!
//! TRADE-OFFS
//! ==========
//! The self-invite check is local and best effort: it compares against the
//! confirmed id and display name only. The provider enforces its own policy
//! and is authoritative.

use tracing::{debug, info, warn};

use crate::net::ApiError;
use crate::net::types::{AcceptRequest, Invite, InviteRequest};
use crate::state::SessionState;

#[derive(Clone)]
pub struct InviteCoordinator {
    session: SessionState,
    allow_self_invite: bool,
}

impl InviteCoordinator {
    #[must_use]
    pub fn new(session: SessionState, allow_self_invite: bool) -> Self {
        Self { session, allow_self_invite }
    }

    /// Invite a peer by public identifier.
    ///
    /// # Errors
    ///
    /// - `IdentityRequired` when no identity is confirmed.
    /// - `Validation` for a blank identifier, a refused self-invite, or a
    ///   provider rejection.
    /// - `UnrecoverableAuth` after the session has been cleared.
    pub async fn invite(&self, inviter_id: &str, invitee_identifier: &str) -> Result<Invite, ApiError> {
        let identity = self.session.current().ok_or(ApiError::IdentityRequired)?;
        let invitee = invitee_identifier.trim();
        if invitee.is_empty() {
            return Err(ApiError::local_validation("invitee identifier is required"));
        }
        let is_self = invitee == inviter_id
            || invitee == identity.id()
            || invitee.eq_ignore_ascii_case(identity.display_name());
        if is_self && !self.allow_self_invite {
            return Err(ApiError::local_validation("you cannot invite yourself"));
        }

        let request = InviteRequest { inviter_id: inviter_id.to_owned(), invitee_identifier: invitee.to_owned() };
        let invite = self.guarded(self.session.api().invite(&request)).await?;
        info!(invite = %invite.id, invitee, "invite created");
        Ok(invite)
    }

    /// Invites addressed to `identity`, in provider order.
    ///
    /// # Errors
    ///
    /// `UnrecoverableAuth` after the session has been cleared, otherwise the
    /// provider or transport failure.
    pub async fn list_invites(&self, identity: &str) -> Result<Vec<Invite>, ApiError> {
        let invites = self.guarded(self.session.api().list_invites(identity)).await?;
        debug!(identity, count = invites.len(), "invites listed");
        Ok(invites)
    }

    /// Accept a pending invite addressed to `accepter_id`.
    ///
    /// # Errors
    ///
    /// `Conflict` when the invite is missing, addressed to someone else, or
    /// already accepted. `UnrecoverableAuth` after the session has been
    /// cleared.
    pub async fn accept(&self, invite_id: &str, accepter_id: &str) -> Result<Invite, ApiError> {
        let invite_id = invite_id.trim();
        if invite_id.is_empty() {
            return Err(ApiError::local_validation("invite id is required"));
        }
        let request = AcceptRequest { accepter_id: accepter_id.to_owned() };
        let invite = self.guarded(self.session.api().accept_invite(invite_id, &request)).await?;
        info!(invite = %invite.id, "invite accepted");
        Ok(invite)
    }

    /// Sign out locally when the provider says the session is gone.
    async fn guarded<T>(&self, call: impl Future<Output = Result<T, ApiError>>) -> Result<T, ApiError> {
        match call.await {
            Err(ApiError::UnrecoverableAuth) => {
                warn!("session no longer valid; signing out");
                let _ = self.session.logout().await;
                Err(ApiError::UnrecoverableAuth)
            }
            other => other,
        }
    }
}

#[cfg(test)]
#[path = "invites_test.rs"]
mod tests;
