//! Invite lifecycle: create, list for an addressee, accept.
//!
//! An invite is addressed by public identifier (username or email). It is
//! addressed to a user when that identifier resolves to them, or names their
//! id directly. The only transition is pending -> accepted, by the addressee.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::auth::format_timestamp;
use crate::config::ServerConfig;
use crate::error::ProviderError;
use crate::state::{InviteRecord, InviteStatus, Store, UserRecord};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteInput {
    pub inviter_id: String,
    pub invitee_identifier: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptInput {
    pub accepter_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteView {
    pub id: Uuid,
    pub inviter_id: Uuid,
    pub invitee_identifier: String,
    pub status: InviteStatus,
    pub created_at: String,
}

impl From<&InviteRecord> for InviteView {
    fn from(invite: &InviteRecord) -> Self {
        Self {
            id: invite.id,
            inviter_id: invite.inviter_id,
            invitee_identifier: invite.invitee_identifier.clone(),
            status: invite.status,
            created_at: format_timestamp(invite.created_at),
        }
    }
}

fn addressed_to(invite: &InviteRecord, user: &UserRecord) -> bool {
    let target = invite.invitee_identifier.as_str();
    user.username.eq_ignore_ascii_case(target)
        || user.email.eq_ignore_ascii_case(target)
        || user.id.to_string() == target
}

fn ensure_acting_as(acting: Uuid, claimed: &str) -> Result<(), ProviderError> {
    if acting.to_string() == claimed.trim() {
        Ok(())
    } else {
        Err(ProviderError::ForeignIdentity)
    }
}

/// Create a pending invite from the acting user.
///
/// # Errors
///
/// - `ForeignIdentity` when `inviter_id` is not the acting user.
/// - `InvalidInvite` for a blank identifier or a refused self-invite.
/// - `UnknownInvitee` when the identifier must resolve and does not.
pub fn create(
    store: &mut Store,
    config: &ServerConfig,
    acting: Uuid,
    input: InviteInput,
) -> Result<InviteView, ProviderError> {
    ensure_acting_as(acting, &input.inviter_id)?;
    let identifier = input.invitee_identifier.trim();
    if identifier.is_empty() {
        return Err(ProviderError::InvalidInvite("Invitee identifier is required".into()));
    }

    let invitee = store.find_by_identifier(identifier).map(|u| u.id);
    if invitee.is_none() && config.require_known_invitee {
        return Err(ProviderError::UnknownInvitee);
    }
    if invitee == Some(acting) && !config.allow_self_invite {
        return Err(ProviderError::InvalidInvite("You cannot invite yourself".into()));
    }

    let invite = InviteRecord {
        id: Uuid::new_v4(),
        inviter_id: acting,
        invitee_identifier: identifier.to_owned(),
        status: InviteStatus::Pending,
        created_at: OffsetDateTime::now_utc(),
    };
    let view = InviteView::from(&invite);
    store.invites.push(invite);
    tracing::info!(invite_id = %view.id, inviter = %acting, invitee = identifier, "invite created");
    Ok(view)
}

/// Every invite addressed to `identity`, oldest first.
///
/// # Errors
///
/// `ForeignIdentity` when listing for someone other than the acting user.
pub fn list_for(store: &Store, acting: Uuid, identity: &str) -> Result<Vec<InviteView>, ProviderError> {
    ensure_acting_as(acting, identity)?;
    let Some(user) = store.users.get(&acting) else {
        return Ok(Vec::new());
    };
    Ok(store
        .invites
        .iter()
        .filter(|invite| addressed_to(invite, user))
        .map(InviteView::from)
        .collect())
}

/// Accept a pending invite addressed to the acting user.
///
/// # Errors
///
/// - `InviteNotFound` for an unknown (or unparseable) invite id.
/// - `ForeignIdentity` when `accepter_id` is not the acting user.
/// - `NotAddressee` when the invite is addressed to someone else.
/// - `AlreadyAccepted` when the invite is no longer pending.
pub fn accept(store: &mut Store, acting: Uuid, invite_id: &str, input: AcceptInput) -> Result<InviteView, ProviderError> {
    let invite_id = Uuid::parse_str(invite_id).map_err(|_| ProviderError::InviteNotFound)?;
    ensure_acting_as(acting, &input.accepter_id)?;
    let user = store.users.get(&acting).cloned().ok_or(ProviderError::NotAddressee)?;

    let invite = store
        .invites
        .iter_mut()
        .find(|invite| invite.id == invite_id)
        .ok_or(ProviderError::InviteNotFound)?;
    if !addressed_to(invite, &user) {
        return Err(ProviderError::NotAddressee);
    }
    if invite.status != InviteStatus::Pending {
        return Err(ProviderError::AlreadyAccepted);
    }

    invite.status = InviteStatus::Accepted;
    tracing::info!(invite_id = %invite.id, accepter = %acting, "invite accepted");
    Ok(InviteView::from(&*invite))
}

#[cfg(test)]
#[path = "invites_test.rs"]
mod tests;
