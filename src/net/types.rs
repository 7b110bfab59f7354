//! Wire types shared by the API client and its callers.
//!
//! Field names follow the provider's camelCase JSON.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// `POST /api/auth/register` payload.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// `POST /api/auth/login` payload. `identifier` is a username or email.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub identifier: String,
    pub password: String,
}

/// Identity returned by login and profile. Both fields are optional on the
/// wire; a body without `id` means "no identity".
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfileResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Identity created by registration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Invite lifecycle. `Pending` moves to `Accepted` once; nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
}

/// A peer-relationship invite as the provider reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: String,
    pub inviter_id: String,
    pub invitee_identifier: String,
    pub status: InviteStatus,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// `POST /api/invites` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteRequest {
    pub inviter_id: String,
    pub invitee_identifier: String,
}

/// `POST /api/invites/{id}/accept` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequest {
    pub accepter_id: String,
}
