//! Typed identity-provider operations.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every call goes through `Transport`, so callers never see a first 401.
//! This layer only decides how each operation classifies the statuses that
//! remain: credential payload rejections are validation errors, accept
//! rejections are conflicts, a 401 here is always unrecoverable.

use super::error::{ApiError, Rejection, status_error};
use super::transport::{ApiRequest, ApiResponse, Transport};
use super::types::{
    AcceptRequest, Invite, InviteRequest, LoginRequest, ProfileResponse, RegisterRequest, RegisteredUser,
};

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const PROFILE_PATH: &str = "/api/auth/profile";
pub const INVITES_PATH: &str = "/api/invites";

fn list_invites_endpoint(identity: &str) -> String {
    let query: String = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("identity", identity)
        .finish();
    format!("{INVITES_PATH}?{query}")
}

fn accept_invite_endpoint(invite_id: &str) -> String {
    let id: String = url::form_urlencoded::byte_serialize(invite_id.as_bytes()).collect();
    format!("{INVITES_PATH}/{id}/accept")
}

/// Client for the provider's REST contract. Cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    #[must_use]
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    /// `POST /api/auth/register`. Does not sign the new identity in.
    ///
    /// # Errors
    ///
    /// `Validation` when the provider rejects the payload (taken username or
    /// email, missing fields), `Network` on transport failure.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisteredUser, ApiError> {
        let response = self.transport.send(ApiRequest::post_json(REGISTER_PATH, request)?).await?;
        ensure_success(&response, Rejection::Validation)?;
        response.json()
    }

    /// `POST /api/auth/login`. The provider sets the session cookies.
    ///
    /// # Errors
    ///
    /// `Validation` for unknown identifiers or wrong passwords.
    pub async fn login(&self, request: &LoginRequest) -> Result<ProfileResponse, ApiError> {
        let response = self.transport.send(ApiRequest::post_json(LOGIN_PATH, request)?).await?;
        ensure_success(&response, Rejection::Validation)?;
        response.json()
    }

    /// `POST /api/auth/logout`.
    ///
    /// # Errors
    ///
    /// Any transport or status failure; callers treat it as advisory.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let response = self.transport.send(ApiRequest::post(LOGOUT_PATH, serde_json::json!({}))).await?;
        ensure_success(&response, Rejection::Plain)
    }

    /// `GET /api/auth/profile`. `None` means the provider reports no identity:
    /// 204, a body without `id`, or a 401 that survived the refresh protocol.
    ///
    /// # Errors
    ///
    /// `Network`, `Parse`, or `Http` for any other error status.
    pub async fn profile(&self) -> Result<Option<ProfileResponse>, ApiError> {
        let response = self.transport.send(ApiRequest::get(PROFILE_PATH)).await?;
        if response.status == 204 || response.is_unauthorized() {
            return Ok(None);
        }
        ensure_success(&response, Rejection::Plain)?;
        let profile: ProfileResponse = response.json()?;
        Ok(profile.id.is_some().then_some(profile))
    }

    /// `POST /api/invites`.
    ///
    /// # Errors
    ///
    /// `Validation` when the provider refuses the invitee, `UnrecoverableAuth`
    /// when the session is gone.
    pub async fn invite(&self, request: &InviteRequest) -> Result<Invite, ApiError> {
        let response = self.transport.send(ApiRequest::post_json(INVITES_PATH, request)?).await?;
        ensure_success(&response, Rejection::Validation)?;
        response.json()
    }

    /// `GET /api/invites?identity=…`, in provider order.
    ///
    /// # Errors
    ///
    /// `UnrecoverableAuth`, `Network`, `Parse`, or `Http`.
    pub async fn list_invites(&self, identity: &str) -> Result<Vec<Invite>, ApiError> {
        let response = self.transport.send(ApiRequest::get(list_invites_endpoint(identity))).await?;
        ensure_success(&response, Rejection::Plain)?;
        response.json()
    }

    /// `POST /api/invites/{id}/accept`.
    ///
    /// # Errors
    ///
    /// `Conflict` when the invite is missing, misaddressed, or not pending.
    pub async fn accept_invite(&self, invite_id: &str, request: &AcceptRequest) -> Result<Invite, ApiError> {
        let path = accept_invite_endpoint(invite_id);
        let response = self.transport.send(ApiRequest::post_json(path, request)?).await?;
        ensure_success(&response, Rejection::Conflict)?;
        response.json()
    }
}

fn ensure_success(response: &ApiResponse, rejection: Rejection) -> Result<(), ApiError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(status_error(response.status, &response.body, rejection))
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
