//! Provider error taxonomy and its HTTP rendering.
//!
//! Every failure renders as its status plus a `{code, message}` body. The
//! codes are stable and shared with clients; the message is for display.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("User not found")]
    UnknownUser,
    #[error("Invalid password")]
    WrongPassword,
    #[error("Not authenticated")]
    Unauthenticated,
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Email already exists")]
    EmailTaken,
    #[error("{0}")]
    InvalidRegistration(String),
    #[error("Invite not found")]
    InviteNotFound,
    #[error("Invite is not addressed to you")]
    NotAddressee,
    #[error("Invite already accepted")]
    AlreadyAccepted,
    #[error("Invitee not found")]
    UnknownInvitee,
    #[error("{0}")]
    InvalidInvite(String),
    #[error("Cannot act for another identity")]
    ForeignIdentity,
    #[error("Internal error")]
    Internal,
}

impl ProviderError {
    /// Stable code carried in the response body.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownUser => "AUTH001",
            Self::WrongPassword => "AUTH002",
            Self::Unauthenticated => "AUTH003",
            Self::UsernameTaken => "REG001",
            Self::EmailTaken => "REG002",
            Self::InvalidRegistration(_) => "REG003",
            Self::InviteNotFound => "INV001",
            Self::NotAddressee => "INV002",
            Self::AlreadyAccepted => "INV003",
            Self::UnknownInvitee => "INV004",
            Self::InvalidInvite(_) => "INV005",
            Self::ForeignIdentity => "INV006",
            Self::Internal => "INTERNAL001",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::UnknownUser | Self::InviteNotFound | Self::UnknownInvitee => StatusCode::NOT_FOUND,
            Self::WrongPassword | Self::InvalidRegistration(_) | Self::InvalidInvite(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::UsernameTaken | Self::EmailTaken | Self::AlreadyAccepted => StatusCode::CONFLICT,
            Self::NotAddressee | Self::ForeignIdentity => StatusCode::FORBIDDEN,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ProviderError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.error_code(), message: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
