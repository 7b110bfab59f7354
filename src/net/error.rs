//! Client-facing error taxonomy.
//!
//! DESIGN
//! ======
//! A first unauthorized response never appears here: the transport absorbs it
//! with the refresh-and-replay protocol. Everything else propagates to the
//! calling view unchanged, carrying a message that can be rendered directly.

/// Maximum number of provider error characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Errors produced by the session coordination layer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout, reset).
    #[error("network error: {0}")]
    Network(String),

    /// Still unauthorized after the single refresh-and-replay attempt.
    #[error("session expired, sign in again")]
    UnrecoverableAuth,

    /// The provider rejected a register, login or invite payload. `status` is
    /// 0 when the payload was refused locally before any request was sent.
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// Accept on an invite that is missing, misaddressed or no longer pending.
    #[error("{message}")]
    Conflict { status: u16, message: String },

    /// Any other non-success status.
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("response decode failed: {0}")]
    Parse(String),

    /// The request body could not be encoded.
    #[error("request encode failed: {0}")]
    Serialization(String),

    /// An authenticated operation ran without a confirmed identity.
    #[error("no confirmed identity, sign in first")]
    IdentityRequired,

    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Stable machine-readable code for logs and UI branching.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Network(_) => "E_NETWORK",
            Self::UnrecoverableAuth => "E_UNRECOVERABLE_AUTH",
            Self::Validation { .. } => "E_VALIDATION",
            Self::Conflict { .. } => "E_CONFLICT",
            Self::Http { .. } => "E_HTTP",
            Self::Parse(_) => "E_PARSE",
            Self::Serialization(_) => "E_SERIALIZATION",
            Self::IdentityRequired => "E_IDENTITY_REQUIRED",
            Self::Config(_) => "E_CONFIG",
        }
    }

    /// A payload refused before reaching the provider.
    #[must_use]
    pub fn local_validation(message: impl Into<String>) -> Self {
        Self::Validation { status: 0, message: message.into() }
    }

    /// True when the local session must be considered gone.
    #[must_use]
    pub fn is_unrecoverable_auth(&self) -> bool {
        matches!(self, Self::UnrecoverableAuth)
    }
}

/// How an operation classifies a 4xx rejection from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rejection {
    /// Register/login/invite payloads: 400, 404, 409 and 422 are validation failures.
    Validation,
    /// Invite accept: 403, 404 and 409 are conflicts.
    Conflict,
    /// Plain reads: every error status is reported as `Http`.
    Plain,
}

/// Map a non-success status into the taxonomy for the given operation kind.
pub(crate) fn status_error(status: u16, body: &str, rejection: Rejection) -> ApiError {
    if status == 401 {
        return ApiError::UnrecoverableAuth;
    }
    let message = provider_message(body);
    match (rejection, status) {
        (Rejection::Validation, 400 | 404 | 409 | 422) => ApiError::Validation { status, message },
        (Rejection::Conflict, 403 | 404 | 409) => ApiError::Conflict { status, message },
        _ => ApiError::Http { status, message },
    }
}

/// Extract the provider's `message` field, falling back to the raw body.
pub(crate) fn provider_message(body: &str) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_owned));
    sanitize_body(from_json.as_deref().unwrap_or(body))
}

/// Trim and truncate a body for user-facing messages.
pub(crate) fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_owned()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
