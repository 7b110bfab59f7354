//! Authenticated transport with a single silent re-authentication.
//!
//! ARCHITECTURE
//! ============
//! `Transport` wraps an `HttpBackend` (the thing that actually talks HTTP and
//! owns the cookie jar). Every outbound call is wrapped once in a
//! `PendingRequest`; an unauthorized response on a request that has not been
//! retried triggers one refresh call followed by one replay.
//!
//! INVARIANTS
//! ==========
//! - At most one refresh and one replay per original call.
//! - Refresh always precedes replay; the replay runs whatever refresh reported.
//! - The refresh call bypasses the interceptor, so it can never recurse.
//! - Non-401 responses are returned untouched, success or not.

use std::sync::Arc;

use reqwest::Method;
use tracing::{debug, warn};

use super::error::ApiError;

/// Provider path of the refresh operation.
pub const REFRESH_PATH: &str = "/api/auth/refresh";

// =============================================================================
// REQUEST / RESPONSE
// =============================================================================

/// An outbound call description: method, path relative to the API base, body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self { method: Method::GET, path: path.into(), body: None }
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self { method: Method::POST, path: path.into(), body: Some(body) }
    }

    /// `POST` with an encodable body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Serialization` if the body cannot be encoded.
    pub fn post_json<B: serde::Serialize>(path: impl Into<String>, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(Self::post(path, value))
    }
}

/// A raw provider response. Status and body text only; decoding is the
/// caller's job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Parse` if the body is not valid JSON for `T`.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| ApiError::Parse(e.to_string()))
    }
}

/// Per-call wrapper carrying the retry flag. Created once per `send`, never
/// shared between logically different requests.
#[derive(Debug)]
pub struct PendingRequest {
    request: ApiRequest,
    retried: bool,
}

impl PendingRequest {
    #[must_use]
    pub fn new(request: ApiRequest) -> Self {
        Self { request, retried: false }
    }

    #[must_use]
    pub fn request(&self) -> &ApiRequest {
        &self.request
    }

    #[must_use]
    pub fn retried(&self) -> bool {
        self.retried
    }

    /// Flip the retry flag. Returns `false` if it was already set.
    pub fn mark_retried(&mut self) -> bool {
        if self.retried {
            return false;
        }
        self.retried = true;
        true
    }
}

// =============================================================================
// BACKEND SEAM
// =============================================================================

/// Something that can execute one HTTP exchange with ambient credentials.
///
/// Implementations return `Err` only when no response was obtained; every
/// HTTP status, including 401, comes back as `Ok(ApiResponse)`.
#[async_trait::async_trait]
pub trait HttpBackend: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError>;
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// Shared transport handle. Cheap to clone.
#[derive(Clone)]
pub struct Transport {
    backend: Arc<dyn HttpBackend>,
}

impl Transport {
    #[must_use]
    pub fn new(backend: Arc<dyn HttpBackend>) -> Self {
        Self { backend }
    }

    /// Issue a request, absorbing one credential expiry.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the original call or the replay produced
    /// no response. A 401 on the replay is returned as a response, not an error.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let mut pending = PendingRequest::new(request);
        let response = self.backend.execute(pending.request()).await?;
        if !response.is_unauthorized() || !pending.mark_retried() {
            return Ok(response);
        }

        debug!(method = %pending.request().method, path = %pending.request().path, "unauthorized; refreshing session");
        self.refresh().await;

        let replay = self.backend.execute(pending.request()).await?;
        if replay.is_unauthorized() {
            warn!(path = %pending.request().path, "still unauthorized after refresh");
        }
        Ok(replay)
    }

    /// Ask the provider to renew the session cookie. The outcome is only
    /// logged; the caller replays regardless.
    async fn refresh(&self) {
        let request = ApiRequest::post(REFRESH_PATH, serde_json::json!({}));
        match self.backend.execute(&request).await {
            Ok(response) if response.is_success() => debug!("session refreshed"),
            Ok(response) => warn!(status = response.status, "session refresh rejected"),
            Err(e) => warn!(error = %e, "session refresh failed"),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================


#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
