//! `reqwest`-backed `HttpBackend` with a cookie jar.
//!
//! Credentials are ambient: the provider sets `HttpOnly` cookies on login and
//! refresh, and the client's cookie store attaches them to every later call.
//! Nothing here reads or stores tokens explicitly.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;
use super::transport::{ApiRequest, ApiResponse, HttpBackend};
use crate::config::ClientConfig;

/// Native HTTP backend. One instance per session; the cookie jar lives inside.
pub struct ReqwestBackend {
    client: reqwest::Client,
    base_url: String,
}

impl ReqwestBackend {
    /// Build a backend from client config.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(format!("http client build failed: {e}")))?;
        Ok(Self { client, base_url: config.api_base_url.clone() })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = build_url_with_base(&self.base_url, &request.path);
        debug!(method = %request.method, %url, "http request");

        let mut builder = self.client.request(request.method.clone(), &url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(map_request_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(map_request_error)?;
        Ok(ApiResponse { status, body })
    }
}

/// Join an API base URL and a request path with exactly one slash.
pub(crate) fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Network("request timed out".to_owned())
    } else {
        ApiError::Network(format!("unable to reach the server: {err}"))
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
