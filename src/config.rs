//! Client configuration parsed from environment variables.

use std::time::Duration;

use crate::navigation::guard::under_any_prefix;
use crate::net::ApiError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const DEFAULT_PROTECTED_PREFIXES: &str = "/profile";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Provider base URL; request paths are joined onto it.
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    /// Login entry point that receives the `redirect` parameter.
    pub login_path: String,
    /// Where a login without a preserved destination lands.
    pub home_path: String,
    /// Path prefixes of the guarded subtrees.
    pub protected_prefixes: Vec<String>,
    /// How long a confirmed identity may be reused without asking the
    /// provider again. Zero disables the cache.
    pub identity_cache_ttl: Duration,
    /// Whether an identity may invite itself.
    pub allow_self_invite: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_owned(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            home_path: DEFAULT_HOME_PATH.to_owned(),
            protected_prefixes: parse_prefixes(DEFAULT_PROTECTED_PREFIXES),
            identity_cache_ttl: Duration::ZERO,
            allow_self_invite: false,
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `BEFRIEND_API_URL`: default `http://127.0.0.1:3000`
    /// - `BEFRIEND_REQUEST_TIMEOUT_SECS`: default 10
    /// - `BEFRIEND_CONNECT_TIMEOUT_SECS`: default 5
    /// - `BEFRIEND_LOGIN_PATH`: default `/login`
    /// - `BEFRIEND_HOME_PATH`: default `/`
    /// - `BEFRIEND_PROTECTED_PREFIXES`: comma-separated, default `/profile`
    /// - `BEFRIEND_IDENTITY_CACHE_SECS`: default 0 (no cache)
    /// - `BEFRIEND_ALLOW_SELF_INVITE`: default false
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if a path does not start with `/` or the
    /// protected prefix list is empty.
    pub fn from_env() -> Result<Self, ApiError> {
        let api_base_url = std::env::var("BEFRIEND_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();
        let login_path = std::env::var("BEFRIEND_LOGIN_PATH").unwrap_or_else(|_| DEFAULT_LOGIN_PATH.to_owned());
        let home_path = std::env::var("BEFRIEND_HOME_PATH").unwrap_or_else(|_| DEFAULT_HOME_PATH.to_owned());
        let protected_prefixes = parse_prefixes(
            &std::env::var("BEFRIEND_PROTECTED_PREFIXES").unwrap_or_else(|_| DEFAULT_PROTECTED_PREFIXES.to_owned()),
        );

        let config = Self {
            api_base_url,
            request_timeout_secs: env_parse("BEFRIEND_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse("BEFRIEND_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            login_path,
            home_path,
            protected_prefixes,
            identity_cache_ttl: Duration::from_secs(env_parse("BEFRIEND_IDENTITY_CACHE_SECS", 0)),
            allow_self_invite: env_bool("BEFRIEND_ALLOW_SELF_INVITE").unwrap_or(false),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants `from_env` enforces.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` describing the first violation.
    pub fn validate(&self) -> Result<(), ApiError> {
        for (name, path) in [("BEFRIEND_LOGIN_PATH", &self.login_path), ("BEFRIEND_HOME_PATH", &self.home_path)] {
            if !path.starts_with('/') {
                return Err(ApiError::Config(format!("{name} must start with '/': {path}")));
            }
        }
        if self.protected_prefixes.is_empty() {
            return Err(ApiError::Config("BEFRIEND_PROTECTED_PREFIXES is empty".to_owned()));
        }
        if let Some(bad) = self.protected_prefixes.iter().find(|p| !p.starts_with('/')) {
            return Err(ApiError::Config(format!("protected prefix must start with '/': {bad}")));
        }
        if under_any_prefix(&self.protected_prefixes, &self.login_path) {
            return Err(ApiError::Config(format!(
                "BEFRIEND_LOGIN_PATH {} lies inside a protected prefix",
                self.login_path
            )));
        }
        Ok(())
    }
}

fn parse_prefixes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_owned)
        .collect()
}

fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
