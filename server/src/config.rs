//! Provider configuration parsed from environment variables.

use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: u64 = 900;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: u64 = 604_800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Mark auth cookies `Secure`. Off by default so plain-HTTP dev works.
    pub cookie_secure: bool,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Whether an identity may address an invite to itself.
    pub allow_self_invite: bool,
    /// Whether the invitee identifier must resolve to a registered identity.
    pub require_known_invitee: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cookie_secure: false,
            access_token_ttl: Duration::from_secs(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl: Duration::from_secs(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            allow_self_invite: false,
            require_known_invitee: true,
        }
    }
}

impl ServerConfig {
    /// Build typed provider config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `COOKIE_SECURE`: default false
    /// - `ACCESS_TOKEN_TTL_SECS`: default 900
    /// - `REFRESH_TOKEN_TTL_SECS`: default 604800
    /// - `ALLOW_SELF_INVITE`: default false
    /// - `REQUIRE_KNOWN_INVITEE`: default true
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),
            access_token_ttl: Duration::from_secs(env_parse("ACCESS_TOKEN_TTL_SECS", DEFAULT_ACCESS_TOKEN_TTL_SECS)),
            refresh_token_ttl: Duration::from_secs(env_parse("REFRESH_TOKEN_TTL_SECS", DEFAULT_REFRESH_TOKEN_TTL_SECS)),
            allow_self_invite: env_bool("ALLOW_SELF_INVITE").unwrap_or(false),
            require_known_invitee: env_bool("REQUIRE_KNOWN_INVITEE").unwrap_or(true),
        }
    }
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
