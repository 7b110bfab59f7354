//! Pre-navigation hook for protected subtrees.
//!
//! DESIGN
//! ======
//! The guard never trusts what session state already holds. Every entry into
//! a protected subtree, prefetches included, asks the provider through
//! `SessionState::identity_check_for` and decides from that answer alone.
//!
//! ERROR HANDLING
//! ==============
//! A network failure is not "no identity". It surfaces as `Err` so the
//! navigator can abort without redirecting.

use tracing::debug;

use super::epoch::NavigationTicket;
use super::intent::LoginRedirect;
use crate::config::ClientConfig;
use crate::net::ApiError;
use crate::state::{Identity, IdentityStatus, SessionState};

/// Placeholder origin used only to normalize paths.
const PLACEHOLDER_ORIGIN: &str = "http://guard.invalid/";

/// Read-only context handed to a protected subtree that was allowed to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteContext {
    identity: Identity,
}

impl RouteContext {
    #[must_use]
    pub fn identity(&self) -> &str {
        self.identity.id()
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.identity.display_name()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow(RouteContext),
    Redirect(LoginRedirect),
    /// A newer navigation started; this one must not render or redirect.
    Superseded,
}

#[derive(Clone)]
pub struct RouteGuard {
    session: SessionState,
    login_path: String,
    protected_prefixes: Vec<String>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(session: SessionState, login_path: impl Into<String>, protected_prefixes: Vec<String>) -> Self {
        Self { session, login_path: login_path.into(), protected_prefixes }
    }

    #[must_use]
    pub fn from_config(session: SessionState, config: &ClientConfig) -> Self {
        Self::new(session, config.login_path.clone(), config.protected_prefixes.clone())
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Whether `location` falls inside a guarded subtree. `/profile` guards
    /// `/profile` and `/profile/...`, not `/profiles`.
    #[must_use]
    pub fn protects(&self, location: &str) -> bool {
        under_any_prefix(&self.protected_prefixes, location)
    }

    /// Confirm identity for a navigation to `target`.
    ///
    /// # Errors
    ///
    /// Whatever the identity check could not absorb: `Network`, `Parse`,
    /// `Http`.
    pub async fn before_load(&self, target: &str, ticket: &NavigationTicket) -> Result<GuardOutcome, ApiError> {
        let outcome = match self.session.identity_check_for(ticket).await? {
            IdentityStatus::Confirmed(identity) => GuardOutcome::Allow(RouteContext { identity }),
            IdentityStatus::Unconfirmed => GuardOutcome::Redirect(LoginRedirect::new(&self.login_path, target)),
            IdentityStatus::Superseded => GuardOutcome::Superseded,
        };
        debug!(location = target, outcome = outcome.label(), "route guard decided");
        Ok(outcome)
    }
}

impl GuardOutcome {
    fn label(&self) -> &'static str {
        match self {
            Self::Allow(_) => "allow",
            Self::Redirect(_) => "redirect",
            Self::Superseded => "superseded",
        }
    }
}

/// Segment-aware prefix match of `location`'s path against `prefixes`.
pub(crate) fn under_any_prefix(prefixes: &[String], location: &str) -> bool {
    let path = normalized_path(location);
    prefixes.iter().any(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        prefix.is_empty() || path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
    })
}

fn normalized_path(location: &str) -> String {
    url::Url::parse(PLACEHOLDER_ORIGIN)
        .and_then(|base| base.join(location))
        .map_or_else(
            |_| location.split(['?', '#']).next().unwrap_or_default().to_owned(),
            |url| url.path().to_owned(),
        )
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
