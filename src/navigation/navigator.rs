//! Location tracking with guarded transitions.
//!
//! ARCHITECTURE
//! ============
//! The navigator owns the current location. Every `navigate` advances the
//! navigation epoch before running the guard, so an identity check that
//! resolves after a later navigation started is discarded instead of
//! rendering or redirecting the wrong view.
//!
//! The location only moves on a decided outcome: allowed, redirected to login,
//! or an unguarded target. A superseded or failed guard leaves it alone.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, info, warn};

use super::epoch::NavigationEpoch;
use super::guard::{GuardOutcome, RouteContext, RouteGuard};
use super::intent::{LoginRedirect, NavigationIntent};
use crate::config::ClientConfig;
use crate::net::ApiError;
use crate::state::{Identity, SessionState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// The target is now the current location. `context` is set for guarded
    /// targets and carries the identity confirmed on this entry.
    Rendered { location: String, context: Option<RouteContext> },
    /// No identity; the current location is now the login entry point.
    Redirected(LoginRedirect),
    /// A newer navigation won; the location was not touched.
    Superseded,
}

#[derive(Clone)]
pub struct Navigator {
    session: SessionState,
    guard: RouteGuard,
    epoch: NavigationEpoch,
    location: Arc<RwLock<String>>,
    home_path: String,
}

impl Navigator {
    /// Navigator starting at `home_path`.
    #[must_use]
    pub fn new(session: SessionState, guard: RouteGuard, home_path: impl Into<String>) -> Self {
        let home_path = home_path.into();
        Self {
            session,
            guard,
            epoch: NavigationEpoch::new(),
            location: Arc::new(RwLock::new(home_path.clone())),
            home_path,
        }
    }

    #[must_use]
    pub fn from_config(session: SessionState, config: &ClientConfig) -> Self {
        let guard = RouteGuard::from_config(session.clone(), config);
        Self::new(session, guard, config.home_path.clone())
    }

    #[must_use]
    pub fn location(&self) -> String {
        self.location.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn guard(&self) -> &RouteGuard {
        &self.guard
    }

    /// Move to `target`, running the guard if it is protected.
    ///
    /// # Errors
    ///
    /// The guard's identity check failed without an answer (`Network`,
    /// `Parse`, `Http`). The location is unchanged.
    pub async fn navigate(&self, target: &str) -> Result<Navigation, ApiError> {
        let ticket = self.epoch.advance();

        if !self.guard.protects(target) {
            self.set_location(target);
            return Ok(Navigation::Rendered { location: target.to_owned(), context: None });
        }

        let outcome = self.guard.before_load(target, &ticket).await.inspect_err(|e| {
            warn!(location = target, error = %e, "guard could not confirm identity; navigation aborted");
        })?;

        if !ticket.is_current() {
            debug!(location = target, "navigation superseded after guard");
            return Ok(Navigation::Superseded);
        }

        Ok(match outcome {
            GuardOutcome::Allow(context) => {
                self.set_location(target);
                Navigation::Rendered { location: target.to_owned(), context: Some(context) }
            }
            GuardOutcome::Redirect(redirect) => {
                info!(attempted = target, "no identity; redirecting to login");
                self.set_location(&redirect.location);
                Navigation::Redirected(redirect)
            }
            GuardOutcome::Superseded => Navigation::Superseded,
        })
    }

    /// Run the guard for `target` without moving. `None` for unguarded
    /// targets. Shares the current navigation's ticket, so a navigation that
    /// starts meanwhile supersedes it.
    ///
    /// # Errors
    ///
    /// Same as `navigate`.
    pub async fn prefetch(&self, target: &str) -> Result<Option<GuardOutcome>, ApiError> {
        if !self.guard.protects(target) {
            return Ok(None);
        }
        let ticket = self.epoch.ticket();
        self.guard.before_load(target, &ticket).await.map(Some)
    }

    /// Sign in and resume the intent preserved on the login entry point, or
    /// go home when there is none. A `redirect` parameter on any other
    /// location is ignored. The intent is consumed: the location moves off
    /// the login entry point.
    ///
    /// # Errors
    ///
    /// Login failures (`Validation`, `Network`, ...) leave the location on
    /// the login entry point with its intent intact. Errors from the resumed
    /// navigation are those of `navigate`.
    pub async fn login_and_resume(&self, identifier: &str, credential: &str) -> Result<Navigation, ApiError> {
        let location = self.location();
        let on_login_entry = location.split(['?', '#']).next() == Some(self.guard.login_path());
        let intent = if on_login_entry { NavigationIntent::from_location(&location) } else { None };
        self.session.login(identifier, credential).await?;

        let destination = intent.map_or_else(|| self.home_path.clone(), NavigationIntent::into_inner);
        debug!(destination = %destination, "resuming after login");
        self.navigate(&destination).await
    }

    /// Sign out and leave any protected location for the login entry point.
    /// The location moves before the provider is told; a failed or slow
    /// provider call is logged by the session and otherwise ignored.
    pub async fn logout(&self) -> Navigation {
        self.epoch.advance();

        let current = self.location();
        let navigation = if self.guard.protects(&current) {
            let redirect = LoginRedirect::new(self.guard.login_path(), &current);
            self.set_location(&redirect.location);
            Navigation::Redirected(redirect)
        } else {
            Navigation::Rendered { location: current, context: None }
        };

        let _ = self.session.logout().await;
        navigation
    }

    /// Snapshot of the signed-in identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.session.current()
    }

    fn set_location(&self, location: &str) {
        let mut current = self.location.write().unwrap_or_else(PoisonError::into_inner);
        location.clone_into(&mut current);
    }
}

#[cfg(test)]
#[path = "navigator_test.rs"]
mod tests;
