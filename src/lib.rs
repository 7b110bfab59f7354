//! Session and authentication coordination for a cookie-authenticated web
//! client.
//!
//! ARCHITECTURE
//! ============
//! - `net`: transport with the one-shot refresh-and-replay interceptor, the
//!   typed provider client, and the native `reqwest` backend.
//! - `state`: the shared session record and its three writers.
//! - `navigation`: route guard, login intents, and the navigator.
//! - `invites`: invite coordination on top of session state.
//!
//! Control flow: guard -> identity check -> transport (may refresh and
//! replay once) -> session state updated -> guard allows or redirects.

pub mod config;
pub mod invites;
pub mod navigation;
pub mod net;
pub mod state;

pub use config::ClientConfig;
pub use invites::InviteCoordinator;
pub use navigation::{GuardOutcome, Navigation, NavigationIntent, Navigator, RouteContext, RouteGuard};
pub use net::{ApiClient, ApiError};
pub use state::{Identity, IdentityStatus, SessionState};

/// Everything a client view needs, wired from one config.
#[derive(Clone)]
pub struct Client {
    pub session: SessionState,
    pub navigator: Navigator,
    pub invites: InviteCoordinator,
}

impl Client {
    /// Wire session, navigator and invite coordinator over the native backend.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Config` if the config is invalid or the HTTP client
    /// cannot be built.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let session = SessionState::from_config(config)?;
        Ok(Self::with_session(session, config))
    }

    /// Wire the views over an existing session.
    #[must_use]
    pub fn with_session(session: SessionState, config: &ClientConfig) -> Self {
        Self {
            navigator: Navigator::from_config(session.clone(), config),
            invites: InviteCoordinator::new(session.clone(), config.allow_self_invite),
            session,
        }
    }
}
