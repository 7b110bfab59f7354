//! Client-side session state.

pub mod session;

pub use session::{Identity, IdentityStatus, SessionState};
