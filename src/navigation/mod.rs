//! Guarded navigation: epochs, login intents, the route guard, and the
//! navigator that ties them to a current location.

pub mod epoch;
pub mod guard;
pub mod intent;
pub mod navigator;

pub use epoch::{NavigationEpoch, NavigationTicket};
pub use guard::{GuardOutcome, RouteContext, RouteGuard};
pub use intent::{LoginRedirect, NavigationIntent};
pub use navigator::{Navigation, Navigator};
