pub mod auth;
pub mod invites;
pub mod session;
