//! Reference identity provider: cookie-authenticated auth endpoints and
//! invites over an in-memory store.

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;

pub use config::ServerConfig;
pub use error::ProviderError;
pub use routes::app;
pub use state::AppState;

/// Serve `state` on an already-bound listener until the process exits.
///
/// # Errors
///
/// Returns the I/O error that stopped the server.
pub async fn serve(listener: tokio::net::TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, app(state)).await
}
