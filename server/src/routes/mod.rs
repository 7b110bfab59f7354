//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! Binds the auth and invite REST endpoints under one Axum router. Auth is
//! carried only in HttpOnly cookies; handlers that need it take `AuthUser`.

pub mod auth;
pub mod invites;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the provider's router over `state`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/invites", get(invites::list_invites).post(invites::create_invite))
        .route("/api/invites/{id}/accept", post(invites::accept_invite))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
