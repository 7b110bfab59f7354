//! Invite routes. Every handler requires an authenticated user.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Deserialize;

use super::auth::AuthUser;
use crate::error::ProviderError;
use crate::services::invites::{self as invite_svc, AcceptInput, InviteInput, InviteView};
use crate::state::AppState;

/// `POST /api/invites`
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<InviteInput>,
) -> Result<(StatusCode, Json<InviteView>), ProviderError> {
    let mut store = state.store.write().await;
    let view = invite_svc::create(&mut store, &state.config, auth.user_id, input)?;
    Ok((StatusCode::CREATED, Json(view)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    identity: String,
}

/// `GET /api/invites?identity=ID`
pub async fn list_invites(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<InviteView>>, ProviderError> {
    let store = state.store.read().await;
    invite_svc::list_for(&store, auth.user_id, &query.identity).map(Json)
}

/// `POST /api/invites/{id}/accept`
pub async fn accept_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<AcceptInput>,
) -> Result<Json<InviteView>, ProviderError> {
    let mut store = state.store.write().await;
    invite_svc::accept(&mut store, auth.user_id, &id, input).map(Json)
}

#[cfg(test)]
#[path = "invites_test.rs"]
mod tests;
