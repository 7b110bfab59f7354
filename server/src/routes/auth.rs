//! Auth routes: register, login, refresh, logout, profile.

use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ProviderError;
use crate::services::auth::{self as auth_svc, RegisterInput, UserView};
use crate::services::session;
use crate::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

fn build_cookie(name: &'static str, value: String, max_age: time::Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    build_cookie(name, String::new(), time::Duration::ZERO, secure)
}

fn ttl(duration: std::time::Duration) -> time::Duration {
    time::Duration::try_from(duration).unwrap_or(time::Duration::MAX)
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Authenticated user extracted from the access cookie.
/// Use as a handler parameter to require authentication.
pub struct AuthUser {
    pub user_id: Uuid,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ProviderError;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar.get(ACCESS_COOKIE).map(Cookie::value).unwrap_or_default();
        if token.is_empty() {
            return Err(ProviderError::Unauthenticated);
        }

        let app_state = AppState::from_ref(state);
        let store = app_state.store.read().await;
        let user_id = session::validate_access(&store, token).ok_or(ProviderError::Unauthenticated)?;
        if !store.users.contains_key(&user_id) {
            return Err(ProviderError::Unauthenticated);
        }

        Ok(Self { user_id, token: token.to_owned() })
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/auth/register`: create a user. Does not sign in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> Result<Json<UserView>, ProviderError> {
    let mut store = state.store.write().await;
    auth_svc::register(&mut store, input).map(Json)
}

#[derive(Deserialize)]
pub struct LoginBody {
    identifier: String,
    password: String,
}

#[derive(Serialize)]
pub struct IdentityBody {
    id: Uuid,
    username: String,
}

/// `POST /api/auth/login`: check credentials, set both auth cookies.
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(body): Json<LoginBody>) -> Response {
    let mut store = state.store.write().await;
    let user = match auth_svc::authenticate(&store, &body.identifier, &body.password) {
        Ok(user) => IdentityBody { id: user.id, username: user.username.clone() },
        Err(e) => {
            tracing::debug!(error = %e, "login rejected");
            return e.into_response();
        }
    };

    let config = &state.config;
    let tokens = session::issue(&mut store, user.id, config.access_token_ttl, config.refresh_token_ttl);
    drop(store);
    tracing::info!(user_id = %user.id, "user signed in");

    let jar = jar
        .add(build_cookie(ACCESS_COOKIE, tokens.access, ttl(config.access_token_ttl), config.cookie_secure))
        .add(build_cookie(REFRESH_COOKIE, tokens.refresh, ttl(config.refresh_token_ttl), config.cookie_secure));
    (jar, Json(user)).into_response()
}

/// `POST /api/auth/refresh`: mint a new access cookie from the refresh
/// cookie. Never requires a valid access token.
pub async fn refresh(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some(refresh_token) = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned()) else {
        return ProviderError::Unauthenticated.into_response();
    };

    let config = &state.config;
    let access = {
        let mut store = state.store.write().await;
        session::refresh(&mut store, &refresh_token, config.access_token_ttl)
    };
    let Some(access) = access else {
        tracing::debug!("refresh rejected");
        return ProviderError::Unauthenticated.into_response();
    };

    let jar = jar.add(build_cookie(ACCESS_COOKIE, access, ttl(config.access_token_ttl), config.cookie_secure));
    (jar, StatusCode::NO_CONTENT).into_response()
}

/// `POST /api/auth/logout`: forget both tokens, clear both cookies.
pub async fn logout(State(state): State<AppState>, auth: AuthUser, jar: CookieJar) -> impl IntoResponse {
    let refresh_token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned());
    {
        let mut store = state.store.write().await;
        session::revoke(&mut store, Some(&auth.token), refresh_token.as_deref());
    }
    tracing::info!(user_id = %auth.user_id, "user signed out");

    let secure = state.config.cookie_secure;
    let jar = jar.add(clear_cookie(ACCESS_COOKIE, secure)).add(clear_cookie(REFRESH_COOKIE, secure));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/auth/profile`: the signed-in user.
pub async fn profile(State(state): State<AppState>, auth: AuthUser) -> Result<Json<UserView>, ProviderError> {
    let store = state.store.read().await;
    store
        .users
        .get(&auth.user_id)
        .map(|user| Json(UserView::from(user)))
        .ok_or(ProviderError::Unauthenticated)
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
