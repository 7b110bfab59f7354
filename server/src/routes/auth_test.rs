use axum::body::{Body, to_bytes};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, Response};
use tower::ServiceExt;

use super::*;
use crate::config::ServerConfig;
use crate::routes::app;

fn post_json(uri: &str, body: &serde_json::Value, cookies: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, cookies)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_with(uri: &str, cookies: &str) -> Request<Body> {
    Request::builder().uri(uri).header(COOKIE, cookies).body(Body::empty()).unwrap()
}

/// `name=value; name=value` from every `Set-Cookie` with a non-empty value.
fn cookie_header(response: &Response<Body>) -> String {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter(|pair| !pair.ends_with('='))
        .collect::<Vec<_>>()
        .join("; ")
}

async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
}

async fn registered_and_signed_in(state: &AppState) -> String {
    let router = app(state.clone());
    let register = serde_json::json!({"username": "alice", "password": "pw", "email": "alice@example.test"});
    let response = router.clone().oneshot(post_json("/api/auth/register", &register, "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let login = serde_json::json!({"identifier": "alice", "password": "pw"});
    let response = router.oneshot(post_json("/api/auth/login", &login, "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    cookie_header(&response)
}

#[tokio::test]
async fn login_sets_both_cookies_and_returns_identity() {
    let state = AppState::new(ServerConfig::default());
    let cookies = registered_and_signed_in(&state).await;

    assert!(cookies.contains(&format!("{ACCESS_COOKIE}=")));
    assert!(cookies.contains(&format!("{REFRESH_COOKIE}=")));

    let response = app(state).oneshot(get_with("/api/auth/profile", &cookies)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["username"], "alice");
    assert!(body["createdAt"].is_string());
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn login_errors_carry_codes() {
    let state = AppState::new(ServerConfig::default());
    registered_and_signed_in(&state).await;
    let router = app(state);

    let unknown = serde_json::json!({"identifier": "bob99", "password": "pw"});
    let response = router.clone().oneshot(post_json("/api/auth/login", &unknown, "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "AUTH001");

    let wrong = serde_json::json!({"identifier": "alice", "password": "nope"});
    let response = router.oneshot(post_json("/api/auth/login", &wrong, "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "AUTH002");
}

#[tokio::test]
async fn profile_without_cookie_is_unauthorized() {
    let state = AppState::new(ServerConfig::default());
    let response = app(state).oneshot(get_with("/api/auth/profile", "")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_restores_access_after_revocation() {
    let state = AppState::new(ServerConfig::default());
    let cookies = registered_and_signed_in(&state).await;
    state.revoke_access_tokens().await;
    let router = app(state);

    let response = router.clone().oneshot(get_with("/api/auth/profile", &cookies)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = router
        .clone()
        .oneshot(post_json("/api/auth/refresh", &serde_json::json!({}), &cookies))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let renewed = cookie_header(&response);
    let refresh_pair = cookies.split("; ").find(|c| c.starts_with(REFRESH_COOKIE)).unwrap();

    let response = router
        .oneshot(get_with("/api/auth/profile", &format!("{renewed}; {refresh_pair}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn refresh_without_cookie_is_unauthorized() {
    let state = AppState::new(ServerConfig::default());
    let response = app(state)
        .oneshot(post_json("/api/auth/refresh", &serde_json::json!({}), ""))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["code"], "AUTH003");
}

#[tokio::test]
async fn logout_revokes_tokens_and_clears_cookies() {
    let state = AppState::new(ServerConfig::default());
    let cookies = registered_and_signed_in(&state).await;
    let router = app(state.clone());

    let response = router
        .clone()
        .oneshot(post_json("/api/auth/logout", &serde_json::json!({}), &cookies))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);

    let store = state.store.read().await;
    assert!(store.access_tokens.is_empty());
    assert!(store.refresh_tokens.is_empty());
}

#[tokio::test]
async fn register_duplicate_is_conflict() {
    let state = AppState::new(ServerConfig::default());
    registered_and_signed_in(&state).await;

    let again = serde_json::json!({"username": "Alice", "password": "pw", "email": "x@example.test"});
    let response = app(state).oneshot(post_json("/api/auth/register", &again, "")).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(json_body(response).await["code"], "REG001");
}

#[test]
fn ttl_saturates_instead_of_failing() {
    assert_eq!(ttl(std::time::Duration::from_secs(60)), time::Duration::seconds(60));
    assert_eq!(ttl(std::time::Duration::MAX), time::Duration::MAX);
}
