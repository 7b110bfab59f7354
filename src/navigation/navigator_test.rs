use std::sync::Arc;

use reqwest::Method;

use super::*;
use crate::net::api::{LOGIN_PATH, LOGOUT_PATH, PROFILE_PATH};
use crate::net::transport::REFRESH_PATH;
use crate::net::transport::test_helpers::ScriptedBackend;
use crate::net::{ApiClient, Transport};

const ALICE: &str = r#"{"id":"u1","username":"alice"}"#;

fn navigator(backend: &Arc<ScriptedBackend>) -> Navigator {
    let session = SessionState::new(ApiClient::new(Transport::new(backend.clone())));
    Navigator::from_config(session, &ClientConfig::default())
}

fn signed_out(backend: &Arc<ScriptedBackend>) {
    backend.on(Method::GET, PROFILE_PATH, 401, "");
    backend.on(Method::POST, REFRESH_PATH, 401, "");
}

#[tokio::test]
async fn starts_at_home() {
    let nav = navigator(&ScriptedBackend::new());
    assert_eq!(nav.location(), "/");
}

#[tokio::test]
async fn unguarded_navigation_skips_provider() {
    let backend = ScriptedBackend::new();
    let nav = navigator(&backend);

    let result = nav.navigate("/about").await.unwrap();

    assert_eq!(result, Navigation::Rendered { location: "/about".into(), context: None });
    assert_eq!(nav.location(), "/about");
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn guarded_navigation_without_identity_redirects() {
    let backend = ScriptedBackend::new();
    signed_out(&backend);
    let nav = navigator(&backend);

    let result = nav.navigate("/profile?tab=invites").await.unwrap();

    let Navigation::Redirected(redirect) = result else { panic!("expected redirect, got {result:?}") };
    assert_eq!(nav.location(), "/login?redirect=%2Fprofile%3Ftab%3Dinvites");
    assert_eq!(redirect.intent.as_str(), "/profile?tab=invites");
}

#[tokio::test]
async fn guarded_navigation_with_identity_renders_context() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    let nav = navigator(&backend);

    let result = nav.navigate("/profile").await.unwrap();

    let Navigation::Rendered { location, context: Some(context) } = result else {
        panic!("expected guarded render, got {result:?}")
    };
    assert_eq!(location, "/profile");
    assert_eq!(context.display_name(), "alice");
    assert_eq!(nav.location(), "/profile");
}

#[tokio::test]
async fn guard_network_failure_keeps_location() {
    let backend = ScriptedBackend::new();
    backend.fail(Method::GET, PROFILE_PATH);
    let nav = navigator(&backend);
    nav.navigate("/about").await.unwrap();

    let err = nav.navigate("/profile").await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(nav.location(), "/about");
}

#[tokio::test]
async fn login_resumes_preserved_intent_exactly() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 401, "");
    backend.on(Method::GET, PROFILE_PATH, 401, "");
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    backend.on(Method::POST, REFRESH_PATH, 401, "");
    backend.on(Method::POST, LOGIN_PATH, 200, ALICE);
    let nav = navigator(&backend);
    nav.navigate("/profile/friends?sort=new&page=2").await.unwrap();

    let result = nav.login_and_resume("alice", "pw").await.unwrap();

    assert!(matches!(result, Navigation::Rendered { context: Some(_), .. }));
    assert_eq!(nav.location(), "/profile/friends?sort=new&page=2");
    assert!(nav.identity().is_some());
}

#[tokio::test]
async fn login_without_intent_goes_home() {
    let backend = ScriptedBackend::new();
    backend.on(Method::POST, LOGIN_PATH, 200, ALICE);
    let nav = navigator(&backend);
    nav.navigate("/login").await.unwrap();

    let result = nav.login_and_resume("alice", "pw").await.unwrap();

    assert_eq!(result, Navigation::Rendered { location: "/".into(), context: None });
    assert_eq!(nav.location(), "/");
}

#[tokio::test]
async fn login_ignores_redirect_outside_login_entry() {
    let backend = ScriptedBackend::new();
    backend.on(Method::POST, LOGIN_PATH, 200, ALICE);
    let nav = navigator(&backend);
    nav.navigate("/?redirect=%2Fabout").await.unwrap();

    let result = nav.login_and_resume("alice", "pw").await.unwrap();

    assert_eq!(result, Navigation::Rendered { location: "/".into(), context: None });
    assert_eq!(nav.location(), "/");
}

#[tokio::test]
async fn failed_login_keeps_intent() {
    let backend = ScriptedBackend::new();
    signed_out(&backend);
    backend.on(Method::POST, LOGIN_PATH, 400, r#"{"code":"AUTH002","message":"Invalid password"}"#);
    let nav = navigator(&backend);
    nav.navigate("/profile").await.unwrap();
    let login_location = nav.location();

    let err = nav.login_and_resume("alice", "wrong").await.unwrap_err();

    assert!(matches!(err, ApiError::Validation { .. }));
    assert_eq!(nav.location(), login_location);
}

#[tokio::test]
async fn logout_from_protected_location_redirects() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    backend.fail(Method::POST, LOGOUT_PATH);
    let nav = navigator(&backend);
    nav.navigate("/profile").await.unwrap();

    let result = nav.logout().await;

    assert!(matches!(result, Navigation::Redirected(_)));
    assert_eq!(nav.location(), "/login?redirect=%2Fprofile");
    assert!(nav.identity().is_none());
}

#[tokio::test]
async fn logout_leaves_protected_location_before_provider_answers() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    backend.on(Method::POST, LOGOUT_PATH, 204, "");
    let gate = backend.hold(Method::POST, LOGOUT_PATH);
    let nav = navigator(&backend);
    nav.navigate("/profile").await.unwrap();

    let logging_out = tokio::spawn({
        let nav = nav.clone();
        async move { nav.logout().await }
    });
    backend.reached(Method::POST, LOGOUT_PATH, 1).await;

    assert_eq!(nav.location(), "/login?redirect=%2Fprofile");
    assert!(nav.identity().is_none());

    gate.notify_one();
    assert!(matches!(logging_out.await.unwrap(), Navigation::Redirected(_)));
    assert_eq!(nav.location(), "/login?redirect=%2Fprofile");
}

#[tokio::test]
async fn logout_elsewhere_stays_put() {
    let backend = ScriptedBackend::new();
    backend.on(Method::POST, LOGOUT_PATH, 204, "");
    let nav = navigator(&backend);
    nav.navigate("/about").await.unwrap();

    let result = nav.logout().await;

    assert_eq!(result, Navigation::Rendered { location: "/about".into(), context: None });
}

#[tokio::test]
async fn prefetch_runs_guard_without_moving() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    let nav = navigator(&backend);

    let outcome = nav.prefetch("/profile").await.unwrap();

    assert!(matches!(outcome, Some(GuardOutcome::Allow(_))));
    assert_eq!(nav.location(), "/");
    assert_eq!(nav.prefetch("/about").await.unwrap(), None);
}

#[tokio::test]
async fn concurrent_navigations_keep_latest() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE_PATH, 200, ALICE);
    let nav = navigator(&backend);

    let (first, second) = tokio::join!(nav.navigate("/profile"), nav.navigate("/profile/invites"));

    let results = [first.unwrap(), second.unwrap()];
    assert!(results.iter().any(|r| matches!(r, Navigation::Rendered { .. })));
    assert_eq!(nav.location(), "/profile/invites");
}
