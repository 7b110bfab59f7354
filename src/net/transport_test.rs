use super::test_helpers::ScriptedBackend;
use super::*;

const PROFILE: &str = "/api/auth/profile";

fn transport(backend: &Arc<ScriptedBackend>) -> Transport {
    Transport::new(backend.clone())
}

// =============================================================================
// PendingRequest
// =============================================================================

#[test]
fn pending_request_retry_flag_flips_once() {
    let mut pending = PendingRequest::new(ApiRequest::get(PROFILE));
    assert!(!pending.retried());
    assert!(pending.mark_retried());
    assert!(pending.retried());
    assert!(!pending.mark_retried());
    assert!(pending.retried());
}

#[test]
fn post_json_encodes_body() {
    let request = ApiRequest::post_json("/x", &serde_json::json!({"a": 1})).unwrap();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.body, Some(serde_json::json!({"a": 1})));
}

// =============================================================================
// send
// =============================================================================

#[tokio::test]
async fn success_passes_through_without_refresh() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 200, r#"{"id":"u1","username":"alice"}"#);

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(backend.trace(), vec!["GET /api/auth/profile"]);
}

#[tokio::test]
async fn non_auth_errors_are_returned_unchanged() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 500, "boom");

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert_eq!(response, ApiResponse::new(500, "boom"));
    assert_eq!(backend.count(Method::POST, REFRESH_PATH), 0);
}

#[tokio::test]
async fn single_unauthorized_refreshes_once_and_returns_replay() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 401, "expired");
    backend.on(Method::GET, PROFILE, 200, r#"{"id":"u1","username":"alice"}"#);
    backend.on(Method::POST, REFRESH_PATH, 200, r#"{"token":"t"}"#);

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(
        backend.trace(),
        vec!["GET /api/auth/profile", "POST /api/auth/refresh", "GET /api/auth/profile"]
    );
}

#[tokio::test]
async fn second_unauthorized_is_surfaced_without_another_refresh() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 401, "expired");
    backend.on(Method::POST, REFRESH_PATH, 200, "{}");

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert!(response.is_unauthorized());
    assert_eq!(backend.count(Method::POST, REFRESH_PATH), 1);
    assert_eq!(backend.count(Method::GET, PROFILE), 2);
}

#[tokio::test]
async fn replay_happens_even_when_refresh_is_rejected() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 401, "");
    backend.on(Method::GET, PROFILE, 403, "forbidden");
    backend.on(Method::POST, REFRESH_PATH, 401, r#"{"error":"Refresh token not found"}"#);

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert_eq!(response.status, 403);
    assert_eq!(backend.count(Method::POST, REFRESH_PATH), 1);
    assert_eq!(backend.count(Method::GET, PROFILE), 2);
}

#[tokio::test]
async fn replay_happens_even_when_refresh_has_no_network() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 401, "");
    backend.on(Method::GET, PROFILE, 200, "{}");
    backend.fail(Method::POST, REFRESH_PATH);

    let response = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn refresh_is_never_intercepted() {
    let backend = ScriptedBackend::new();
    backend.on(Method::POST, "/api/invites", 401, "");
    backend.on(Method::POST, REFRESH_PATH, 401, "");

    let request = ApiRequest::post("/api/invites", serde_json::json!({}));
    let response = transport(&backend).send(request).await.unwrap();

    assert!(response.is_unauthorized());
    assert_eq!(
        backend.trace(),
        vec!["POST /api/invites", "POST /api/auth/refresh", "POST /api/invites"]
    );
}

#[tokio::test]
async fn replay_carries_the_original_body() {
    let backend = ScriptedBackend::new();
    backend.on(Method::POST, "/api/invites", 401, "");
    backend.on(Method::POST, "/api/invites", 201, "{}");
    backend.on(Method::POST, REFRESH_PATH, 200, "{}");

    let body = serde_json::json!({"inviterId": "u1", "inviteeIdentifier": "bob99"});
    transport(&backend)
        .send(ApiRequest::post("/api/invites", body.clone()))
        .await
        .unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].body.as_ref(), Some(&body));
    assert_eq!(calls[2].body.as_ref(), Some(&body));
}

#[tokio::test]
async fn network_failure_is_an_error_and_not_retried() {
    let backend = ScriptedBackend::new();
    backend.fail(Method::GET, PROFILE);

    let err = transport(&backend).send(ApiRequest::get(PROFILE)).await.unwrap_err();

    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn independent_calls_each_get_their_own_retry() {
    let backend = ScriptedBackend::new();
    backend.on(Method::GET, PROFILE, 401, "");
    backend.on(Method::GET, PROFILE, 200, "{}");
    backend.on(Method::GET, PROFILE, 401, "");
    backend.on(Method::GET, PROFILE, 200, "{}");
    backend.on(Method::POST, REFRESH_PATH, 200, "{}");

    let transport = transport(&backend);
    assert_eq!(transport.send(ApiRequest::get(PROFILE)).await.unwrap().status, 200);
    assert_eq!(transport.send(ApiRequest::get(PROFILE)).await.unwrap().status, 200);
    assert_eq!(backend.count(Method::POST, REFRESH_PATH), 2);
}
