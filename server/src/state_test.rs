use super::*;

fn user(username: &str, email: &str) -> UserRecord {
    UserRecord {
        id: Uuid::new_v4(),
        username: username.into(),
        email: email.into(),
        password_hash: String::new(),
        created_at: OffsetDateTime::now_utc(),
    }
}

fn token(user_id: Uuid) -> TokenRecord {
    TokenRecord { user_id, expires_at: OffsetDateTime::now_utc() + time::Duration::hours(1) }
}

#[test]
fn find_by_identifier_matches_username_or_email() {
    let mut store = Store::default();
    let alice = user("alice", "alice@example.test");
    let id = alice.id;
    store.users.insert(id, alice);

    assert_eq!(store.find_by_identifier("alice").map(|u| u.id), Some(id));
    assert_eq!(store.find_by_identifier("ALICE@example.test").map(|u| u.id), Some(id));
    assert!(store.find_by_identifier("bob99").is_none());
}

#[tokio::test]
async fn revoke_access_tokens_keeps_refresh_tokens() {
    let state = AppState::new(ServerConfig::default());
    let user_id = Uuid::new_v4();
    {
        let mut store = state.store.write().await;
        store.access_tokens.insert("a1".into(), token(user_id));
        store.access_tokens.insert("a2".into(), token(user_id));
        store.refresh_tokens.insert("r1".into(), token(user_id));
    }

    assert_eq!(state.revoke_access_tokens().await, 2);

    let store = state.store.read().await;
    assert!(store.access_tokens.is_empty());
    assert_eq!(store.refresh_tokens.len(), 1);
}

#[tokio::test]
async fn revoke_refresh_tokens_clears_them() {
    let state = AppState::new(ServerConfig::default());
    state.store.write().await.refresh_tokens.insert("r1".into(), token(Uuid::new_v4()));

    assert_eq!(state.revoke_refresh_tokens().await, 1);
    assert!(state.store.read().await.refresh_tokens.is_empty());
}
