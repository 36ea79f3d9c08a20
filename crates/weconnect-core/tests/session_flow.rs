mod common;

use std::sync::Arc;

use serde_json::json;
use weconnect_core::{
    ApiError, Credential, ErrorKind, Gate, GuardState, MemoryTokenStore, RouteGuard, TokenStore,
};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client, NoAuthorization};

#[tokio::test]
async fn test_login_success_stores_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("username=bob"))
        .and(body_string_contains("password=correct"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "abc", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let api = client(&server, &store);

    let credential = api.login("bob", "correct").await.expect("login should succeed");
    assert_eq!(credential.as_str(), "abc");
    assert_eq!(store.get(), Some(Credential::new("abc")));
    assert!(api.is_logged_in());
}

#[tokio::test]
async fn test_login_and_register_omit_held_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(NoAuthorization)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "fresh", "token_type": "bearer"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "username": "carol",
            "email": "carol@example.com",
            "created_at": "2024-03-01T09:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_credential("old"));
    let api = client(&server, &store);

    api.register("carol", "carol@example.com", "pw").await.expect("register");
    assert_eq!(store.get(), Some(Credential::new("old")));

    api.login("bob", "correct").await.expect("login");
    assert_eq!(store.get(), Some(Credential::new("fresh")));
}

#[tokio::test]
async fn test_login_rejected_leaves_store_absent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"detail": "Incorrect username or password"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let api = client(&server, &store);

    let err = api.login("bob", "wrong").await.expect_err("login should fail");
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailed);
    assert_eq!(err.to_string(), "Authentication failed: Incorrect username or password");
    assert!(store.get().is_none());
}

#[tokio::test]
async fn test_login_transport_failure_is_distinguishable() {
    // Reserve a port, then release it so nothing is listening there.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        format!("http://{}", listener.local_addr().expect("addr"))
    };
    let store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());
    let api = weconnect_core::ApiClient::new(&uri, Arc::clone(&store)).expect("client");

    let err = api.login("bob", "correct").await.expect_err("no server");
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(store.get().is_none());
}

#[tokio::test]
async fn test_register_returns_user_without_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "username": "carol",
            "email": "carol@example.com",
            "created_at": "2024-03-01T09:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let api = client(&server, &store);

    let user = api
        .register("carol", "carol@example.com", "pw")
        .await
        .expect("register should succeed");
    assert_eq!(user.id, 3);
    assert_eq!(user.email, "carol@example.com");
    assert!(store.get().is_none());
}

#[tokio::test]
async fn test_register_conflict_carries_server_reason() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/users/"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"detail": "Username already registered"})),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let api = client(&server, &store);

    let err = api
        .register("bob", "bob@example.com", "pw")
        .await
        .expect_err("duplicate username");
    match err {
        ApiError::ValidationFailed(reason) => assert_eq!(reason, "Username already registered"),
        other => panic!("expected ValidationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_invalid_input_sends_nothing() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryTokenStore::new());
    let api = client(&server, &store);

    let err = api.register("bob", "not-an-email", "pw").await.expect_err("bad email");
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);

    let received = server.received_requests().await.expect("recording enabled");
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_logout_clears_without_network() {
    let server = MockServer::start().await;

    for initial in [None, Some("abc")] {
        let store = Arc::new(match initial {
            Some(token) => MemoryTokenStore::with_credential(token),
            None => MemoryTokenStore::new(),
        });
        let api = client(&server, &store);

        api.logout();
        assert!(store.get().is_none());
        api.logout();
        assert!(store.get().is_none());
    }

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 0);
}

#[tokio::test]
async fn test_bearer_header_follows_store() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .and(header("authorization", "Bearer T"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "alice", "followers_count": 2, "following_count": 5
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/posts/mine"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_credential("T"));
    let api = client(&server, &store);

    let me = api.my_profile().await.expect("profile with token");
    assert_eq!(me.following_count, 5);

    store.clear();
    let posts = api.my_posts().await.expect("posts without token");
    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_login_then_guard_authorizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "abc"})))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let shared: Arc<dyn TokenStore> = store.clone();
    let api = client(&server, &store);

    let mut before = RouteGuard::new(Arc::clone(&shared));
    assert!(before.gate(|| "feed").is_redirect());

    api.login("bob", "correct").await.expect("login");

    let mut after = RouteGuard::new(Arc::clone(&shared));
    assert_eq!(after.state(), GuardState::Unknown);
    assert_eq!(after.gate(|| "feed"), Gate::Render("feed"));

    api.logout();
    let mut again = RouteGuard::new(shared);
    assert_eq!(again.check(), GuardState::Unauthorized);
}
