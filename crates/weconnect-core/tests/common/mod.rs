#![allow(dead_code)]

use std::sync::Arc;

use serde_json::{json, Value};
use weconnect_core::{ApiClient, MemoryTokenStore, TokenStore};
use wiremock::{Match, MockServer, Request};

/// Matches requests that carry no `Authorization` header at all.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

pub fn client(server: &MockServer, store: &Arc<MemoryTokenStore>) -> ApiClient {
    let store: Arc<dyn TokenStore> = store.clone();
    ApiClient::new(&server.uri(), store).expect("client should build")
}

pub fn post_json(id: i64, likes: u32, liked: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Post {}", id),
        "content": "Hello there",
        "timestamp": "2024-03-01T09:00:00",
        "owner_id": 2,
        "owner_username": "bob",
        "likes_count": likes,
        "comments_count": 0,
        "is_liked_by_current_user": liked
    })
}

pub fn comment_json(id: i64, post_id: i64, content: &str) -> Value {
    json!({
        "id": id,
        "content": content,
        "owner_id": 1,
        "post_id": post_id,
        "timestamp": "2024-03-01T10:00:00+00:00",
        "owner_username": "alice"
    })
}

pub fn user_json(id: i64, followers: u32, following: bool) -> Value {
    json!({
        "id": id,
        "username": format!("user{}", id),
        "followers_count": followers,
        "is_following": following
    })
}
