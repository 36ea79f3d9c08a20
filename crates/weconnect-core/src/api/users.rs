//! Account, profile and follow-graph operations.

use reqwest::{Method, StatusCode};
use tracing::info;

use crate::models::{MyProfile, UserProfile, UserSummary};

use super::error::ConflictKind;
use super::{ApiClient, ApiError};

/// Map a follow/unfollow rejection: self-targeting first, then the state conflict.
fn follow_conflict(status: StatusCode, body: &str, state: ConflictKind) -> Option<ApiError> {
    if !matches!(status, StatusCode::BAD_REQUEST | StatusCode::CONFLICT) {
        return None;
    }
    let message = ApiError::detail_message(body);
    let kind = if message.to_lowercase().contains("yourself") {
        ConflictKind::SelfFollow
    } else {
        state
    };
    Some(ApiError::conflict(kind, status, message))
}

impl ApiClient {
    /// Everyone except the caller, with follower counts.
    pub async fn list_users(&self) -> Result<Vec<UserSummary>, ApiError> {
        self.get("/users/").await
    }

    pub async fn follow(&self, user_id: i64) -> Result<(), ApiError> {
        self.action(Method::POST, &format!("/users/{}/follow", user_id), |status, body| {
            follow_conflict(status, body, ConflictKind::AlreadyFollowing)
        })
        .await
    }

    pub async fn unfollow(&self, user_id: i64) -> Result<(), ApiError> {
        self.action(Method::POST, &format!("/users/{}/unfollow", user_id), |status, body| {
            follow_conflict(status, body, ConflictKind::NotFollowing)
        })
        .await
    }

    pub async fn my_profile(&self) -> Result<MyProfile, ApiError> {
        self.get("/users/me").await
    }

    pub async fn user_profile(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        self.get(&format!("/users/{}/profile", user_id)).await
    }

    /// Delete the caller's account and, only on success, drop the credential.
    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.action(Method::DELETE, "/users/me", super::client::no_override)
            .await?;
        self.token_store().clear();
        info!("Account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_conflict_classification() {
        let already = follow_conflict(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Already following this user"}"#,
            ConflictKind::AlreadyFollowing,
        );
        assert_eq!(already.and_then(|e| e.conflict_kind()), Some(ConflictKind::AlreadyFollowing));

        let own = follow_conflict(
            StatusCode::BAD_REQUEST,
            r#"{"detail": "Cannot unfollow yourself"}"#,
            ConflictKind::NotFollowing,
        );
        assert_eq!(own.and_then(|e| e.conflict_kind()), Some(ConflictKind::SelfFollow));

        assert!(follow_conflict(StatusCode::NOT_FOUND, r#"{"detail": "User not found"}"#, ConflictKind::AlreadyFollowing).is_none());
    }
}
