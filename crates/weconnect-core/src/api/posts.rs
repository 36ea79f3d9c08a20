//! Post, feed and like operations.

use reqwest::{Method, StatusCode};
use tracing::debug;

use crate::models::{NewPost, Page, Post, PostWithCounts};

use super::error::ConflictKind;
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Home feed with author names, counters and the caller's like flags.
    pub async fn feed(&self, page: Page) -> Result<Vec<PostWithCounts>, ApiError> {
        let posts: Vec<PostWithCounts> = self.get_query("/posts/with_counts/", &page.query()).await?;
        debug!(count = posts.len(), skip = page.skip, "Fetched feed");
        Ok(posts)
    }

    /// Newest posts without counters.
    pub async fn recent_posts(&self, page: Page) -> Result<Vec<Post>, ApiError> {
        self.get_query("/posts/", &page.query()).await
    }

    pub async fn posts_by_user(&self, user_id: i64) -> Result<Vec<PostWithCounts>, ApiError> {
        self.get(&format!("/posts/user/{}", user_id)).await
    }

    pub async fn my_posts(&self) -> Result<Vec<Post>, ApiError> {
        self.get("/posts/mine").await
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        if post.title.trim().is_empty() || post.content.trim().is_empty() {
            return Err(ApiError::ValidationFailed(
                "a post needs both a title and content".to_string(),
            ));
        }
        self.send_json(Method::POST, "/posts/", post).await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<(), ApiError> {
        self.action(Method::DELETE, &format!("/posts/{}", post_id), super::client::no_override)
            .await
    }

    /// Like a post. Liking an already-liked post is `Conflict(AlreadyLiked)`.
    pub async fn like(&self, post_id: i64) -> Result<(), ApiError> {
        self.action(Method::POST, &format!("/posts/{}/like", post_id), |status, body| {
            match status {
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT => Some(ApiError::conflict(
                    ConflictKind::AlreadyLiked,
                    status,
                    ApiError::detail_message(body),
                )),
                _ => None,
            }
        })
        .await
    }

    /// Remove a like. Unliking a post that is not liked is `Conflict(NotLiked)`.
    pub async fn unlike(&self, post_id: i64) -> Result<(), ApiError> {
        self.action(Method::POST, &format!("/posts/{}/unlike", post_id), |status, body| {
            let message = ApiError::detail_message(body);
            match status {
                StatusCode::BAD_REQUEST | StatusCode::CONFLICT => {
                    Some(ApiError::conflict(ConflictKind::NotLiked, status, message))
                }
                StatusCode::NOT_FOUND if message.to_lowercase().contains("not liked") => {
                    Some(ApiError::conflict(ConflictKind::NotLiked, status, message))
                }
                _ => None,
            }
        })
        .await
    }
}
