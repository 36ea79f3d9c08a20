//! Comment operations.

use reqwest::Method;

use crate::models::{Comment, NewComment};

use super::{ApiClient, ApiError};

fn comment_body(content: &str) -> Result<NewComment, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::ValidationFailed("comment cannot be empty".to_string()));
    }
    Ok(NewComment {
        content: content.to_string(),
    })
}

impl ApiClient {
    /// Comments on a post, oldest first.
    pub async fn comments(&self, post_id: i64) -> Result<Vec<Comment>, ApiError> {
        self.get(&format!("/comments/post/{}", post_id)).await
    }

    pub async fn add_comment(&self, post_id: i64, content: &str) -> Result<Comment, ApiError> {
        let body = comment_body(content)?;
        self.send_json(Method::POST, &format!("/comments/post/{}", post_id), &body)
            .await
    }

    /// Edit one of the caller's comments. The backend only allows this
    /// within ten minutes of posting and answers 403 afterwards.
    pub async fn update_comment(&self, comment_id: i64, content: &str) -> Result<Comment, ApiError> {
        let body = comment_body(content)?;
        self.send_json(Method::PUT, &format!("/comments/{}", comment_id), &body)
            .await
    }

    pub async fn delete_comment(&self, comment_id: i64) -> Result<(), ApiError> {
        self.action(
            Method::DELETE,
            &format!("/comments/{}", comment_id),
            super::client::no_override,
        )
        .await
    }
}
