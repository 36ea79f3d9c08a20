//! Local feed state driven by confirmed server responses.
//!
//! `Timeline` holds the posts a view is showing and applies likes and
//! comments through the API. Counters move only after the backend accepts
//! the change, and a second trigger on the same post while the first is
//! pending is suppressed rather than sent.

use std::sync::{Mutex, MutexGuard};

use tracing::debug;

use crate::api::{ApiClient, ApiError, ConflictKind};
use crate::inflight::{Action, ActionKey, InFlight};
use crate::models::{Comment, NewPost, Page, Post, PostWithCounts};

/// How a guarded action ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Applied(T),
    /// An identical action on the same target was still pending.
    Suppressed,
}

impl<T> Outcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }
}

pub struct Timeline {
    api: ApiClient,
    posts: Mutex<Vec<PostWithCounts>>,
    inflight: InFlight,
}

impl Timeline {
    pub fn new(api: ApiClient) -> Self {
        Self::with_posts(api, Vec::new())
    }

    pub fn with_posts(api: ApiClient, posts: Vec<PostWithCounts>) -> Self {
        Self {
            api,
            posts: Mutex::new(posts),
            inflight: InFlight::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<PostWithCounts>> {
        self.posts.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn posts(&self) -> Vec<PostWithCounts> {
        self.lock().clone()
    }

    pub fn post(&self, post_id: i64) -> Option<PostWithCounts> {
        self.lock().iter().find(|p| p.id == post_id).cloned()
    }

    fn update(&self, post_id: i64, f: impl FnOnce(&mut PostWithCounts)) {
        if let Some(post) = self.lock().iter_mut().find(|p| p.id == post_id) {
            f(post);
        }
    }

    /// Replace the list with a fresh page from the backend.
    pub async fn refresh(&self, page: Page) -> Result<usize, ApiError> {
        let posts = self.api.feed(page).await?;
        let count = posts.len();
        *self.lock() = posts;
        Ok(count)
    }

    /// Append the next page after the posts already held.
    pub async fn load_more(&self, limit: u32) -> Result<usize, ApiError> {
        let skip = u32::try_from(self.lock().len()).unwrap_or(u32::MAX);
        let posts = self.api.feed(Page { skip, limit }).await?;
        let count = posts.len();
        let mut held = self.lock();
        for post in posts {
            if !held.iter().any(|p| p.id == post.id) {
                held.push(post);
            }
        }
        Ok(count)
    }

    pub async fn like(&self, post_id: i64) -> Result<Outcome, ApiError> {
        self.set_liked(post_id, true).await
    }

    pub async fn unlike(&self, post_id: i64) -> Result<Outcome, ApiError> {
        self.set_liked(post_id, false).await
    }

    /// Flip the like state of a post as currently shown.
    pub async fn toggle_like(&self, post_id: i64) -> Result<Outcome, ApiError> {
        let liked = self
            .post(post_id)
            .map(|p| p.is_liked_by_current_user)
            .ok_or_else(|| ApiError::NotFound(format!("post {} is not in this timeline", post_id)))?;
        self.set_liked(post_id, !liked).await
    }

    async fn set_liked(&self, post_id: i64, liked: bool) -> Result<Outcome, ApiError> {
        let Some(_ticket) = self.inflight.try_begin(ActionKey::new(Action::Like, post_id)) else {
            return Ok(Outcome::Suppressed);
        };

        let result = if liked {
            self.api.like(post_id).await
        } else {
            self.api.unlike(post_id).await
        };

        match result {
            Ok(()) => {
                self.update(post_id, |post| {
                    if liked {
                        post.likes_count += 1;
                    } else {
                        post.likes_count = post.likes_count.saturating_sub(1);
                    }
                    post.is_liked_by_current_user = liked;
                });
                Ok(Outcome::Applied(()))
            }
            Err(e) => {
                // The server already holds the requested state; align the flag only.
                match e.conflict_kind() {
                    Some(ConflictKind::AlreadyLiked) => {
                        self.update(post_id, |post| post.is_liked_by_current_user = true)
                    }
                    Some(ConflictKind::NotLiked) => {
                        self.update(post_id, |post| post.is_liked_by_current_user = false)
                    }
                    _ => {}
                }
                debug!(post_id, error = %e, "Like change rejected");
                Err(e)
            }
        }
    }

    pub async fn add_comment(&self, post_id: i64, content: &str) -> Result<Outcome<Comment>, ApiError> {
        let Some(_ticket) = self.inflight.try_begin(ActionKey::new(Action::Comment, post_id)) else {
            return Ok(Outcome::Suppressed);
        };
        let comment = self.api.add_comment(post_id, content).await?;
        self.update(post_id, |post| post.comments_count += 1);
        Ok(Outcome::Applied(comment))
    }

    pub async fn create_post(&self, post: &NewPost) -> Result<Post, ApiError> {
        self.api.create_post(post).await
    }

    pub async fn delete_post(&self, post_id: i64) -> Result<Outcome, ApiError> {
        let Some(_ticket) = self.inflight.try_begin(ActionKey::new(Action::DeletePost, post_id)) else {
            return Ok(Outcome::Suppressed);
        };
        self.api.delete_post(post_id).await?;
        self.lock().retain(|p| p.id != post_id);
        Ok(Outcome::Applied(()))
    }

    pub fn is_pending(&self, action: Action, post_id: i64) -> bool {
        self.inflight.is_pending(ActionKey::new(action, post_id))
    }
}
