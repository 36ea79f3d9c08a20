//! Data models for WeConnect backend payloads.
//!
//! - `User`, `UserSummary`, `MyProfile`, `UserProfile`: accounts and profiles
//! - `Post`, `PostWithCounts`: posts with and without engagement counters
//! - `Comment`: comments on posts
//! - `AccessToken`: the login response

pub mod comment;
pub mod post;
pub mod timestamp;
pub mod user;

use serde::Deserialize;

pub use comment::{Comment, NewComment};
pub use post::{NewPost, Page, Post, PostWithCounts};
pub use user::{MyProfile, NewUser, User, UserProfile, UserSummary};

/// Body of a successful `POST /token`.
#[derive(Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}
