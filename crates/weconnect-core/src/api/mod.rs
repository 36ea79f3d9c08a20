//! REST API client module for the WeConnect backend.
//!
//! `ApiClient` wraps a configured HTTP client around an injected
//! `TokenStore`. Operations are grouped by resource:
//! - `auth`: login, register, logout
//! - `posts`: feed, posts, likes
//! - `comments`: comments on posts
//! - `users`: directory, profiles, follows, account deletion

mod auth;
pub mod client;
mod comments;
pub mod error;
mod posts;
mod users;

pub use client::ApiClient;
pub use error::{ApiError, ConflictKind, ErrorKind};
