use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A post without engagement counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    pub owner_id: i64,
}

/// A feed entry: post plus author name, counters and the caller's like flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct PostWithCounts {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(with = "super::timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub timestamp: DateTime<Utc>,
    pub owner_id: i64,
    pub owner_username: String,
    pub likes_count: u32,
    pub comments_count: u32,
    #[serde(default)]
    pub retweets_count: u32,
    pub is_liked_by_current_user: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Offset pagination for list endpoints. Backend default is 10 per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 10 }
    }
}

impl Page {
    pub fn next(self) -> Self {
        Self {
            skip: self.skip.saturating_add(self.limit),
            limit: self.limit,
        }
    }

    pub(crate) fn query(&self) -> [(&'static str, u32); 2] {
        [("skip", self.skip), ("limit", self.limit)]
    }
}

impl PostWithCounts {
    pub fn display_likes(&self) -> String {
        match self.likes_count {
            1 => "1 like".to_string(),
            n => format!("{} likes", n),
        }
    }

    pub fn display_comments(&self) -> String {
        match self.comments_count {
            1 => "1 comment".to_string(),
            n => format!("{} comments", n),
        }
    }
}
