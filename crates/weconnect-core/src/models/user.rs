use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::post::Post;

/// Account as returned by registration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(with = "super::timestamp")]
    #[cfg_attr(feature = "ts", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// Registration payload. Never retained after the request is sent.
#[derive(Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Entry in the people directory (`GET /users/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub followers_count: u32,
    pub is_following: bool,
}

/// The logged-in user's own profile (`GET /users/me`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct MyProfile {
    pub id: i64,
    pub username: String,
    pub followers_count: u32,
    pub following_count: u32,
}

/// Another user's profile with their posts (`GET /users/{id}/profile`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub followers_count: u32,
    pub following_count: u32,
    pub is_following: bool,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl UserSummary {
    pub fn display_followers(&self) -> String {
        match self.followers_count {
            1 => "1 follower".to_string(),
            n => format!("{} followers", n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_profile_with_posts() {
        let json = r#"{"id": 7, "username": "alice", "followers_count": 3, "following_count": 1,
            "is_following": true,
            "posts": [{"id": 1, "title": "Hi", "content": "First", "timestamp": "2024-03-01T09:00:00", "owner_id": 7}]}"#;

        let profile: UserProfile = serde_json::from_str(json).expect("profile should parse");
        assert_eq!(profile.username, "alice");
        assert!(profile.is_following);
        assert_eq!(profile.posts.len(), 1);
        assert_eq!(profile.posts[0].owner_id, 7);
    }

    #[test]
    fn test_new_user_debug_hides_password() {
        let new_user = NewUser {
            username: "bob".to_string(),
            email: "bob@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        let debug = format!("{:?}", new_user);
        assert!(debug.contains("bob@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_display_followers() {
        let mut summary = UserSummary {
            id: 1,
            username: "carol".to_string(),
            followers_count: 1,
            is_following: false,
        };
        assert_eq!(summary.display_followers(), "1 follower");
        summary.followers_count = 4;
        assert_eq!(summary.display_followers(), "4 followers");
    }
}
