use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Server-state conflicts for toggle-style actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    AlreadyLiked,
    NotLiked,
    AlreadyFollowing,
    NotFollowing,
    SelfFollow,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            ConflictKind::AlreadyLiked => "AlreadyLiked",
            ConflictKind::NotLiked => "NotLiked",
            ConflictKind::AlreadyFollowing => "AlreadyFollowing",
            ConflictKind::NotFollowing => "NotFollowing",
            ConflictKind::SelfFollow => "SelfFollow",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Conflict: {kind} ({message})")]
    Conflict {
        kind: ConflictKind,
        status: u16,
        message: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unauthorized - session may have expired")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Rate limited - please wait before retrying")]
    RateLimited,

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Fieldless view of `ApiError` for callers that branch on the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    AuthenticationFailed,
    ValidationFailed,
    Conflict(ConflictKind),
    NotFound,
    Unauthorized,
    Forbidden,
    RateLimited,
    Server,
    Rejected,
    InvalidResponse,
    Config,
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Validation(Vec<ValidationItem>),
}

#[derive(Deserialize)]
struct ValidationItem {
    msg: String,
}

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    /// Human-readable reason from a FastAPI error body, falling back to the raw body.
    pub fn detail_message(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                detail: Detail::Message(message),
            }) => message,
            Ok(ErrorBody {
                detail: Detail::Validation(items),
            }) => items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
            Err(_) => Self::truncate_body(body.trim()),
        }
    }

    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = Self::detail_message(body);
        match status.as_u16() {
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden(message),
            404 => ApiError::NotFound(message),
            429 => ApiError::RateLimited,
            code @ 500..=599 => ApiError::Server {
                status: code,
                message,
            },
            code => ApiError::Rejected {
                status: code,
                message,
            },
        }
    }

    pub fn conflict(kind: ConflictKind, status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Conflict {
            kind,
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            ApiError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            ApiError::Conflict { kind, .. } => ErrorKind::Conflict(*kind),
            ApiError::NotFound(_) => ErrorKind::NotFound,
            ApiError::Unauthorized => ErrorKind::Unauthorized,
            ApiError::Forbidden(_) => ErrorKind::Forbidden,
            ApiError::RateLimited => ErrorKind::RateLimited,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Rejected { .. } => ErrorKind::Rejected,
            ApiError::InvalidResponse(_) => ErrorKind::InvalidResponse,
            ApiError::Config(_) => ErrorKind::Config,
        }
    }

    /// HTTP status of the rejecting response, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized => Some(401),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::RateLimited => Some(429),
            ApiError::Server { status, .. }
            | ApiError::Rejected { status, .. }
            | ApiError::Conflict { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            ApiError::Conflict { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_message_variants() {
        assert_eq!(
            ApiError::detail_message(r#"{"detail": "Post already liked"}"#),
            "Post already liked"
        );
        assert_eq!(
            ApiError::detail_message(
                r#"{"detail": [{"loc": ["body", "email"], "msg": "field required", "type": "value_error.missing"},
                               {"loc": ["body", "password"], "msg": "field required", "type": "value_error.missing"}]}"#
            ),
            "field required; field required"
        );
        assert_eq!(ApiError::detail_message("  Bad Gateway \n"), "Bad Gateway");
    }

    #[test]
    fn test_truncate_body() {
        let long = "x".repeat(MAX_ERROR_BODY_LENGTH + 20);
        let truncated = ApiError::truncate_body(&long);
        assert!(truncated.starts_with(&"x".repeat(MAX_ERROR_BODY_LENGTH)));
        assert!(truncated.contains("truncated, 520 total bytes"));

        // Multi-byte characters straddling the limit must not panic
        let wide = format!("a{}", "é".repeat(MAX_ERROR_BODY_LENGTH));
        assert!(ApiError::truncate_body(&wide).contains("truncated"));
    }

    #[test]
    fn test_from_status_mapping() {
        let body = r#"{"detail": "nope"}"#;
        assert!(ApiError::from_status(StatusCode::UNAUTHORIZED, body).is_unauthorized());
        assert_eq!(ApiError::from_status(StatusCode::FORBIDDEN, body).kind(), ErrorKind::Forbidden);
        assert_eq!(ApiError::from_status(StatusCode::NOT_FOUND, body).kind(), ErrorKind::NotFound);
        assert_eq!(ApiError::from_status(StatusCode::TOO_MANY_REQUESTS, body).kind(), ErrorKind::RateLimited);

        let server = ApiError::from_status(StatusCode::BAD_GATEWAY, body);
        assert_eq!(server.kind(), ErrorKind::Server);
        assert_eq!(server.status(), Some(502));

        let rejected = ApiError::from_status(StatusCode::BAD_REQUEST, body);
        assert_eq!(rejected.status(), Some(400));
        assert_eq!(rejected.to_string(), "Request rejected (400): nope");
    }

    #[test]
    fn test_conflict_kind_accessor() {
        let err = ApiError::conflict(ConflictKind::AlreadyLiked, StatusCode::BAD_REQUEST, "Post already liked");
        assert_eq!(err.kind(), ErrorKind::Conflict(ConflictKind::AlreadyLiked));
        assert_eq!(err.conflict_kind(), Some(ConflictKind::AlreadyLiked));
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.to_string(), "Conflict: AlreadyLiked (Post already liked)");
        assert_eq!(ApiError::Unauthorized.conflict_kind(), None);
    }
}
