//! GitLab client errors

use thiserror::Error;

/// Errors that can occur when interacting with the GitLab API
#[derive(Debug, Error)]
pub enum GitLabError {
    /// Transport-level failure (connection, TLS, timeout, body decoding)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GitLab answered with a non-success status.
    ///
    /// The message is GitLab's own error text (e.g. "404 Variable Not Found"),
    /// kept verbatim so callers can classify it.
    #[error("{method} {url}: {status} {message}")]
    Response {
        method: String,
        url: String,
        status: u16,
        message: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Authentication failed (invalid or expired token)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid request (e.g., empty key or project ID)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl GitLabError {
    /// HTTP status code of a GitLab error response, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            GitLabError::Response { status, .. } => Some(*status),
            GitLabError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_display_keeps_gitlab_message() {
        let err = GitLabError::Response {
            method: "GET".to_string(),
            url: "https://gitlab.example.com/api/v4/projects/1/variables/FOO".to_string(),
            status: 404,
            message: "404 Variable Not Found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET https://gitlab.example.com/api/v4/projects/1/variables/FOO: 404 404 Variable Not Found"
        );
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_status_absent_for_local_errors() {
        assert_eq!(GitLabError::InvalidRequest("empty key".to_string()).status(), None);
    }
}
