//! Controller-specific error types.
//!
//! This module defines error types specific to the GitLab Controller
//! that are not covered by upstream library errors.

use gitlab_client::GitLabError;
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the GitLab Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// GitLab API error
    #[error("GitLab error: {0}")]
    GitLab(#[from] GitLabError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Variable has no project to live in
    #[error("Variable {0} has no projectId")]
    MissingProjectId(String),

    /// Value Secret missing or unreadable
    #[error("Failed to resolve variable value: {0}")]
    SecretResolution(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ControllerError {
    /// Short label used for metrics and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerError::Kube(_) => "kube",
            ControllerError::GitLab(_) => "gitlab",
            ControllerError::InvalidConfig(_) => "invalid_config",
            ControllerError::MissingProjectId(_) => "missing_project_id",
            ControllerError::SecretResolution(_) => "secret_resolution",
            ControllerError::Watch(_) => "watch",
        }
    }
}
