//! VariableClient trait for mocking
//!
//! This trait abstracts the GitLab project-variable service so reconcilers can
//! be unit tested. `GitLabClient` implements it against the REST API and
//! `MockGitLabClient` (feature `test-util`) implements it in memory.

use crate::error::GitLabError;
use crate::models::*;

/// GitLab project variable operations
///
/// `pid` is the project's numeric ID or its full path (e.g. `group/app`).
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait VariableClientTrait: Send + Sync {
    /// Get the base URL
    fn base_url(&self) -> &str;

    /// Validate the API token
    async fn validate_token(&self) -> Result<(), GitLabError>;

    async fn list_variables(
        &self,
        pid: &str,
        options: &ListProjectVariablesOptions,
    ) -> Result<Vec<ProjectVariable>, GitLabError>;

    async fn get_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&GetProjectVariableOptions>,
    ) -> Result<ProjectVariable, GitLabError>;

    async fn create_variable(
        &self,
        pid: &str,
        options: &CreateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError>;

    async fn update_variable(
        &self,
        pid: &str,
        key: &str,
        options: &UpdateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError>;

    async fn remove_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&RemoveProjectVariableOptions>,
    ) -> Result<(), GitLabError>;
}
