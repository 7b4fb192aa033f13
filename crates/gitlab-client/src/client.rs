//! GitLab API client
//!
//! Implements the project-level CI/CD variables API:
//! `/api/v4/projects/:id/variables` and `/api/v4/projects/:id/variables/:key`.

use crate::common::{HttpClient, encode_segment};
use crate::error::GitLabError;
use crate::models::*;
use crate::variable_trait::VariableClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// GitLab API client
#[derive(Clone)]
pub struct GitLabClient {
    http: HttpClient,
}

impl GitLabClient {
    /// Create a new GitLab client
    ///
    /// # Arguments
    /// * `base_url` - GitLab base URL (e.g., "https://gitlab.com")
    /// * `token` - Personal, project or group access token with `api` scope
    pub fn new(base_url: String, token: String) -> Result<Self, GitLabError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            http: HttpClient::new(client, base_url, token),
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        self.http.base_url()
    }

    /// Validate the API token by fetching the current user.
    ///
    /// # Returns
    /// * `Ok(())` - Token is valid and GitLab is reachable
    /// * `Err(GitLabError::Authentication)` - GitLab rejected the token
    pub async fn validate_token(&self) -> Result<(), GitLabError> {
        debug!("Validating GitLab token and connectivity");
        match self.http.get::<CurrentUser>("/user", &[]).await {
            Ok(user) => {
                debug!("Token validated for user {} (ID: {})", user.username, user.id);
                Ok(())
            }
            Err(GitLabError::Response { status, message, .. }) if status == 401 || status == 403 => {
                Err(GitLabError::Authentication(format!("{} {}", status, message)))
            }
            Err(e) => Err(e),
        }
    }

    fn variables_path(pid: &str) -> Result<String, GitLabError> {
        if pid.is_empty() {
            return Err(GitLabError::InvalidRequest("project ID must not be empty".to_string()));
        }
        Ok(format!("/projects/{}/variables", encode_segment(pid)))
    }

    fn variable_path(pid: &str, key: &str) -> Result<String, GitLabError> {
        if key.is_empty() {
            return Err(GitLabError::InvalidRequest("variable key must not be empty".to_string()));
        }
        Ok(format!("{}/{}", Self::variables_path(pid)?, encode_segment(key)))
    }

    /// List the variables of a project (a single page, as selected by `options`)
    pub async fn list_variables(
        &self,
        pid: &str,
        options: &ListProjectVariablesOptions,
    ) -> Result<Vec<ProjectVariable>, GitLabError> {
        let path = Self::variables_path(pid)?;
        let pairs = options.query_pairs();
        let query: Vec<(&str, &str)> = pairs.iter().map(|(k, v)| (*k, v.as_str())).collect();
        self.http.get(&path, &query).await
    }

    /// Get a single variable, optionally narrowed to an environment scope
    pub async fn get_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&GetProjectVariableOptions>,
    ) -> Result<ProjectVariable, GitLabError> {
        let path = Self::variable_path(pid, key)?;
        let query = options
            .and_then(|o| o.filter.as_ref())
            .map(VariableFilter::query_pairs)
            .unwrap_or_default();
        self.http.get(&path, &query).await
    }

    /// Create a variable
    pub async fn create_variable(
        &self,
        pid: &str,
        options: &CreateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        if options.key.is_empty() {
            return Err(GitLabError::InvalidRequest("variable key must not be empty".to_string()));
        }
        let path = Self::variables_path(pid)?;
        self.http.post(&path, options).await
    }

    /// Update a variable; `options.filter` selects the scope to update
    pub async fn update_variable(
        &self,
        pid: &str,
        key: &str,
        options: &UpdateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        let path = Self::variable_path(pid, key)?;
        self.http.put(&path, options).await
    }

    /// Remove a variable, optionally narrowed to an environment scope
    pub async fn remove_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&RemoveProjectVariableOptions>,
    ) -> Result<(), GitLabError> {
        let path = Self::variable_path(pid, key)?;
        let query = options
            .and_then(|o| o.filter.as_ref())
            .map(VariableFilter::query_pairs)
            .unwrap_or_default();
        self.http.delete(&path, &query).await
    }
}

#[async_trait::async_trait]
impl VariableClientTrait for GitLabClient {
    fn base_url(&self) -> &str {
        GitLabClient::base_url(self)
    }

    async fn validate_token(&self) -> Result<(), GitLabError> {
        GitLabClient::validate_token(self).await
    }

    async fn list_variables(
        &self,
        pid: &str,
        options: &ListProjectVariablesOptions,
    ) -> Result<Vec<ProjectVariable>, GitLabError> {
        GitLabClient::list_variables(self, pid, options).await
    }

    async fn get_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&GetProjectVariableOptions>,
    ) -> Result<ProjectVariable, GitLabError> {
        GitLabClient::get_variable(self, pid, key, options).await
    }

    async fn create_variable(
        &self,
        pid: &str,
        options: &CreateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        GitLabClient::create_variable(self, pid, options).await
    }

    async fn update_variable(
        &self,
        pid: &str,
        key: &str,
        options: &UpdateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        GitLabClient::update_variable(self, pid, key, options).await
    }

    async fn remove_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&RemoveProjectVariableOptions>,
    ) -> Result<(), GitLabError> {
        GitLabClient::remove_variable(self, pid, key, options).await
    }
}
