//! Mock GitLab client for unit testing
//!
//! This module provides an in-memory implementation of `VariableClientTrait`
//! that reproduces the GitLab behaviours reconcilers depend on, without
//! requiring a running GitLab instance:
//! - missing variables answer `404 Variable Not Found`
//! - an unfiltered lookup matching several scopes answers `409`
//! - creating, or moving a variable onto, an existing key/scope pair answers
//!   `400 ... has already been taken`

use crate::error::GitLabError;
use crate::models::*;
use crate::variable_trait::VariableClientTrait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// (project, key, environment scope)
type VariableId = (String, String, String);

/// Per-operation call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub remove: usize,
}

/// Mock GitLab client for testing
#[derive(Clone)]
pub struct MockGitLabClient {
    base_url: String,
    variables: Arc<Mutex<HashMap<VariableId, ProjectVariable>>>,
    calls: Arc<Mutex<CallCounts>>,
    fail_next: Arc<Mutex<Option<GitLabError>>>,
}

impl MockGitLabClient {
    /// Create a new mock client
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            variables: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(CallCounts::default())),
            fail_next: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a variable to the mock store (for test setup)
    pub fn add_variable(&self, pid: &str, variable: ProjectVariable) {
        let id = (pid.to_string(), variable.key.clone(), variable.environment_scope.clone());
        self.variables.lock().unwrap().insert(id, variable);
    }

    /// Look up a stored variable by its full identity (for assertions)
    pub fn stored_variable(&self, pid: &str, key: &str, scope: &str) -> Option<ProjectVariable> {
        let id = (pid.to_string(), key.to_string(), scope.to_string());
        self.variables.lock().unwrap().get(&id).cloned()
    }

    /// Number of variables stored for a project
    pub fn variable_count(&self, pid: &str) -> usize {
        self.variables
            .lock()
            .unwrap()
            .keys()
            .filter(|(p, _, _)| p == pid)
            .count()
    }

    /// Calls made so far
    pub fn calls(&self) -> CallCounts {
        *self.calls.lock().unwrap()
    }

    /// Make the next API call fail with `error`
    pub fn fail_next_call(&self, error: GitLabError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    fn take_failure(&self) -> Result<(), GitLabError> {
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn response_error(&self, method: &str, pid: &str, key: &str, status: u16, message: &str) -> GitLabError {
        GitLabError::Response {
            method: method.to_string(),
            url: format!("{}/api/v4/projects/{}/variables/{}", self.base_url, pid, key),
            status,
            message: message.to_string(),
        }
    }

    /// Resolve the single stored variable addressed by key and optional scope filter
    fn find(
        &self,
        method: &str,
        pid: &str,
        key: &str,
        filter: Option<&VariableFilter>,
    ) -> Result<VariableId, GitLabError> {
        let variables = self.variables.lock().unwrap();
        let mut matches: Vec<&VariableId> = variables
            .keys()
            .filter(|(p, k, scope)| {
                p == pid && k == key && filter.is_none_or(|f| &f.environment_scope == scope)
            })
            .collect();

        match matches.len() {
            0 => Err(self.response_error(method, pid, key, 404, "404 Variable Not Found")),
            1 => Ok(matches.remove(0).clone()),
            _ => Err(self.response_error(
                method,
                pid,
                key,
                409,
                "There are multiple variables with provided parameters. Please use 'filter[environment_scope]'",
            )),
        }
    }
}

#[async_trait::async_trait]
impl VariableClientTrait for MockGitLabClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn validate_token(&self) -> Result<(), GitLabError> {
        self.take_failure()
    }

    async fn list_variables(
        &self,
        pid: &str,
        options: &ListProjectVariablesOptions,
    ) -> Result<Vec<ProjectVariable>, GitLabError> {
        self.calls.lock().unwrap().list += 1;
        self.take_failure()?;

        let mut variables: Vec<ProjectVariable> = self
            .variables
            .lock()
            .unwrap()
            .iter()
            .filter(|((p, _, _), _)| p == pid)
            .map(|(_, v)| v.clone())
            .collect();
        variables.sort_by(|a, b| (&a.key, &a.environment_scope).cmp(&(&b.key, &b.environment_scope)));

        let per_page = options.per_page.unwrap_or(20) as usize;
        let page = options.page.unwrap_or(1).max(1) as usize;
        Ok(variables.into_iter().skip((page - 1) * per_page).take(per_page).collect())
    }

    async fn get_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&GetProjectVariableOptions>,
    ) -> Result<ProjectVariable, GitLabError> {
        self.calls.lock().unwrap().get += 1;
        self.take_failure()?;

        let id = self.find("GET", pid, key, options.and_then(|o| o.filter.as_ref()))?;
        Ok(self.variables.lock().unwrap()[&id].clone())
    }

    async fn create_variable(
        &self,
        pid: &str,
        options: &CreateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        self.calls.lock().unwrap().create += 1;
        self.take_failure()?;

        let variable = ProjectVariable {
            key: options.key.clone(),
            value: options.value.clone().unwrap_or_default(),
            variable_type: options.variable_type.unwrap_or_default(),
            protected: options.protected.unwrap_or(false),
            masked: options.masked.unwrap_or(false),
            raw: options.raw.unwrap_or(false),
            environment_scope: options
                .environment_scope
                .clone()
                .unwrap_or_else(|| DEFAULT_ENVIRONMENT_SCOPE.to_string()),
            description: None,
        };

        let id = (pid.to_string(), variable.key.clone(), variable.environment_scope.clone());
        let mut variables = self.variables.lock().unwrap();
        if variables.contains_key(&id) {
            return Err(GitLabError::Response {
                method: "POST".to_string(),
                url: format!("{}/api/v4/projects/{}/variables", self.base_url, pid),
                status: 400,
                message: format!(r#"{{"key":["({}) has already been taken"]}}"#, variable.key),
            });
        }
        variables.insert(id, variable.clone());
        Ok(variable)
    }

    async fn update_variable(
        &self,
        pid: &str,
        key: &str,
        options: &UpdateProjectVariableOptions,
    ) -> Result<ProjectVariable, GitLabError> {
        self.calls.lock().unwrap().update += 1;
        self.take_failure()?;

        let id = self.find("PUT", pid, key, options.filter.as_ref())?;
        let mut variables = self.variables.lock().unwrap();
        let Some(mut variable) = variables.get(&id).cloned() else {
            return Err(self.response_error("PUT", pid, key, 404, "404 Variable Not Found"));
        };

        if let Some(value) = &options.value {
            variable.value = value.clone();
        }
        if let Some(variable_type) = options.variable_type {
            variable.variable_type = variable_type;
        }
        if let Some(protected) = options.protected {
            variable.protected = protected;
        }
        if let Some(masked) = options.masked {
            variable.masked = masked;
        }
        if let Some(raw) = options.raw {
            variable.raw = raw;
        }
        if let Some(scope) = &options.environment_scope {
            variable.environment_scope = scope.clone();
        }

        let new_id = (pid.to_string(), variable.key.clone(), variable.environment_scope.clone());
        if new_id != id && variables.contains_key(&new_id) {
            return Err(GitLabError::Response {
                method: "PUT".to_string(),
                url: format!("{}/api/v4/projects/{}/variables/{}", self.base_url, pid, key),
                status: 400,
                message: format!(r#"{{"key":["({}) has already been taken"]}}"#, variable.key),
            });
        }
        variables.remove(&id);
        variables.insert(new_id, variable.clone());
        Ok(variable)
    }

    async fn remove_variable(
        &self,
        pid: &str,
        key: &str,
        options: Option<&RemoveProjectVariableOptions>,
    ) -> Result<(), GitLabError> {
        self.calls.lock().unwrap().remove += 1;
        self.take_failure()?;

        let id = self.find("DELETE", pid, key, options.and_then(|o| o.filter.as_ref()))?;
        self.variables.lock().unwrap().remove(&id);
        Ok(())
    }
}
