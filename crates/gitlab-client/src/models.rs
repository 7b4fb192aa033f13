//! GitLab API models
//!
//! These models match the GitLab REST API for project-level CI/CD variables.
//! See: https://docs.gitlab.com/ee/api/project_level_variables.html

use serde::{Deserialize, Serialize};

/// Variable type as reported and accepted by GitLab
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableTypeValue {
    #[default]
    EnvVar,
    File,
}

impl VariableTypeValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableTypeValue::EnvVar => "env_var",
            VariableTypeValue::File => "file",
        }
    }
}

/// Project variable as returned by GitLab
///
/// Every field except `description` is always populated by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectVariable {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub variable_type: VariableTypeValue,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub masked: bool,
    #[serde(default)]
    pub raw: bool,
    #[serde(default = "default_environment_scope")]
    pub environment_scope: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// GitLab's default environment scope
pub const DEFAULT_ENVIRONMENT_SCOPE: &str = "*";

fn default_environment_scope() -> String {
    DEFAULT_ENVIRONMENT_SCOPE.to_string()
}

/// Narrows a request to the variable with a given environment scope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariableFilter {
    pub environment_scope: String,
}

impl VariableFilter {
    /// Query parameters carrying this filter on GET and DELETE requests
    pub fn query_pairs(&self) -> Vec<(&'static str, &str)> {
        vec![("filter[environment_scope]", self.environment_scope.as_str())]
    }
}

/// Options for listing project variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListProjectVariablesOptions {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl ListProjectVariablesOptions {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

/// Options for fetching a single project variable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetProjectVariableOptions {
    pub filter: Option<VariableFilter>,
}

/// Request body for creating a project variable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CreateProjectVariableOptions {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableTypeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
}

/// Request body for updating a project variable
///
/// The key is part of the request path, not the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct UpdateProjectVariableOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableTypeValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<VariableFilter>,
}

/// Options for removing a project variable
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveProjectVariableOptions {
    pub filter: Option<VariableFilter>,
}

/// Authenticated user, returned by the token validation endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: u64,
    pub username: String,
}
