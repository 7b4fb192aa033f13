//! Variable Custom Resource Definition
//!
//! Defines a Kubernetes CRD for managing GitLab project CI/CD variables.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::references::{Reference, SecretKeySelector, Selector};
use crate::status::{DeletionPolicy, ResourceState};

/// Type of a GitLab CI/CD variable
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum VariableType {
    /// Exposed to jobs as an environment variable
    #[default]
    EnvVar,
    /// Written to a temporary file whose path is exposed to jobs
    File,
}

/// VariableSpec defines the desired state of a GitLab project variable
#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "projects.gitlab.microscaler.io",
    version = "v1alpha1",
    kind = "Variable",
    namespaced,
    status = "VariableStatus",
    printcolumn = r#"{"name":"Key", "type":"string", "jsonPath":".spec.forProvider.key"}"#,
    printcolumn = r#"{"name":"State", "type":"string", "jsonPath":".status.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct VariableSpec {
    /// Desired GitLab state of the variable
    pub for_provider: VariableParameters,

    /// What to do with the GitLab variable when this resource is deleted
    #[serde(default)]
    pub deletion_policy: DeletionPolicy,
}

/// Parameters of a GitLab project variable
///
/// Optional fields left unset are late-initialized from GitLab once the
/// variable has been observed, except for `value`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableParameters {
    /// ID or URL-encodable path of the project owning the variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Reference to a Project resource supplying the project ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id_ref: Option<Reference>,

    /// Selector for a Project resource supplying the project ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id_selector: Option<Selector>,

    /// Variable key; immutable once created
    pub key: String,

    /// Variable value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Secret key holding the variable value, used when `value` is unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_secret_ref: Option<SecretKeySelector>,

    /// `env_var` or `file` (GitLab defaults to `env_var`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_type: Option<VariableType>,

    /// Only expose the variable to protected branches and tags
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protected: Option<bool>,

    /// Mask the variable in job logs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked: Option<bool>,

    /// Environment scope (GitLab defaults to "*")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_scope: Option<String>,

    /// Treat the value as raw text, disabling variable expansion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<bool>,
}

/// Observed, non-secret attributes of the GitLab variable
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableObservation {
    /// Variable key
    pub key: String,
    /// Variable type reported by GitLab
    pub variable_type: VariableType,
    /// Protected flag reported by GitLab
    pub protected: bool,
    /// Masked flag reported by GitLab
    pub masked: bool,
    /// Environment scope reported by GitLab
    pub environment_scope: String,
    /// Raw flag reported by GitLab
    pub raw: bool,
}

/// VariableStatus defines the observed state of a GitLab project variable
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableStatus {
    /// Current state of the variable
    pub state: ResourceState,

    /// Attributes last observed in GitLab
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at_provider: Option<VariableObservation>,

    /// Error message if reconciliation failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Last reconciliation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reconciled: Option<chrono::DateTime<chrono::Utc>>,
}
