//! Shared status types for GitLab managed resources

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Resource reconciliation state
///
/// Serializes as PascalCase ("Created", "Failed", etc.) but deserializes
/// both PascalCase and lowercase ("created", "failed", etc.).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "PascalCase")]
pub enum ResourceState {
    /// Not reconciled yet
    #[default]
    #[serde(alias = "pending")]
    Pending,
    /// Created in GitLab by this controller
    #[serde(alias = "created")]
    Created,
    /// Brought back in line after drift
    #[serde(alias = "updated")]
    Updated,
    /// Last reconciliation failed
    #[serde(alias = "failed")]
    Failed,
}

impl ResourceState {
    /// Name as written to `status.state`
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceState::Pending => "Pending",
            ResourceState::Created => "Created",
            ResourceState::Updated => "Updated",
            ResourceState::Failed => "Failed",
        }
    }
}

/// What happens to the GitLab object when the Kubernetes resource is deleted
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum DeletionPolicy {
    /// Remove the object from GitLab
    #[default]
    Delete,
    /// Leave the object in GitLab
    Orphan,
}
