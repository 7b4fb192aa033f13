//! Reconciliation logic for GitLab-related CRDs.
//!
//! - `variable`: project CI/CD variables (`Variable`)

pub mod variable;

use crate::backoff::BackoffTracker;
use crate::metrics::Metrics;
use crds::{ResourceState, VariableObservation};
use gitlab_client::VariableClientTrait;
use kube::Client;
use std::time::Duration;

/// Reconciles GitLab-related resources.
pub struct Reconciler {
    pub(crate) kube_client: Client,
    pub(crate) gitlab_client: Box<dyn VariableClientTrait>,
    pub(crate) metrics: Metrics,
    backoff: BackoffTracker,
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("gitlab_url", &self.gitlab_client.base_url())
            .finish_non_exhaustive()
    }
}

/// `namespace/name` key used for logging and backoff tracking
pub fn resource_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace, name)
}

impl Reconciler {
    /// Creates a new reconciler instance.
    pub fn new(kube_client: Client, gitlab_client: impl VariableClientTrait + 'static, metrics: Metrics) -> Self {
        Self {
            kube_client,
            gitlab_client: Box::new(gitlab_client),
            metrics,
            backoff: BackoffTracker::new(),
        }
    }

    /// Build a status merge patch.
    ///
    /// The state is written in PascalCase to match the CRD schema. The
    /// timestamp is only sent along with a real change; callers check
    /// `status_needs_update` first so unchanged reconciles don't patch at all.
    pub(crate) fn create_variable_status_patch(
        state: ResourceState,
        at_provider: Option<&VariableObservation>,
        error: Option<String>,
    ) -> serde_json::Value {
        let mut status = serde_json::json!({
            "state": state.as_str(),
            "error": error,
            "lastReconciled": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(at_provider) = at_provider {
            status["atProvider"] = serde_json::json!(at_provider);
        }
        serde_json::json!({ "status": status })
    }

    /// Record a failed reconcile; returns the requeue delay and the failure count
    pub fn backoff_for_failure(&self, resource_key: &str) -> (Duration, u32) {
        self.backoff.record_failure(resource_key)
    }

    /// Reset the backoff after a successful reconcile
    pub fn reset_backoff(&self, resource_key: &str) {
        self.backoff.reset(resource_key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::VariableType;

    #[test]
    fn test_status_patch_uses_pascal_case_state() {
        let patch = Reconciler::create_variable_status_patch(ResourceState::Failed, None, Some("boom".to_string()));
        assert_eq!(patch["status"]["state"], "Failed");
        assert_eq!(patch["status"]["error"], "boom");
        assert!(patch["status"].get("atProvider").is_none());
        assert!(patch["status"]["lastReconciled"].is_string());
    }

    #[test]
    fn test_status_patch_carries_observation() {
        let observed = VariableObservation {
            key: "FOO".to_string(),
            variable_type: VariableType::File,
            protected: true,
            masked: false,
            environment_scope: "*".to_string(),
            raw: false,
        };
        let patch = Reconciler::create_variable_status_patch(ResourceState::Created, Some(&observed), None);
        assert_eq!(patch["status"]["state"], "Created");
        assert!(patch["status"]["error"].is_null());
        assert_eq!(patch["status"]["atProvider"]["variableType"], "file");
        assert_eq!(patch["status"]["atProvider"]["environmentScope"], "*");
    }

    #[test]
    fn test_resource_key() {
        assert_eq!(resource_key("ci", "foo"), "ci/foo");
    }
}
