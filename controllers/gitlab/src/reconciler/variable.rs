//! Variable reconciler
//!
//! Keeps a GitLab project variable in line with its `Variable` resource:
//! get → create when missing → late-initialize → update when drifted, plus
//! finalizer-guarded removal on deletion.

use super::{Reconciler, resource_key};
use crate::error::ControllerError;
use crate::variable_helpers::{
    from_variable_type_value, generate_create_variable_options, generate_get_variable_options,
    generate_remove_variable_options, generate_update_variable_options, is_error_variable_not_found,
    is_variable_up_to_date, late_initialize_variable,
};
use crds::{DeletionPolicy, ResourceState, Variable, VariableObservation, VariableParameters, VariableStatus};
use gitlab_client::{GitLabError, ProjectVariable, VariableClientTrait};
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use kube::api::{Api, Patch, PatchParams};
use tracing::{debug, error, info, warn};

/// Finalizer guarding removal of the GitLab variable
pub const VARIABLE_FINALIZER: &str = "projects.gitlab.microscaler.io/finalizer";

/// What a sync did to the GitLab variable
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The variable was missing and has been created
    Created(ProjectVariable),
    /// The variable had drifted and has been updated
    Updated(ProjectVariable),
    /// Nothing to change
    UpToDate(ProjectVariable),
}

impl SyncOutcome {
    /// GitLab's view of the variable after the sync
    pub fn variable(&self) -> &ProjectVariable {
        match self {
            SyncOutcome::Created(v) | SyncOutcome::Updated(v) | SyncOutcome::UpToDate(v) => v,
        }
    }

    /// Resource state to report; an unchanged variable keeps its last success state
    pub fn state(&self, previous: Option<ResourceState>) -> ResourceState {
        match self {
            SyncOutcome::Created(_) => ResourceState::Created,
            SyncOutcome::Updated(_) => ResourceState::Updated,
            SyncOutcome::UpToDate(_) => match previous {
                Some(state @ (ResourceState::Created | ResourceState::Updated)) => state,
                _ => ResourceState::Created,
            },
        }
    }
}

/// Bring the GitLab variable in line with `params`.
///
/// `params` is late-initialized in place from whatever GitLab reports, so the
/// caller can write the filled-in fields back to the resource.
pub async fn sync_variable(
    client: &dyn VariableClientTrait,
    pid: &str,
    params: &mut VariableParameters,
) -> Result<SyncOutcome, GitLabError> {
    let get_options = generate_get_variable_options(params);
    match client.get_variable(pid, &params.key, get_options.as_ref()).await {
        Ok(observed) => {
            late_initialize_variable(params, Some(&observed));
            if is_variable_up_to_date(Some(params), &observed) {
                debug!("Variable {} in project {} is up to date", params.key, pid);
                return Ok(SyncOutcome::UpToDate(observed));
            }

            info!("Updating variable {} in project {}", params.key, pid);
            let updated = client
                .update_variable(pid, &params.key, &generate_update_variable_options(params))
                .await?;
            Ok(SyncOutcome::Updated(updated))
        }
        Err(e) if is_error_variable_not_found(Some(&e)) => {
            info!("Creating variable {} in project {}", params.key, pid);
            let created = client
                .create_variable(pid, &generate_create_variable_options(params))
                .await?;
            late_initialize_variable(params, Some(&created));
            Ok(SyncOutcome::Created(created))
        }
        Err(e) => Err(e),
    }
}

/// Remove the GitLab variable described by `params`.
///
/// Returns `false` when GitLab no longer had it.
pub async fn remove_variable(
    client: &dyn VariableClientTrait,
    pid: &str,
    params: &VariableParameters,
) -> Result<bool, GitLabError> {
    let options = generate_remove_variable_options(params);
    match client.remove_variable(pid, &params.key, options.as_ref()).await {
        Ok(()) => Ok(true),
        Err(e) if is_error_variable_not_found(Some(&e)) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Non-secret view of a GitLab variable for `status.atProvider`
pub fn observation(variable: &ProjectVariable) -> VariableObservation {
    VariableObservation {
        key: variable.key.clone(),
        variable_type: from_variable_type_value(variable.variable_type),
        protected: variable.protected,
        masked: variable.masked,
        environment_scope: variable.environment_scope.clone(),
        raw: variable.raw,
    }
}

/// Merge patch writing late-initialized fields back to `spec.forProvider`.
///
/// Only fields that went from unset to set are included. `value` never is,
/// since it may hold a resolved Secret.
pub fn late_init_patch(before: &VariableParameters, after: &VariableParameters) -> Option<serde_json::Value> {
    let mut fields = serde_json::Map::new();

    if before.variable_type.is_none()
        && let Some(variable_type) = after.variable_type
    {
        fields.insert("variableType".to_string(), serde_json::json!(variable_type));
    }
    if before.protected.is_none()
        && let Some(protected) = after.protected
    {
        fields.insert("protected".to_string(), protected.into());
    }
    if before.masked.is_none()
        && let Some(masked) = after.masked
    {
        fields.insert("masked".to_string(), masked.into());
    }
    if before.environment_scope.is_none()
        && let Some(scope) = &after.environment_scope
    {
        fields.insert("environmentScope".to_string(), scope.clone().into());
    }
    if before.raw.is_none()
        && let Some(raw) = after.raw
    {
        fields.insert("raw".to_string(), raw.into());
    }

    if fields.is_empty() {
        return None;
    }
    Some(serde_json::json!({ "spec": { "forProvider": fields } }))
}

/// Check if the status differs from what this reconcile would write
pub fn status_needs_update(
    current: Option<&VariableStatus>,
    state: ResourceState,
    at_provider: Option<&VariableObservation>,
    error: Option<&str>,
) -> bool {
    let Some(current) = current else {
        return true;
    };
    current.state != state || current.error.as_deref() != error || current.at_provider.as_ref() != at_provider
}

/// Check whether the resource still carries the variable finalizer
pub fn has_finalizer(variable: &Variable) -> bool {
    variable.finalizers().iter().any(|f| f == VARIABLE_FINALIZER)
}

/// Read `key` from a Secret, looking at `data` first and then `stringData`
pub fn secret_value(secret: &Secret, key: &str) -> Option<String> {
    if let Some(bytes) = secret.data.as_ref().and_then(|data| data.get(key)) {
        return String::from_utf8(bytes.0.clone()).ok();
    }
    secret.string_data.as_ref().and_then(|data| data.get(key)).cloned()
}

impl Reconciler {
    /// Reconciles a Variable resource.
    pub async fn reconcile_variable(&self, variable: &Variable) -> Result<(), ControllerError> {
        let name = variable
            .metadata
            .name
            .as_deref()
            .ok_or_else(|| ControllerError::InvalidConfig("Variable missing name".to_string()))?;
        let namespace = variable.namespace().unwrap_or_else(|| "default".to_string());
        let api: Api<Variable> = Api::namespaced(self.kube_client.clone(), &namespace);

        if variable.metadata.deletion_timestamp.is_some() {
            return self.finalize_variable(&api, variable, name, &namespace).await;
        }

        info!("Reconciling Variable {}/{}", namespace, name);

        self.ensure_finalizer(&api, variable, name).await?;

        match self.apply_variable(&api, variable, name, &namespace).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.update_status_error(&api, variable, name, &namespace, e.to_string()).await;
                Err(e)
            }
        }
    }

    async fn apply_variable(
        &self,
        api: &Api<Variable>,
        variable: &Variable,
        name: &str,
        namespace: &str,
    ) -> Result<(), ControllerError> {
        let mut params = variable.spec.for_provider.clone();
        self.resolve_value(&mut params, namespace).await?;

        let pid = params
            .project_id
            .clone()
            .ok_or_else(|| ControllerError::MissingProjectId(resource_key(namespace, name)))?;

        let before = params.clone();
        let outcome = sync_variable(self.gitlab_client.as_ref(), &pid, &mut params).await?;
        match &outcome {
            SyncOutcome::Created(_) => self.metrics.operation("create"),
            SyncOutcome::Updated(_) => self.metrics.operation("update"),
            SyncOutcome::UpToDate(_) => {}
        }

        if let Some(patch) = late_init_patch(&before, &params) {
            debug!("Late-initializing Variable {}/{}: {}", namespace, name, patch);
            api.patch(name, &PatchParams::default(), &Patch::Merge(&patch)).await?;
        }

        let current = variable.status.as_ref();
        let state = outcome.state(current.map(|s| s.state));
        let observed = observation(outcome.variable());

        if status_needs_update(current, state, Some(&observed), None) {
            let status_patch = Self::create_variable_status_patch(state, Some(&observed), None);
            api.patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch))
                .await?;
            info!("Variable {}/{} is {}", namespace, name, state.as_str());
        } else {
            debug!("Variable {}/{} already has correct status, skipping update", namespace, name);
        }

        Ok(())
    }

    /// Fill `value` from `valueSecretRef` when no inline value is given
    async fn resolve_value(&self, params: &mut VariableParameters, namespace: &str) -> Result<(), ControllerError> {
        if params.value.is_some() {
            return Ok(());
        }
        let Some(selector) = params.value_secret_ref.as_ref() else {
            return Ok(());
        };

        let secret_namespace = selector.namespace.as_deref().unwrap_or(namespace);
        let secrets: Api<Secret> = Api::namespaced(self.kube_client.clone(), secret_namespace);
        let secret = secrets.get_opt(&selector.name).await?.ok_or_else(|| {
            ControllerError::SecretResolution(format!("Secret {}/{} not found", secret_namespace, selector.name))
        })?;

        let value = secret_value(&secret, &selector.key).ok_or_else(|| {
            ControllerError::SecretResolution(format!(
                "Secret {}/{} has no UTF-8 key '{}'",
                secret_namespace, selector.name, selector.key
            ))
        })?;
        params.value = Some(value);
        Ok(())
    }

    async fn ensure_finalizer(&self, api: &Api<Variable>, variable: &Variable, name: &str) -> Result<(), ControllerError> {
        if has_finalizer(variable) {
            return Ok(());
        }
        let mut finalizers = variable.finalizers().to_vec();
        finalizers.push(VARIABLE_FINALIZER.to_string());
        let patch = serde_json::json!({ "metadata": { "finalizers": finalizers } });
        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch)).await?;
        debug!("Added finalizer to Variable {}", name);
        Ok(())
    }

    async fn finalize_variable(
        &self,
        api: &Api<Variable>,
        variable: &Variable,
        name: &str,
        namespace: &str,
    ) -> Result<(), ControllerError> {
        if !has_finalizer(variable) {
            return Ok(());
        }

        let params = &variable.spec.for_provider;
        if variable.spec.deletion_policy == DeletionPolicy::Orphan {
            info!("Variable {}/{} is orphaned, leaving {} in GitLab", namespace, name, params.key);
        } else if let Some(pid) = params.project_id.as_deref() {
            if remove_variable(self.gitlab_client.as_ref(), pid, params).await? {
                self.metrics.operation("remove");
                info!("Removed variable {} from project {}", params.key, pid);
            } else {
                debug!("Variable {} already absent from project {}", params.key, pid);
            }
        } else {
            warn!("Variable {}/{} has no projectId, nothing to remove", namespace, name);
        }

        let finalizers: Vec<String> = variable
            .finalizers()
            .iter()
            .filter(|f| f.as_str() != VARIABLE_FINALIZER)
            .cloned()
            .collect();
        let patch = serde_json::json!({ "metadata": { "finalizers": finalizers } });
        api.patch(name, &PatchParams::default(), &Patch::Merge(&patch)).await?;
        info!("Released Variable {}/{}", namespace, name);
        Ok(())
    }

    async fn update_status_error(
        &self,
        api: &Api<Variable>,
        variable: &Variable,
        name: &str,
        namespace: &str,
        error_msg: String,
    ) {
        let current = variable.status.as_ref();
        let at_provider = current.and_then(|s| s.at_provider.as_ref());
        if !status_needs_update(current, ResourceState::Failed, at_provider, Some(&error_msg)) {
            debug!("Variable {}/{} already has this error in status, skipping update", namespace, name);
            return;
        }

        let status_patch = Self::create_variable_status_patch(ResourceState::Failed, at_provider, Some(error_msg));
        if let Err(e) = api.patch_status(name, &PatchParams::default(), &Patch::Merge(&status_patch)).await {
            error!("Failed to update Variable {}/{} error status: {}", namespace, name, e);
        }
    }
}
