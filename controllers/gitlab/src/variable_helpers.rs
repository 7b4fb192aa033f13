//! Translation between the `Variable` CRD and the GitLab variables API
//!
//! Everything here is pure: the reconciler fetches the observed
//! `ProjectVariable`, then uses these helpers to late-initialize the desired
//! parameters, decide whether an update is needed, and shape the request
//! options for get/create/update/remove.
//!
//! Expected call order per reconciliation: get → late-initialize →
//! up-to-date check → create/update.

use crds::{VariableParameters, VariableType};
use gitlab_client::{
    CreateProjectVariableOptions, GetProjectVariableOptions, ProjectVariable,
    RemoveProjectVariableOptions, UpdateProjectVariableOptions, VariableFilter, VariableTypeValue,
};
use std::fmt::Display;

/// Text GitLab answers with when a project variable does not exist
pub const ERR_VARIABLE_NOT_FOUND: &str = "404 Variable Not Found";

/// Check whether `err` is GitLab's "variable not found" error.
///
/// GitLab only distinguishes a missing variable from a missing project in the
/// error text, so this matches on the message. Keep it the only place that does.
pub fn is_error_variable_not_found<E: Display + ?Sized>(err: Option<&E>) -> bool {
    match err {
        Some(err) => err.to_string().contains(ERR_VARIABLE_NOT_FOUND),
        None => false,
    }
}

/// Map the CRD variable type onto the GitLab API enum
pub fn to_variable_type_value(variable_type: VariableType) -> VariableTypeValue {
    match variable_type {
        VariableType::EnvVar => VariableTypeValue::EnvVar,
        VariableType::File => VariableTypeValue::File,
    }
}

/// Map a GitLab API variable type onto the CRD enum
pub fn from_variable_type_value(variable_type: VariableTypeValue) -> VariableType {
    match variable_type {
        VariableTypeValue::EnvVar => VariableType::EnvVar,
        VariableTypeValue::File => VariableType::File,
    }
}

/// Fill the unset fields of `desired` with the values observed in GitLab.
///
/// Fields the user already set are never overwritten. `value` is left alone:
/// it is write-only from the controller's point of view.
pub fn late_initialize_variable(desired: &mut VariableParameters, observed: Option<&ProjectVariable>) {
    let Some(observed) = observed else {
        return;
    };

    if desired.variable_type.is_none() {
        desired.variable_type = Some(from_variable_type_value(observed.variable_type));
    }

    if desired.protected.is_none() {
        desired.protected = Some(observed.protected);
    }

    if desired.masked.is_none() {
        desired.masked = Some(observed.masked);
    }

    if desired.environment_scope.is_none() {
        desired.environment_scope = Some(observed.environment_scope.clone());
    }

    if desired.raw.is_none() {
        desired.raw = Some(observed.raw);
    }
}

/// Convert a GitLab project variable back into `VariableParameters`
pub fn variable_to_parameters(variable: &ProjectVariable) -> VariableParameters {
    VariableParameters {
        key: variable.key.clone(),
        value: Some(variable.value.clone()),
        variable_type: Some(from_variable_type_value(variable.variable_type)),
        protected: Some(variable.protected),
        masked: Some(variable.masked),
        environment_scope: Some(variable.environment_scope.clone()),
        raw: Some(variable.raw),
        ..Default::default()
    }
}

/// Build the create request body
pub fn generate_create_variable_options(p: &VariableParameters) -> CreateProjectVariableOptions {
    CreateProjectVariableOptions {
        key: p.key.clone(),
        value: p.value.clone(),
        variable_type: p.variable_type.map(to_variable_type_value),
        protected: p.protected,
        masked: p.masked,
        environment_scope: p.environment_scope.clone(),
        raw: p.raw,
    }
}

/// Build the update request body; the key travels in the path
pub fn generate_update_variable_options(p: &VariableParameters) -> UpdateProjectVariableOptions {
    UpdateProjectVariableOptions {
        value: p.value.clone(),
        variable_type: p.variable_type.map(to_variable_type_value),
        protected: p.protected,
        masked: p.masked,
        environment_scope: p.environment_scope.clone(),
        raw: p.raw,
        filter: generate_variable_filter(p),
    }
}

/// Get options, or `None` for GitLab's default (unfiltered) lookup
pub fn generate_get_variable_options(p: &VariableParameters) -> Option<GetProjectVariableOptions> {
    generate_variable_filter(p).map(|filter| GetProjectVariableOptions { filter: Some(filter) })
}

/// Remove options, or `None` for GitLab's default (unfiltered) removal
pub fn generate_remove_variable_options(p: &VariableParameters) -> Option<RemoveProjectVariableOptions> {
    generate_variable_filter(p).map(|filter| RemoveProjectVariableOptions { filter: Some(filter) })
}

/// Filter matching the parameters' environment scope, only when the user set one
pub fn generate_variable_filter(p: &VariableParameters) -> Option<VariableFilter> {
    p.environment_scope.as_ref().map(|scope| VariableFilter {
        environment_scope: scope.clone(),
    })
}

/// Desired and observed agree, with unset and empty/zero values equal.
fn equate_empty<T: PartialEq + Default + Clone>(desired: Option<&T>, observed: Option<&T>) -> bool {
    desired.cloned().unwrap_or_default() == observed.cloned().unwrap_or_default()
}

/// Check whether the variable in GitLab already matches the desired parameters.
///
/// Project identity (`project_id` and its reference/selector) and the value's
/// Secret reference are not part of a variable's value and are ignored.
/// An unset `value` matches anything, since it is never read back from GitLab;
/// every other unset field only matches the zero value.
pub fn is_variable_up_to_date(desired: Option<&VariableParameters>, observed: &ProjectVariable) -> bool {
    let Some(desired) = desired else {
        return true;
    };

    let observed = variable_to_parameters(observed);

    // Exhaustive on purpose: a new field must be compared or listed as ignored here.
    let VariableParameters {
        project_id: _,
        project_id_ref: _,
        project_id_selector: _,
        value_secret_ref: _,
        key,
        value,
        variable_type,
        protected,
        masked,
        environment_scope,
        raw,
    } = desired;

    *key == observed.key
        && (value.is_none() || equate_empty(value.as_ref(), observed.value.as_ref()))
        && equate_empty(variable_type.as_ref(), observed.variable_type.as_ref())
        && equate_empty(protected.as_ref(), observed.protected.as_ref())
        && equate_empty(masked.as_ref(), observed.masked.as_ref())
        && equate_empty(environment_scope.as_ref(), observed.environment_scope.as_ref())
        && equate_empty(raw.as_ref(), observed.raw.as_ref())
}
