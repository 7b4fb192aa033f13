//! Test utilities for unit testing reconcilers
//!
//! This module provides helpers for creating test data and setting up test scenarios.

use crds::*;
use gitlab_client::{ProjectVariable, VariableTypeValue};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

/// Helper to create desired parameters for project "42"
pub fn create_test_parameters(key: &str, value: Option<&str>) -> VariableParameters {
    VariableParameters {
        project_id: Some("42".to_string()),
        key: key.to_string(),
        value: value.map(|v| v.to_string()),
        ..Default::default()
    }
}

/// Helper to create test Variable CRD
pub fn create_test_variable(name: &str, namespace: &str, for_provider: VariableParameters) -> Variable {
    Variable {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        spec: VariableSpec {
            for_provider,
            deletion_policy: DeletionPolicy::Delete,
        },
        status: None,
    }
}

/// Helper to create a GitLab variable as the API would return it
pub fn create_test_project_variable(key: &str, value: &str, scope: &str) -> ProjectVariable {
    ProjectVariable {
        key: key.to_string(),
        value: value.to_string(),
        variable_type: VariableTypeValue::EnvVar,
        protected: false,
        masked: false,
        raw: false,
        environment_scope: scope.to_string(),
        description: None,
    }
}
