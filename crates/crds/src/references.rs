//! Cross-resource references and selectors
//!
//! These types let a managed resource point at another Kubernetes object
//! (by name or by label selector) or at a key inside a Secret. They are
//! structural bookkeeping: the controller never treats them as part of the
//! value it pushes to GitLab.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether resolution of a reference is required or optional
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum ResolutionPolicy {
    /// Fail when the reference cannot be resolved
    #[default]
    Required,
    /// Carry on without the referenced value
    Optional,
}

/// When a reference should be resolved
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Resolve only while the referencing field is still empty
    #[default]
    IfNotPresent,
    /// Resolve on every reconciliation
    Always,
}

/// Resolution policy shared by references and selectors
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    /// When to resolve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolve: Option<ResolvePolicy>,

    /// Whether resolution may fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionPolicy>,
}

/// Reference to another resource by name (same namespace as the referrer)
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Reference {
    /// Name of the referenced object
    pub name: String,

    /// Resolution policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
}

impl Reference {
    /// Reference a resource by name with the default policy
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy: None,
        }
    }
}

/// Selects a referenced resource by labels
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    /// Labels the referenced object must carry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,

    /// Only select objects sharing the referrer's controller reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_controller: Option<bool>,

    /// Resolution policy
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<Policy>,
}

/// Reference to a single key of a Kubernetes Secret
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Secret name
    pub name: String,

    /// Secret namespace (defaults to the namespace of the referencing resource)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    /// Key within the Secret's data
    pub key: String,
}

impl SecretKeySelector {
    /// Select `key` from the Secret `name`
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            key: key.into(),
        }
    }
}
