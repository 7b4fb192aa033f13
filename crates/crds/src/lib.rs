//! GitLab Provider CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the GitLab controller.

pub mod projects;
pub mod references;
pub mod status;

pub use projects::*;
pub use references::*;
pub use status::*;
