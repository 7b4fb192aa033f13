//! GitLab project-scoped resources

pub mod variable;

pub use variable::*;
