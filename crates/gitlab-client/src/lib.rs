//! GitLab REST API Client
//!
//! A Rust client library for the GitLab project-level CI/CD variables API.
//! Provides type-safe models, request option types and a mockable trait.
//!
//! # Example
//!
//! ```no_run
//! use gitlab_client::{GitLabClient, CreateProjectVariableOptions, GetProjectVariableOptions, VariableFilter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = GitLabClient::new(
//!     "https://gitlab.example.com".to_string(),
//!     "your-api-token".to_string(),
//! )?;
//!
//! // Create a variable scoped to production
//! let options = CreateProjectVariableOptions {
//!     key: "DATABASE_URL".to_string(),
//!     value: Some("postgres://db".to_string()),
//!     environment_scope: Some("production".to_string()),
//!     ..Default::default()
//! };
//! client.create_variable("group/app", &options).await?;
//!
//! // Read it back, narrowing the lookup to the same scope
//! let get = GetProjectVariableOptions {
//!     filter: Some(VariableFilter { environment_scope: "production".to_string() }),
//! };
//! let variable = client.get_variable("group/app", "DATABASE_URL", Some(&get)).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod common;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod variable_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::GitLabClient;
pub use common::HttpClient;
pub use error::GitLabError;
pub use models::*;
pub use variable_trait::VariableClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::{CallCounts, MockGitLabClient};
