//! GitLab Controller
//!
//! Manages GitLab project CI/CD variables from `Variable` custom resources:
//! creates missing variables, corrects drift, backfills unset spec fields
//! from GitLab, and removes the variable when the resource is deleted.

mod backoff;
mod config;
mod controller;
mod error;
mod metrics;
mod reconciler;
mod server;
mod variable_helpers;
mod watcher;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod variable_helpers_test;

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use controller::Controller;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ControllerError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting GitLab Controller");

    let config = ControllerConfig::from_env()?;

    info!("Configuration:");
    info!("  GitLab URL: {}", config.gitlab_url);
    info!("  Namespace: {}", config.namespace.as_deref().unwrap_or("all namespaces"));
    info!("  Probe address: {}", config.probe_addr);

    let controller = Controller::new(config).await?;
    controller.run().await
}
