//! Main controller implementation.
//!
//! This module contains the `Controller` struct that wires the GitLab client,
//! the `Variable` watcher and the probe server together.

use crate::config::ControllerConfig;
use crate::error::ControllerError;
use crate::metrics::Metrics;
use crate::reconciler::Reconciler;
use crate::server::{ProbeState, serve_probes};
use crate::watcher::Watcher;
use crds::Variable;
use gitlab_client::GitLabClient;
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Main controller for GitLab resource management.
pub struct Controller {
    variable_watcher: JoinHandle<Result<(), ControllerError>>,
    probe_server: JoinHandle<Result<(), ControllerError>>,
}

impl std::fmt::Debug for Controller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller").finish_non_exhaustive()
    }
}

impl Controller {
    /// Creates a new controller instance.
    pub async fn new(config: ControllerConfig) -> Result<Self, ControllerError> {
        info!("Initializing GitLab Controller");

        let kube_client = Client::try_default().await?;

        let gitlab_client = GitLabClient::new(config.gitlab_url.clone(), config.gitlab_token.clone())?;

        // Validate token and connectivity before proceeding
        info!("Validating GitLab token and connectivity...");
        gitlab_client.validate_token().await.map_err(|e| {
            error!("Failed to validate GitLab token: {}", e);
            error!("Please ensure:");
            error!("  1. GITLAB_TOKEN is set to a token with the api scope");
            error!("  2. The token has not expired or been revoked");
            error!("  3. GitLab is reachable at {}", config.gitlab_url);
            ControllerError::GitLab(e)
        })?;
        info!("GitLab token validated and connectivity established");

        let metrics = Metrics::new()
            .map_err(|e| ControllerError::InvalidConfig(format!("Failed to register metrics: {}", e)))?;
        let probe_state = ProbeState::new(metrics.clone());

        let probe_server = tokio::spawn(serve_probes(config.probe_addr, probe_state.clone()));

        let variable_api: Api<Variable> = match config.namespace.as_deref() {
            Some(ns) => Api::namespaced(kube_client.clone(), ns),
            None => Api::all(kube_client.clone()),
        };

        let reconciler = Arc::new(Reconciler::new(kube_client, gitlab_client, metrics));
        let watcher = Watcher::new(reconciler, variable_api);
        let variable_watcher = tokio::spawn(async move { watcher.watch_variables().await });

        probe_state.set_ready();

        Ok(Self {
            variable_watcher,
            probe_server,
        })
    }

    /// Runs the controller until shutdown.
    pub async fn run(mut self) -> Result<(), ControllerError> {
        info!("GitLab Controller running");

        // Both tasks are expected to run forever
        tokio::select! {
            result = &mut self.variable_watcher => {
                result.map_err(|e| ControllerError::Watch(format!("Variable watcher panicked: {}", e)))?
                    .map_err(|e| ControllerError::Watch(format!("Variable watcher error: {}", e)))?;
            }
            result = &mut self.probe_server => {
                result.map_err(|e| ControllerError::Watch(format!("Probe server panicked: {}", e)))??;
            }
        }

        Ok(())
    }
}
