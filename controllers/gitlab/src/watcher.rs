//! Kubernetes resource watchers.
//!
//! This module handles watching Kubernetes resources for changes
//! and triggering reconciliation using kube_runtime::Controller.
//!
//! Watchers go through the generic `watch_resource()` helper, which owns the
//! requeue policy: a periodic resync after success and a per-resource
//! Fibonacci backoff after failure.

use crate::backoff::RESYNC_INTERVAL;
use crate::error::ControllerError;
use crate::reconciler::{Reconciler, resource_key};
use crds::Variable;
use futures::StreamExt;
use kube::{Api, ResourceExt};
use kube_runtime::{
    Controller, watcher,
    controller::{Action, Config as RuntimeConfig},
};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

type ReconcileFuture = Pin<Box<dyn Future<Output = Result<(), ControllerError>> + Send>>;

/// Generic watcher helper built on kube_runtime::Controller.
///
/// The controller reconnects on its own and keeps watching indefinitely;
/// `reconcile_fn` only has to bring one object in line.
async fn watch_resource<K, F>(
    api: Api<K>,
    reconciler: Arc<Reconciler>,
    reconcile_fn: F,
    resource_name: &'static str,
) -> Result<(), ControllerError>
where
    K: kube::Resource + Clone + Send + Sync + 'static + std::fmt::Debug + serde::de::DeserializeOwned,
    K::DynamicType: Default + std::cmp::Eq + std::hash::Hash + Clone + std::fmt::Debug + Unpin,
    F: Fn(Arc<Reconciler>, Arc<K>) -> ReconcileFuture + Send + Sync + Clone + 'static,
{
    info!("Starting {} watcher", resource_name);

    let error_policy = move |obj: Arc<K>, error: &ControllerError, ctx: Arc<Reconciler>| {
        let key = resource_key(&obj.namespace().unwrap_or_default(), &obj.name_any());
        let (delay, error_count) = ctx.backoff_for_failure(&key);
        ctx.metrics.reconciled(error.kind());
        warn!(
            "Reconciliation of {} {} failed ({} in a row), retrying in {}s: {}",
            resource_name,
            key,
            error_count,
            delay.as_secs(),
            error
        );
        Action::requeue(delay)
    };

    let reconcile = move |obj: Arc<K>, ctx: Arc<Reconciler>| {
        let reconcile_fn = reconcile_fn.clone();
        async move {
            let key = resource_key(&obj.namespace().unwrap_or_default(), &obj.name_any());
            debug!("Reconciling {} {}", resource_name, key);

            reconcile_fn(ctx.clone(), obj).await?;

            ctx.reset_backoff(&key);
            ctx.metrics.reconciled("success");
            Ok::<_, ControllerError>(Action::requeue(RESYNC_INTERVAL))
        }
    };

    // Debounce batches bursts of events (our own spec and status patches
    // included); concurrency bounds parallel GitLab calls.
    let controller_config = RuntimeConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(api, watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile, error_policy, reconciler)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Controller error for {}: {}", resource_name, e);
            }
        })
        .await;

    Ok(())
}

/// Watches Kubernetes resources for changes.
pub struct Watcher {
    reconciler: Arc<Reconciler>,
    variable_api: Api<Variable>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(reconciler: Arc<Reconciler>, variable_api: Api<Variable>) -> Self {
        Self {
            reconciler,
            variable_api,
        }
    }

    /// Starts watching Variable resources.
    pub async fn watch_variables(&self) -> Result<(), ControllerError> {
        watch_resource(
            self.variable_api.clone(),
            self.reconciler.clone(),
            |reconciler, resource| Box::pin(async move { reconciler.reconcile_variable(&resource).await }),
            "Variable",
        )
        .await
    }
}
