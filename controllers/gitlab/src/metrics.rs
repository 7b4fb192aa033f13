//! Prometheus metrics for the controller.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Counters exported on `/metrics`
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    reconciles: IntCounterVec,
    operations: IntCounterVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let reconciles = IntCounterVec::new(
            Opts::new("gitlab_variable_reconcile_total", "Variable reconciliations by result"),
            &["result"],
        )?;
        let operations = IntCounterVec::new(
            Opts::new("gitlab_variable_operations_total", "GitLab variable API mutations by operation"),
            &["operation"],
        )?;

        registry.register(Box::new(reconciles.clone()))?;
        registry.register(Box::new(operations.clone()))?;

        Ok(Self {
            registry,
            reconciles,
            operations,
        })
    }

    /// Count one reconcile; `result` is `success` or an error kind
    pub fn reconciled(&self, result: &str) {
        self.reconciles.with_label_values(&[result]).inc();
    }

    /// Count one GitLab mutation (`create`, `update`, `remove`)
    pub fn operation(&self, operation: &str) {
        self.operations.with_label_values(&[operation]).inc();
    }

    /// Render all metrics in the Prometheus text format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.reconciled("success");
        metrics.reconciled("success");
        metrics.operation("create");

        let text = metrics.render().unwrap();
        assert!(text.contains(r#"gitlab_variable_reconcile_total{result="success"} 2"#));
        assert!(text.contains(r#"gitlab_variable_operations_total{operation="create"} 1"#));
    }
}
