//! Controller configuration loaded from the environment.

use crate::error::ControllerError;
use std::net::SocketAddr;

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_PROBE_ADDR: &str = "0.0.0.0:8080";

/// Runtime configuration of the controller
#[derive(Clone)]
pub struct ControllerConfig {
    /// GitLab base URL, without `/api/v4`
    pub gitlab_url: String,
    /// Personal or project access token with the `api` scope
    pub gitlab_token: String,
    /// `None` watches every namespace
    pub namespace: Option<String>,
    /// Listen address for `/healthz`, `/readyz` and `/metrics`
    pub probe_addr: SocketAddr,
}

// Hand-written so the token never reaches the logs.
impl std::fmt::Debug for ControllerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerConfig")
            .field("gitlab_url", &self.gitlab_url)
            .field("gitlab_token", &"<redacted>")
            .field("namespace", &self.namespace)
            .field("probe_addr", &self.probe_addr)
            .finish()
    }
}

impl ControllerConfig {
    /// Load configuration from environment variables
    ///
    /// - `GITLAB_URL` (default `https://gitlab.com`)
    /// - `GITLAB_TOKEN` (required)
    /// - `WATCH_NAMESPACE` (optional, all namespaces when unset)
    /// - `PROBE_ADDR` (default `0.0.0.0:8080`)
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let gitlab_url = non_empty("GITLAB_URL")
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let gitlab_token = non_empty("GITLAB_TOKEN").ok_or_else(|| {
            ControllerError::InvalidConfig("GITLAB_TOKEN environment variable is required".to_string())
        })?;

        let namespace = non_empty("WATCH_NAMESPACE");

        let probe_addr_raw = non_empty("PROBE_ADDR").unwrap_or_else(|| DEFAULT_PROBE_ADDR.to_string());
        let probe_addr = probe_addr_raw.parse::<SocketAddr>().map_err(|e| {
            ControllerError::InvalidConfig(format!("PROBE_ADDR '{}' is not a socket address: {}", probe_addr_raw, e))
        })?;

        Ok(Self {
            gitlab_url,
            gitlab_token,
            namespace,
            probe_addr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<ControllerConfig, ControllerError> {
        let env: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        ControllerConfig::from_lookup(|name| env.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("GITLAB_TOKEN", "glpat-test")]).unwrap();
        assert_eq!(config.gitlab_url, "https://gitlab.com");
        assert_eq!(config.gitlab_token, "glpat-test");
        assert!(config.namespace.is_none());
        assert_eq!(config.probe_addr.port(), 8080);
    }

    #[test]
    fn test_missing_token_is_invalid_config() {
        assert!(matches!(load(&[]), Err(ControllerError::InvalidConfig(_))));
        assert!(matches!(
            load(&[("GITLAB_TOKEN", "  ")]),
            Err(ControllerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("GITLAB_URL", "https://gitlab.example.com/"),
            ("GITLAB_TOKEN", "t"),
            ("WATCH_NAMESPACE", "ci"),
            ("PROBE_ADDR", "127.0.0.1:9090"),
        ])
        .unwrap();
        assert_eq!(config.gitlab_url, "https://gitlab.example.com");
        assert_eq!(config.namespace.as_deref(), Some("ci"));
        assert_eq!(config.probe_addr.to_string(), "127.0.0.1:9090");
    }

    #[test]
    fn test_bad_probe_addr() {
        let err = load(&[("GITLAB_TOKEN", "t"), ("PROBE_ADDR", "not-an-addr")]).unwrap_err();
        assert!(err.to_string().contains("PROBE_ADDR"));
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = load(&[("GITLAB_TOKEN", "glpat-secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("glpat-secret"));
    }
}
