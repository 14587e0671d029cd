//! Application state shared by the handlers.

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,
    /// Installed recorder; `None` in tests and the CLI
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            prometheus: None,
        }
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}
