//! Application state shared across request handlers.

use std::sync::Arc;

use crate::config::DeploymentConfig;
use crate::scaling::TickHistory;

/// Shared application state.
///
/// This is passed to all request handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    deployment: DeploymentConfig,
    history: Arc<TickHistory>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(deployment: DeploymentConfig, history: Arc<TickHistory>) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                deployment,
                history,
            }),
        }
    }

    /// Deployment the service reports about itself.
    pub fn deployment(&self) -> &DeploymentConfig {
        &self.inner.deployment
    }

    /// Reports published by the autoscale worker.
    pub fn history(&self) -> &TickHistory {
        &self.inner.history
    }
}
