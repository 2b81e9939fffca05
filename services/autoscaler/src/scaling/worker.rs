//! Autoscale background worker.
//!
//! Runs the reconciler on a periodic interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, instrument};

use super::{Reconciler, ScalingResult, TickHistory, TickReport};

/// Worker that drives one reconciliation tick per interval.
pub struct AutoscaleWorker {
    reconciler: Reconciler,
    interval: Duration,
    history: Arc<TickHistory>,
}

impl AutoscaleWorker {
    /// Create a new autoscale worker.
    pub fn new(reconciler: Reconciler, interval: Duration, history: Arc<TickHistory>) -> Self {
        Self {
            reconciler,
            interval,
            history,
        }
    }

    /// Run the worker until shutdown is signaled.
    #[instrument(skip(self, shutdown))]
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_secs = self.interval.as_secs(),
            "Starting autoscale worker"
        );

        let mut interval = tokio::time::interval(self.interval);
        // Don't immediately tick on startup - wait for first interval
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.tick().await {
                        error!(error = %e, "Autoscale tick failed");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Autoscale worker shutting down");
                        break;
                    }
                }
            }
        }
    }

    /// Run a single tick and publish its report.
    pub async fn tick(&self) -> ScalingResult<TickReport> {
        let report = self.reconciler.reconcile_all().await?;
        self.history.record(report.clone()).await;
        Ok(report)
    }
}
