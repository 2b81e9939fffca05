//! Pool autoscaling.
//!
//! Each tick the reconciler:
//! - Reads the available pools that carry an autoscale policy
//! - Estimates each pool's demand from its queued tasks
//! - Compares demand with the summed size of the pool's scalesets
//! - Grows (allocator) or shrinks (reclaimer) capacity to close the gap
//!
//! A pool with any scaleset mid-transition is skipped for the tick, and all
//! mutations are fire-and-persist: convergence is observed on a later tick.

mod allocator;
mod demand;
#[cfg(test)]
mod fixtures;
mod reclaimer;
mod reconciler;
mod worker;

use chrono::{DateTime, Utc};
use fuzzfleet_id::{PoolName, ScalesetId};
use fuzzfleet_reconcile::ReconcileError;
use fuzzfleet_types::AutoScaleConfigError;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::store::StoreError;

pub use allocator::{CapacityAllocator, CreatedScaleset, ScaleUpSummary, ScalesetResize};
pub use demand::DemandEstimator;
pub use reclaimer::{CapacityReclaimer, ScaleDownSummary};
pub use reconciler::{PoolFailurePolicy, Reconciler};
pub use worker::AutoscaleWorker;

/// Result type for scaling operations.
pub type ScalingResult<T> = Result<T, ScalingError>;

/// Errors that stop a pool (or, under [`PoolFailurePolicy::Abort`], a tick).
#[derive(Debug, Error)]
pub enum ScalingError {
    #[error("pool {pool}: no autoscale config")]
    MissingAutoscale { pool: PoolName },

    #[error("pool {pool}: autoscale config has no region")]
    MissingRegion { pool: PoolName },

    #[error("pool {pool}: invalid autoscale config: {source}")]
    InvalidAutoscale {
        pool: PoolName,
        source: AutoScaleConfigError,
    },

    #[error("capacity error: {0}")]
    Capacity(#[from] ReconcileError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ScalingError {
    /// Returns true if an operator must fix the pool's configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::MissingRegion { .. } | Self::InvalidAutoscale { .. } | Self::Capacity(_)
        )
    }
}

/// What happened to one pool during a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PoolOutcome {
    /// Supply already matched demand.
    Steady { desired: u32 },

    /// A scaleset was mid-transition; nothing was done.
    Busy {
        desired: u32,
        scaleset_id: ScalesetId,
    },

    ScaledUp {
        desired: u32,
        #[serde(flatten)]
        summary: ScaleUpSummary,
    },

    ScaledDown {
        desired: u32,
        #[serde(flatten)]
        summary: ScaleDownSummary,
    },

    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolReport {
    pub pool: PoolName,
    #[serde(flatten)]
    pub outcome: PoolOutcome,
}

/// Summary of one reconciliation tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub pools_processed: u32,
    pub pools_busy: u32,
    pub pools_failed: u32,
    pub nodes_added: u32,
    pub nodes_removed: u32,
    pub scalesets_created: u32,
    pub scalesets_retired: u32,
    pub pools: Vec<PoolReport>,
}

impl TickReport {
    pub(crate) fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            pools_processed: 0,
            pools_busy: 0,
            pools_failed: 0,
            nodes_added: 0,
            nodes_removed: 0,
            scalesets_created: 0,
            scalesets_retired: 0,
            pools: Vec::new(),
        }
    }

    pub(crate) fn record(&mut self, pool: PoolName, outcome: PoolOutcome) {
        self.pools_processed += 1;
        match &outcome {
            PoolOutcome::Steady { .. } => {}
            PoolOutcome::Busy { .. } => self.pools_busy += 1,
            PoolOutcome::ScaledUp { summary, .. } => {
                self.nodes_added += summary.nodes_added();
                self.scalesets_created += summary.created.len() as u32;
            }
            PoolOutcome::ScaledDown { summary, .. } => {
                self.nodes_removed += summary.nodes_removed;
                self.scalesets_retired += summary.scalesets_retired.len() as u32;
            }
            PoolOutcome::Failed { .. } => self.pools_failed += 1,
        }
        self.pools.push(PoolReport { pool, outcome });
    }

    /// Returns true if the tick issued no mutation at all.
    pub fn is_quiescent(&self) -> bool {
        self.nodes_added == 0 && self.nodes_removed == 0 && self.scalesets_retired == 0
    }
}

/// Most recent tick report, shared between the worker and the API.
#[derive(Debug, Default)]
pub struct TickHistory {
    latest: RwLock<Option<TickReport>>,
}

impl TickHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record(&self, report: TickReport) {
        *self.latest.write().await = Some(report);
    }

    pub async fn latest(&self) -> Option<TickReport> {
        self.latest.read().await.clone()
    }
}
