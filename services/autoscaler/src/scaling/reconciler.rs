//! Autoscale reconciler: one pass over every available pool.

use std::str::FromStr;

use chrono::Utc;
use fuzzfleet_reconcile::ScalingDecision;
use fuzzfleet_types::{Pool, PoolState};
use tracing::{debug, info, instrument, warn};

use super::{
    CapacityAllocator, CapacityReclaimer, DemandEstimator, PoolOutcome, ScalingError,
    ScalingResult, TickReport,
};
use crate::store::FleetStores;

/// What a failed pool does to the rest of the tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PoolFailurePolicy {
    /// Record the failure and carry on with the next pool.
    #[default]
    Isolate,

    /// Stop the tick and return the error to the trigger.
    Abort,
}

impl FromStr for PoolFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "isolate" => Ok(Self::Isolate),
            "abort" => Ok(Self::Abort),
            other => Err(format!(
                "unknown pool failure policy '{other}' (expected 'isolate' or 'abort')"
            )),
        }
    }
}

/// The autoscale reconciler.
pub struct Reconciler {
    stores: FleetStores,
    allocator: CapacityAllocator,
    reclaimer: CapacityReclaimer,
    failure_policy: PoolFailurePolicy,
}

impl Reconciler {
    /// Create a new reconciler over `stores`.
    pub fn new(stores: FleetStores, failure_policy: PoolFailurePolicy) -> Self {
        Self {
            allocator: CapacityAllocator::new(stores.scalesets.clone()),
            reclaimer: CapacityReclaimer::new(stores.scalesets.clone(), stores.nodes.clone()),
            stores,
            failure_policy,
        }
    }

    /// Run a single reconciliation pass over all available pools.
    #[instrument(skip(self))]
    pub async fn reconcile_all(&self) -> ScalingResult<TickReport> {
        let mut report = TickReport::new(Utc::now());

        let pools = self
            .stores
            .pools
            .search_states(PoolState::available())
            .await?;
        debug!(pool_count = pools.len(), "Found pools to reconcile");

        for pool in pools {
            if pool.autoscale.is_none() {
                debug!(pool = %pool.name, "Pool has no autoscale config, skipping");
                continue;
            }

            match self.reconcile_pool(&pool).await {
                Ok(outcome) => report.record(pool.name, outcome),
                Err(e) => match self.failure_policy {
                    PoolFailurePolicy::Isolate => {
                        warn!(
                            pool = %pool.name,
                            configuration = e.is_configuration(),
                            error = %e,
                            "Failed to reconcile pool"
                        );
                        report.record(
                            pool.name,
                            PoolOutcome::Failed {
                                error: e.to_string(),
                            },
                        );
                    }
                    PoolFailurePolicy::Abort => return Err(e),
                },
            }
        }

        report.finished_at = Utc::now();
        info!(
            pools_processed = report.pools_processed,
            pools_busy = report.pools_busy,
            pools_failed = report.pools_failed,
            nodes_added = report.nodes_added,
            nodes_removed = report.nodes_removed,
            scalesets_created = report.scalesets_created,
            scalesets_retired = report.scalesets_retired,
            "Autoscale pass complete"
        );

        Ok(report)
    }

    /// Reconcile a single pool with an autoscale policy.
    #[instrument(skip_all, fields(pool = %pool.name))]
    pub async fn reconcile_pool(&self, pool: &Pool) -> ScalingResult<PoolOutcome> {
        let Some(config) = pool.autoscale.as_ref() else {
            return Err(ScalingError::MissingAutoscale {
                pool: pool.name.clone(),
            });
        };
        config
            .validate()
            .map_err(|source| ScalingError::InvalidAutoscale {
                pool: pool.name.clone(),
                source,
            })?;

        let tasks = self.stores.tasks.tasks_by_pool_name(&pool.name).await?;
        let desired = DemandEstimator::estimate(pool, config, &tasks);

        let scalesets = self.stores.scalesets.search_by_pool(&pool.name).await?;
        let mut nodes_needed = i64::from(desired);
        for scaleset in &scalesets {
            if scaleset.state.is_modifying() {
                debug!(
                    scaleset_id = %scaleset.scaleset_id,
                    state = ?scaleset.state,
                    "Scaleset mid-transition, skipping pool this tick"
                );
                return Ok(PoolOutcome::Busy {
                    desired,
                    scaleset_id: scaleset.scaleset_id,
                });
            }
            nodes_needed -= i64::from(scaleset.size);
        }

        info!(
            tasks = tasks.len(),
            desired,
            nodes_needed,
            "Pool demand computed"
        );

        match ScalingDecision::from_delta(nodes_needed) {
            ScalingDecision::ScaleUp(count) => {
                let summary = self.allocator.scale_up(pool, &scalesets, count).await?;
                Ok(PoolOutcome::ScaledUp { desired, summary })
            }
            ScalingDecision::ScaleDown(count) => {
                let summary = self
                    .reclaimer
                    .scale_down(&pool.name, &scalesets, count)
                    .await?;
                Ok(PoolOutcome::ScaledDown { desired, summary })
            }
            ScalingDecision::Steady => Ok(PoolOutcome::Steady { desired }),
        }
    }
}
