//! Demand estimation.

use fuzzfleet_reconcile::desired_size;
use fuzzfleet_types::{AutoScaleConfig, Pool, Task};
use tracing::{debug, instrument};

/// Computes how many nodes a pool should have.
pub struct DemandEstimator;

impl DemandEstimator {
    /// Total desired node count for `pool`.
    ///
    /// Sums the requested count of every task placed on this pool, then
    /// clamps the sum to the policy's `[min_size, max_size]`. Tasks without a
    /// pool placement, or placed on a different pool, are ignored.
    #[instrument(skip_all, fields(pool = %pool.name, tasks = tasks.len()))]
    pub fn estimate(pool: &Pool, config: &AutoScaleConfig, tasks: &[Task]) -> u32 {
        let task_demand: u64 = tasks
            .iter()
            .filter_map(Task::pool)
            .filter(|reference| reference.pool_name == pool.name)
            .map(|reference| u64::from(reference.count))
            .sum();

        let desired = desired_size(task_demand, config.min_size, config.max_size());
        debug!(
            task_demand,
            min_size = config.min_size,
            max_size = ?config.max_size(),
            desired,
            "Estimated pool demand"
        );
        desired
    }
}
