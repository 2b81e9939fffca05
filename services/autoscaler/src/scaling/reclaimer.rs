//! Scale-down: shrink or retire scalesets with idle nodes.

use std::sync::Arc;

use fuzzfleet_id::{PoolName, ScalesetId};
use fuzzfleet_reconcile::{plan_reclamation, Reclamation};
use fuzzfleet_types::{NodeState, Scaleset, ScalesetState};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{ScalesetResize, ScalingResult};
use crate::store::{NodeStore, ScalesetStore};

/// Mutations issued by one scale-down.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaleDownSummary {
    pub nodes_removed: u32,
    pub shrunk: Vec<ScalesetResize>,
    pub scalesets_retired: Vec<ScalesetId>,
    pub nodes_shutdown: u32,
}

/// Reclaims idle capacity, first-found order.
pub struct CapacityReclaimer {
    scalesets: Arc<dyn ScalesetStore>,
    nodes: Arc<dyn NodeStore>,
}

impl CapacityReclaimer {
    pub fn new(scalesets: Arc<dyn ScalesetStore>, nodes: Arc<dyn NodeStore>) -> Self {
        Self { scalesets, nodes }
    }

    /// Removes up to `nodes_to_remove` free nodes from `scalesets`.
    ///
    /// Scalesets are visited in enumeration order. One whose nodes are all
    /// free, and which the remaining surplus covers entirely, is moved to
    /// `shutdown` and each of its nodes is told to shut down. Otherwise the
    /// scaleset is shrunk by as many free nodes as the surplus allows and
    /// moved to `resize`. Scalesets without free nodes are left untouched.
    ///
    /// Surplus that no free node can absorb is dropped; the next tick
    /// re-derives it from fresh state.
    #[instrument(skip_all, fields(pool = %pool_name, nodes_to_remove = nodes_to_remove))]
    pub async fn scale_down(
        &self,
        pool_name: &PoolName,
        scalesets: &[Scaleset],
        nodes_to_remove: u32,
    ) -> ScalingResult<ScaleDownSummary> {
        info!("Scaling down");
        let mut summary = ScaleDownSummary::default();
        let mut nodes_to_remove = nodes_to_remove;

        for scaleset in scalesets {
            if nodes_to_remove == 0 {
                debug!(scaleset_id = %scaleset.scaleset_id, "Surplus exhausted");
                continue;
            }

            let free_nodes = self
                .nodes
                .search_states(scaleset.scaleset_id, &[NodeState::Free])
                .await?;
            let free_count = u32::try_from(free_nodes.len()).unwrap_or(u32::MAX);

            match plan_reclamation(free_count, scaleset.size, nodes_to_remove) {
                Reclamation::Skip => {
                    debug!(
                        scaleset_id = %scaleset.scaleset_id,
                        size = scaleset.size,
                        free = free_count,
                        "No free nodes to reclaim"
                    );
                }
                Reclamation::Retire => {
                    let mut retired = scaleset.clone();
                    retired.state = ScalesetState::Shutdown;
                    self.scalesets.save(&retired).await?;
                    nodes_to_remove -= scaleset.size;

                    info!(
                        scaleset_id = %scaleset.scaleset_id,
                        size = scaleset.size,
                        "Retiring idle scaleset"
                    );
                    for node in &free_nodes {
                        self.nodes.set_shutdown(node).await?;
                        summary.nodes_shutdown += 1;
                    }

                    summary.nodes_removed += scaleset.size;
                    summary.scalesets_retired.push(scaleset.scaleset_id);
                }
                Reclamation::Shrink(count) => {
                    let mut shrunk = scaleset.clone();
                    shrunk.size -= count;
                    shrunk.state = ScalesetState::Resize;
                    self.scalesets.save(&shrunk).await?;
                    nodes_to_remove -= count;

                    info!(
                        scaleset_id = %scaleset.scaleset_id,
                        from = scaleset.size,
                        to = shrunk.size,
                        free = free_count,
                        "Shrinking scaleset"
                    );
                    summary.nodes_removed += count;
                    summary.shrunk.push(ScalesetResize {
                        scaleset_id: scaleset.scaleset_id,
                        from: scaleset.size,
                        to: shrunk.size,
                    });
                }
            }
        }

        if nodes_to_remove > 0 {
            debug!(unreclaimed = nodes_to_remove, "Surplus left for a later tick");
        }

        Ok(summary)
    }
}
