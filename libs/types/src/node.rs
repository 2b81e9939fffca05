//! Worker machines.

use fuzzfleet_id::{NodeId, PoolName, ScalesetId};
use serde::{Deserialize, Serialize};

use crate::NodeState;

/// One machine, usually a member of a scaleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub machine_id: NodeId,
    pub pool_name: PoolName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaleset_id: Option<ScalesetId>,
    pub state: NodeState,

    /// Set once shutdown has been requested. The node takes no new work and
    /// is torn down when its current work completes.
    #[serde(default)]
    pub delete_requested: bool,
}
