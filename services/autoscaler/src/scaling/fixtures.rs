//! Builders shared by the scaling unit tests.

use fuzzfleet_id::{NodeId, PoolId, PoolName, ScalesetId};
use fuzzfleet_types::{
    AutoScaleConfig, Node, NodeState, Pool, PoolState, Scaleset, ScalesetState,
};

pub fn autoscale(min_size: u32, max_size: Option<u32>, scaleset_size: u32) -> AutoScaleConfig {
    AutoScaleConfig {
        image: "Canonical:UbuntuServer:18.04-LTS:latest".to_string(),
        max_size,
        min_size,
        region: Some("eastus".to_string()),
        scaleset_size,
        spot_instances: false,
        vm_sku: "Standard_D2s_v3".to_string(),
    }
}

pub fn pool(name: &str, autoscale: Option<AutoScaleConfig>) -> Pool {
    Pool {
        pool_id: PoolId::new(),
        name: PoolName::parse(name).unwrap(),
        state: PoolState::Running,
        autoscale,
    }
}

pub fn scaleset(pool_name: &str, state: ScalesetState, size: u32) -> Scaleset {
    Scaleset {
        scaleset_id: ScalesetId::new(),
        pool_name: PoolName::parse(pool_name).unwrap(),
        state,
        vm_sku: "Standard_D2s_v3".to_string(),
        image: "Canonical:UbuntuServer:18.04-LTS:latest".to_string(),
        region: "eastus".to_string(),
        size,
        spot_instances: false,
        tags: Default::default(),
    }
}

/// `count` nodes in `scaleset`, all in `state`.
pub fn nodes(scaleset: &Scaleset, state: NodeState, count: usize) -> Vec<Node> {
    (0..count)
        .map(|_| Node {
            machine_id: NodeId::new(),
            pool_name: scaleset.pool_name.clone(),
            scaleset_id: Some(scaleset.scaleset_id),
            state,
            delete_requested: false,
        })
        .collect()
}
