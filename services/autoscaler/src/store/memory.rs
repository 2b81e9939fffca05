//! In-memory fleet store.
//!
//! Holds pools, scalesets, nodes and tasks in insertion order and records
//! every mutation in a journal so callers can see exactly what a
//! reconciliation pass asked for. Used by the binary in development and by
//! the test suite.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use fuzzfleet_id::{NodeId, PoolName, ScalesetId};
use fuzzfleet_types::{
    Node, NodeState, Pool, PoolState, Scaleset, ScalesetCreate, ScalesetState, Task,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{NodeStore, PoolStore, ScalesetStore, StoreError, StoreResult, TaskStore};

/// Full contents of the fleet, as loaded from a seed file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    #[serde(default)]
    pub pools: Vec<Pool>,
    #[serde(default)]
    pub scalesets: Vec<Scaleset>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A mutation requested through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    ScalesetCreated(ScalesetCreate),
    ScalesetSaved {
        scaleset_id: ScalesetId,
        size: u32,
        state: ScalesetState,
    },
    NodeShutdown(NodeId),
}

#[derive(Debug, Default)]
struct Inner {
    fleet: FleetSnapshot,
    journal: Vec<Mutation>,
}

/// Fleet store backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryFleet {
    inner: Mutex<Inner>,

    /// Whether writes should "fail" as if the store were unreachable.
    fail_writes: AtomicBool,
}

impl InMemoryFleet {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `fleet`.
    pub fn from_snapshot(fleet: FleetSnapshot) -> Self {
        Self {
            inner: Mutex::new(Inner {
                fleet,
                journal: Vec::new(),
            }),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a store from a JSON-encoded [`FleetSnapshot`].
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::from_snapshot(serde_json::from_str(json)?))
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Copy of the current fleet.
    pub async fn snapshot(&self) -> FleetSnapshot {
        self.inner.lock().await.fleet.clone()
    }

    /// Mutations recorded so far, oldest first.
    pub async fn journal(&self) -> Vec<Mutation> {
        self.inner.lock().await.journal.clone()
    }

    /// Drain the journal.
    pub async fn take_journal(&self) -> Vec<Mutation> {
        std::mem::take(&mut self.inner.lock().await.journal)
    }

    /// Apply an out-of-band change, standing in for the external state
    /// machines (e.g. a resize converging back to running).
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut FleetSnapshot),
    {
        f(&mut self.inner.lock().await.fleet);
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable(
                "in-memory store configured to fail writes".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PoolStore for InMemoryFleet {
    async fn search_states(&self, states: &[PoolState]) -> StoreResult<Vec<Pool>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .fleet
            .pools
            .iter()
            .filter(|pool| states.contains(&pool.state))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TaskStore for InMemoryFleet {
    async fn tasks_by_pool_name(&self, pool_name: &PoolName) -> StoreResult<Vec<Task>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .fleet
            .tasks
            .iter()
            .filter(|task| task.state.is_available())
            .filter(|task| task.pool().is_some_and(|p| &p.pool_name == pool_name))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ScalesetStore for InMemoryFleet {
    async fn search_by_pool(&self, pool_name: &PoolName) -> StoreResult<Vec<Scaleset>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .fleet
            .scalesets
            .iter()
            .filter(|scaleset| &scaleset.pool_name == pool_name)
            .cloned()
            .collect())
    }

    async fn create(&self, request: ScalesetCreate) -> StoreResult<Scaleset> {
        self.check_writable()?;

        let scaleset = Scaleset::from_request(request.clone());
        debug!(
            scaleset_id = %scaleset.scaleset_id,
            pool = %scaleset.pool_name,
            size = scaleset.size,
            "[MEMORY] Scaleset requested"
        );

        self.inner
            .lock()
            .await
            .journal
            .push(Mutation::ScalesetCreated(request));
        Ok(scaleset)
    }

    async fn save(&self, scaleset: &Scaleset) -> StoreResult<()> {
        self.check_writable()?;

        let mut inner = self.inner.lock().await;
        let scalesets = &mut inner.fleet.scalesets;
        match scalesets
            .iter_mut()
            .find(|s| s.scaleset_id == scaleset.scaleset_id)
        {
            Some(existing) => *existing = scaleset.clone(),
            None => scalesets.push(scaleset.clone()),
        }

        inner.journal.push(Mutation::ScalesetSaved {
            scaleset_id: scaleset.scaleset_id,
            size: scaleset.size,
            state: scaleset.state,
        });
        Ok(())
    }
}

#[async_trait]
impl NodeStore for InMemoryFleet {
    async fn search_states(
        &self,
        scaleset_id: ScalesetId,
        states: &[NodeState],
    ) -> StoreResult<Vec<Node>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .fleet
            .nodes
            .iter()
            .filter(|node| node.scaleset_id == Some(scaleset_id))
            .filter(|node| states.contains(&node.state))
            .cloned()
            .collect())
    }

    async fn set_shutdown(&self, node: &Node) -> StoreResult<()> {
        self.check_writable()?;

        let mut inner = self.inner.lock().await;
        let Some(existing) = inner
            .fleet
            .nodes
            .iter_mut()
            .find(|n| n.machine_id == node.machine_id)
        else {
            return Err(StoreError::NotFound {
                kind: "node",
                id: node.machine_id.to_string(),
            });
        };

        existing.delete_requested = true;
        inner.journal.push(Mutation::NodeShutdown(node.machine_id));
        Ok(())
    }
}
