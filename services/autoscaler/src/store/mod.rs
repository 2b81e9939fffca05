//! Interfaces to the stores that own fleet records.
//!
//! The autoscaler does not persist anything itself. It reads pools, tasks,
//! scalesets and nodes through these traits and hands every mutation back
//! to them. Each call either succeeds or fails; nothing here retries.
//!
//! An in-memory implementation is provided for development and testing.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use fuzzfleet_id::{PoolName, ScalesetId};
use fuzzfleet_types::{Node, NodeState, Pool, PoolState, Scaleset, ScalesetCreate, Task};
use thiserror::Error;

pub use memory::{FleetSnapshot, InMemoryFleet, Mutation};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a backing store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The record changed underneath the writer.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or refused the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Pool lookup.
#[async_trait]
pub trait PoolStore: Send + Sync {
    /// Pools whose state is one of `states`.
    async fn search_states(&self, states: &[PoolState]) -> StoreResult<Vec<Pool>>;
}

/// Task lookup.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Unfinished tasks placed on the named pool.
    async fn tasks_by_pool_name(&self, pool_name: &PoolName) -> StoreResult<Vec<Task>>;
}

/// Scaleset lookup and mutation.
#[async_trait]
pub trait ScalesetStore: Send + Sync {
    /// Scalesets backing the named pool, in a stable order.
    async fn search_by_pool(&self, pool_name: &PoolName) -> StoreResult<Vec<Scaleset>>;

    /// Requests a new scaleset. The returned record is not persisted until saved.
    async fn create(&self, request: ScalesetCreate) -> StoreResult<Scaleset>;

    /// Persists the size and state of a scaleset.
    async fn save(&self, scaleset: &Scaleset) -> StoreResult<()>;
}

/// Node lookup and commands.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Nodes of a scaleset whose state is one of `states`.
    async fn search_states(
        &self,
        scaleset_id: ScalesetId,
        states: &[NodeState],
    ) -> StoreResult<Vec<Node>>;

    /// Asks a node to stop taking work and shut down once idle.
    async fn set_shutdown(&self, node: &Node) -> StoreResult<()>;
}

/// The set of collaborators a reconciliation pass talks to.
#[derive(Clone)]
pub struct FleetStores {
    pub pools: Arc<dyn PoolStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub scalesets: Arc<dyn ScalesetStore>,
    pub nodes: Arc<dyn NodeStore>,
}

impl FleetStores {
    /// Uses one store for every collaborator.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: PoolStore + TaskStore + ScalesetStore + NodeStore + 'static,
    {
        Self {
            pools: store.clone(),
            tasks: store.clone(),
            scalesets: store.clone(),
            nodes: store,
        }
    }
}
