//! # fuzzfleet-types
//!
//! Data model shared by the fleet services.
//!
//! Pools, scalesets, nodes and tasks are owned by external stores; the
//! autoscaler reads them and requests transitions through those stores.
//! The types here are the boundary representation: every "is this a valid
//! autoscale config" or "does this task reference a pool" question is
//! answered by an `Option` or an enum variant, never by probing at runtime.

mod error;
mod node;
mod pool;
mod scaleset;
mod states;
mod task;

pub use error::AutoScaleConfigError;
pub use node::Node;
pub use pool::{AutoScaleConfig, Pool};
pub use scaleset::{
    Scaleset, ScalesetCreate, CUSTOM_IMAGE_MAX_SIZE, MARKETPLACE_IMAGE_MAX_SIZE, POOL_TAG,
};
pub use states::*;
pub use task::{Task, TaskPlacement, TaskPool, TaskVm};
