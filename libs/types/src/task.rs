//! Tasks and how they reference capacity.

use fuzzfleet_id::{JobId, PoolName, TaskId};
use serde::{Deserialize, Serialize};

use crate::TaskState;

/// Where a task asks to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskPlacement {
    /// Run on `count` nodes of a named pool.
    Pool(TaskPool),

    /// Run on dedicated VMs; contributes nothing to pool demand.
    Vm(TaskVm),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPool {
    pub count: u32,
    pub pool_name: PoolName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskVm {
    pub count: u32,
    pub region: String,
    pub sku: String,
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: TaskId,
    pub job_id: JobId,
    pub state: TaskState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<TaskPlacement>,
}

impl Task {
    /// The pool reference, if the task is placed on a pool at all.
    pub fn pool(&self) -> Option<&TaskPool> {
        match &self.placement {
            Some(TaskPlacement::Pool(pool)) => Some(pool),
            Some(TaskPlacement::Vm(_)) | None => None,
        }
    }
}
