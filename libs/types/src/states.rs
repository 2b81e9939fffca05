//! Lifecycle states for fleet resources.
//!
//! The autoscaler never drives these state machines itself. It reads the
//! current state and asks the owning store to move a scaleset out of
//! `running`.

use serde::{Deserialize, Serialize};

/// Pool lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PoolState {
    Init,
    Running,
    Shutdown,
    Halt,
}

impl PoolState {
    /// States in which a pool accepts work and is considered for scaling.
    pub const fn available() -> &'static [PoolState] {
        &[PoolState::Running]
    }

    pub fn is_available(&self) -> bool {
        Self::available().contains(self)
    }
}

/// Scaleset lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalesetState {
    Init,
    Setup,
    Resize,
    Running,
    Shutdown,
    Halt,
    CreationFailed,
}

impl ScalesetState {
    /// States that mean a transition is already in flight.
    ///
    /// A pool with any scaleset in one of these states is left alone for
    /// the tick.
    pub const fn modifying() -> &'static [ScalesetState] {
        &[
            ScalesetState::Init,
            ScalesetState::Setup,
            ScalesetState::Resize,
            ScalesetState::Shutdown,
            ScalesetState::Halt,
        ]
    }

    pub fn is_modifying(&self) -> bool {
        Self::modifying().contains(self)
    }
}

/// Node lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeState {
    Init,
    Free,
    SettingUp,
    Rebooting,
    Ready,
    Busy,
    Done,
    Shutdown,
    Halt,
}

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Init,
    Waiting,
    Scheduled,
    SettingUp,
    Running,
    Stopping,
    Stopped,
    WaitJob,
}

impl TaskState {
    /// States in which a task still holds (or is waiting for) capacity.
    pub const fn available() -> &'static [TaskState] {
        &[
            TaskState::Waiting,
            TaskState::Scheduled,
            TaskState::SettingUp,
            TaskState::Running,
            TaskState::WaitJob,
        ]
    }

    pub fn is_available(&self) -> bool {
        Self::available().contains(self)
    }
}
