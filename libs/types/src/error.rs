//! Validation errors for fleet configuration.

use thiserror::Error;

/// Reasons an autoscale configuration cannot be acted on.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AutoScaleConfigError {
    /// The lower bound exceeds the upper bound.
    #[error("min_size {min_size} is greater than max_size {max_size}")]
    MinExceedsMax { min_size: u32, max_size: u32 },

    /// A scaleset of size zero can never hold a node.
    #[error("scaleset_size must be at least 1")]
    ZeroScalesetSize,

    /// A required text field is blank.
    #[error("{0} must not be empty")]
    MissingField(&'static str),
}
