//! # fuzzfleet-id
//!
//! Typed identifiers for fleet resources.
//!
//! ## Design Principles
//!
//! - IDs are system-generated and never reused; pool names are operator labels
//! - Every ID has one canonical string form with strict parsing
//! - IDs are typed so a scaleset ID can never be passed where a node ID is expected
//!
//! ## ID Format
//!
//! Resource IDs use a prefixed format: `{prefix}_{uuid}`
//!
//! Examples:
//! - `pool_3f0c1e9a4b2d4c8e9a7b6d5c4b3a2f10`
//! - `vmss_0b7d2c4e6f8a4b1c9d3e5f7a9b1c3d5e`
//! - `node_9a8b7c6d5e4f4a3b2c1d0e9f8a7b6c5d`
//!
//! The UUID part is rendered in simple (unhyphenated) form, but parsing also
//! accepts the hyphenated form that the VM platform reports.

mod error;
mod macros;
mod types;

pub use error::IdError;
pub use types::*;

/// Re-export uuid for consumers that need raw UUID operations
pub use uuid::Uuid;
