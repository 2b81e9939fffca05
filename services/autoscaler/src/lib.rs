//! fuzzfleet autoscaler
//!
//! Keeps each autoscaled pool's scaleset capacity in line with the work
//! queued against it. Exposed as a library so the loop can be driven from
//! tests and embedded elsewhere; the `autoscaler` binary wires it to a
//! periodic worker and a small HTTP surface.

pub mod api;
pub mod config;
pub mod scaling;
pub mod state;
pub mod store;
