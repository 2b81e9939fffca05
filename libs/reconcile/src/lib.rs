//! Capacity sizing policy.
//!
//! This library holds the arithmetic of pool reconciliation with no I/O:
//!
//! - **Demand**: how many nodes a pool should have, clamped to its bounds.
//! - **Allocation**: how much an existing scaleset can grow, and how leftover
//!   demand is split across new scalesets.
//! - **Reclamation**: whether a scaleset is retired, shrunk, or left alone.
//!
//! # Invariants
//!
//! - Decisions are deterministic given the same inputs
//! - No scaleset is sized above its cap
//! - Growth is conserved: fills plus new scalesets equal the surplus exactly
//! - No more nodes are reclaimed from a scaleset than it has free

use std::time::Duration;

use thiserror::Error;

/// Sizing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// A scaleset cap of zero can never absorb demand.
    #[error("scaleset capacity is zero; cannot place {remaining} nodes")]
    ZeroCapacity { remaining: u32 },
}

/// Total nodes a pool should have.
///
/// `task_demand` is the summed node count of the pool's queued tasks. The
/// result is raised to `min_size` and, when bounded, lowered to `max_size`.
pub fn desired_size(task_demand: u64, min_size: u32, max_size: Option<u32>) -> u32 {
    let demand = u32::try_from(task_demand).unwrap_or(u32::MAX);
    let desired = demand.max(min_size);
    match max_size {
        Some(max_size) => desired.min(max_size),
        None => desired,
    }
}

/// Largest size a scaleset may reach.
///
/// `platform_max` is the per-image limit, `target_size` the configured
/// per-scaleset size.
pub fn scaleset_cap(platform_max: u32, target_size: u32) -> u32 {
    platform_max.min(target_size)
}

/// How many nodes a scaleset at `current_size` can absorb toward `nodes_needed`.
pub fn fill_amount(nodes_needed: u32, current_size: u32, cap: u32) -> u32 {
    cap.saturating_sub(current_size).min(nodes_needed)
}

/// Splits `remaining` nodes into new scalesets of at most `cap` each.
///
/// Produces `ceil(remaining / cap)` sizes; every size is `cap` except
/// possibly the last.
pub fn partition_new_capacity(remaining: u32, cap: u32) -> Result<Vec<u32>, ReconcileError> {
    if remaining == 0 {
        return Ok(Vec::new());
    }
    if cap == 0 {
        return Err(ReconcileError::ZeroCapacity { remaining });
    }

    let count = remaining.div_ceil(cap);
    let mut sizes = Vec::with_capacity(count as usize);
    let mut left = remaining;
    for _ in 0..count {
        let size = cap.min(left);
        sizes.push(size);
        left -= size;
    }

    Ok(sizes)
}

/// What to do about a pool after comparing demand with supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalingDecision {
    /// Supply is short by this many nodes.
    ScaleUp(u32),

    /// Supply exceeds demand by this many nodes.
    ScaleDown(u32),

    /// Supply matches demand.
    Steady,
}

impl ScalingDecision {
    /// Decision for `delta = desired - supply`.
    pub fn from_delta(delta: i64) -> Self {
        let magnitude = u32::try_from(delta.unsigned_abs()).unwrap_or(u32::MAX);
        match delta {
            d if d > 0 => Self::ScaleUp(magnitude),
            d if d < 0 => Self::ScaleDown(magnitude),
            _ => Self::Steady,
        }
    }

    /// Returns true if no action is needed.
    pub fn is_steady(&self) -> bool {
        matches!(self, Self::Steady)
    }
}

/// Outcome of reclaiming from one scaleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reclamation {
    /// Every node is free and the deficit covers them all; shut the
    /// whole scaleset down. Counts as `size` nodes removed.
    Retire,

    /// Lower the scaleset size by this many nodes.
    Shrink(u32),

    /// Nothing to take from this scaleset.
    Skip,
}

impl Reclamation {
    /// Nodes this outcome removes from a scaleset of `size`.
    pub fn nodes_removed(&self, size: u32) -> u32 {
        match self {
            Self::Retire => size,
            Self::Shrink(n) => *n,
            Self::Skip => 0,
        }
    }
}

/// Decides how to reclaim from a scaleset with `free_nodes` idle nodes out of
/// `size`, when `nodes_to_remove` nodes are still in surplus.
pub fn plan_reclamation(free_nodes: u32, size: u32, nodes_to_remove: u32) -> Reclamation {
    if free_nodes == 0 || nodes_to_remove == 0 {
        return Reclamation::Skip;
    }

    let removable = free_nodes.min(nodes_to_remove);
    if removable >= size && free_nodes == size {
        return Reclamation::Retire;
    }

    // Free counts can briefly run ahead of the recorded size.
    match removable.min(size) {
        0 => Reclamation::Skip,
        n => Reclamation::Shrink(n),
    }
}

/// Default period between reconciliation ticks.
pub const DEFAULT_RECONCILE_INTERVAL: Duration = Duration::from_secs(60);

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 2, Some(10), 2)]
    #[case(7, 2, Some(10), 7)]
    #[case(25, 2, Some(10), 10)]
    #[case(25, 0, None, 25)]
    #[case(0, 0, None, 0)]
    #[case(u64::MAX, 0, None, u32::MAX)]
    fn test_desired_size(
        #[case] demand: u64,
        #[case] min: u32,
        #[case] max: Option<u32>,
        #[case] expected: u32,
    ) {
        assert_eq!(desired_size(demand, min, max), expected);
    }

    #[test]
    fn test_fill_amount() {
        assert_eq!(fill_amount(4, 3, 5), 2);
        assert_eq!(fill_amount(1, 3, 5), 1);
        assert_eq!(fill_amount(4, 5, 5), 0);
        assert_eq!(fill_amount(4, 7, 5), 0);
    }

    #[test]
    fn test_partition_new_capacity() {
        assert_eq!(partition_new_capacity(2, 5).unwrap(), vec![2]);
        assert_eq!(partition_new_capacity(12, 5).unwrap(), vec![5, 5, 2]);
        assert_eq!(partition_new_capacity(10, 5).unwrap(), vec![5, 5]);
        assert!(partition_new_capacity(0, 5).unwrap().is_empty());
    }

    #[test]
    fn test_partition_zero_cap() {
        assert_eq!(
            partition_new_capacity(3, 0),
            Err(ReconcileError::ZeroCapacity { remaining: 3 })
        );
        assert!(partition_new_capacity(0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_scaling_decision() {
        assert_eq!(ScalingDecision::from_delta(4), ScalingDecision::ScaleUp(4));
        assert_eq!(ScalingDecision::from_delta(-3), ScalingDecision::ScaleDown(3));
        assert!(ScalingDecision::from_delta(0).is_steady());
    }

    #[rstest]
    // whole scaleset free and covered
    #[case(5, 5, 5, Reclamation::Retire)]
    #[case(5, 5, 9, Reclamation::Retire)]
    // partly free
    #[case(2, 5, 3, Reclamation::Shrink(2))]
    // all free but deficit smaller than scaleset
    #[case(5, 5, 3, Reclamation::Shrink(3))]
    #[case(0, 5, 3, Reclamation::Skip)]
    #[case(4, 5, 0, Reclamation::Skip)]
    // stale size
    #[case(6, 5, 9, Reclamation::Shrink(5))]
    #[case(2, 0, 9, Reclamation::Skip)]
    fn test_plan_reclamation(
        #[case] free: u32,
        #[case] size: u32,
        #[case] to_remove: u32,
        #[case] expected: Reclamation,
    ) {
        assert_eq!(plan_reclamation(free, size, to_remove), expected);
    }

    /// Runs the fill-then-create policy over plain sizes.
    fn allocate(sizes: &mut [u32], cap: u32, mut needed: u32) -> Vec<u32> {
        for size in sizes.iter_mut() {
            let fill = fill_amount(needed, *size, cap);
            *size += fill;
            needed -= fill;
            if needed == 0 {
                return Vec::new();
            }
        }
        partition_new_capacity(needed, cap).unwrap()
    }

    proptest! {
        #[test]
        fn prop_allocation_conserves_and_respects_cap(
            existing in proptest::collection::vec(0u32..20, 0..6),
            cap in 1u32..20,
            needed in 1u32..200,
        ) {
            let mut sizes = existing.clone();
            let created = allocate(&mut sizes, cap, needed);

            let grown: u32 = sizes.iter().zip(&existing).map(|(after, before)| after - before).sum();
            let new_total: u32 = created.iter().sum();
            prop_assert_eq!(grown + new_total, needed);

            for (after, before) in sizes.iter().zip(&existing) {
                prop_assert!(*after <= cap.max(*before));
            }
            for size in created {
                prop_assert!(size >= 1 && size <= cap);
            }
        }

        #[test]
        fn prop_reclamation_never_exceeds_free(
            free in 0u32..50,
            size in 0u32..50,
            to_remove in 0u32..100,
        ) {
            let outcome = plan_reclamation(free, size, to_remove);
            let removed = outcome.nodes_removed(size);
            prop_assert!(removed <= free);
            prop_assert!(removed <= size);
            prop_assert!(removed <= to_remove);
            if outcome == Reclamation::Retire {
                prop_assert_eq!(free, size);
            }
        }

        #[test]
        fn prop_desired_within_bounds(
            demand in 0u64..10_000,
            min in 0u32..100,
            extra in 0u32..100,
        ) {
            let max = min + extra;
            let desired = desired_size(demand, min, Some(max));
            prop_assert!(desired >= min && desired <= max);
        }
    }
}
