//! Scale-up: grow existing scalesets, then create new ones.

use std::sync::Arc;

use fuzzfleet_id::ScalesetId;
use fuzzfleet_reconcile::{fill_amount, partition_new_capacity, scaleset_cap};
use fuzzfleet_types::{Pool, Scaleset, ScalesetCreate, ScalesetState};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{ScalingError, ScalingResult};
use crate::store::ScalesetStore;

/// A size change issued for an existing scaleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScalesetResize {
    pub scaleset_id: ScalesetId,
    pub from: u32,
    pub to: u32,
}

/// A scaleset created during scale-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedScaleset {
    pub scaleset_id: ScalesetId,
    pub size: u32,
}

/// Mutations issued by one scale-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScaleUpSummary {
    pub resized: Vec<ScalesetResize>,
    pub created: Vec<CreatedScaleset>,
}

impl ScaleUpSummary {
    /// Nodes added across grown and created scalesets.
    pub fn nodes_added(&self) -> u32 {
        let grown: u32 = self.resized.iter().map(|r| r.to.saturating_sub(r.from)).sum();
        let created: u32 = self.created.iter().map(|c| c.size).sum();
        grown + created
    }
}

/// Greedy first-fit capacity allocation.
pub struct CapacityAllocator {
    scalesets: Arc<dyn ScalesetStore>,
}

impl CapacityAllocator {
    pub fn new(scalesets: Arc<dyn ScalesetStore>) -> Self {
        Self { scalesets }
    }

    /// Adds `nodes_needed` nodes of capacity to `pool`.
    ///
    /// Running scalesets are filled up to their cap in enumeration order,
    /// each one marked `resize` and saved as it is grown. Whatever is left
    /// goes into new scalesets of at most the cap each. A pool without an
    /// autoscale policy is left alone.
    ///
    /// A missing region fails the call before the first scaleset is
    /// created; fills already saved are kept.
    #[instrument(skip_all, fields(pool = %pool.name, nodes_needed = nodes_needed))]
    pub async fn scale_up(
        &self,
        pool: &Pool,
        scalesets: &[Scaleset],
        nodes_needed: u32,
    ) -> ScalingResult<ScaleUpSummary> {
        let mut summary = ScaleUpSummary::default();

        let Some(config) = pool.autoscale.as_ref() else {
            debug!("Pool has no autoscale config, not scaling up");
            return Ok(summary);
        };
        if nodes_needed == 0 {
            return Ok(summary);
        }

        info!("Scaling up");
        let mut nodes_needed = nodes_needed;

        for scaleset in scalesets
            .iter()
            .filter(|s| s.state == ScalesetState::Running)
        {
            let cap = scaleset_cap(scaleset.max_size(), config.scaleset_size);
            let fill = fill_amount(nodes_needed, scaleset.size, cap);
            if fill == 0 {
                debug!(
                    scaleset_id = %scaleset.scaleset_id,
                    size = scaleset.size,
                    cap,
                    "Scaleset already at capacity"
                );
                continue;
            }

            let mut grown = scaleset.clone();
            grown.size += fill;
            grown.state = ScalesetState::Resize;
            self.scalesets.save(&grown).await?;

            info!(
                scaleset_id = %grown.scaleset_id,
                from = scaleset.size,
                to = grown.size,
                cap,
                "Growing scaleset"
            );
            summary.resized.push(ScalesetResize {
                scaleset_id: grown.scaleset_id,
                from: scaleset.size,
                to: grown.size,
            });

            nodes_needed -= fill;
            if nodes_needed == 0 {
                return Ok(summary);
            }
        }

        let Some(region) = config.region() else {
            return Err(ScalingError::MissingRegion {
                pool: pool.name.clone(),
            });
        };

        let cap = scaleset_cap(
            Scaleset::max_size_for_image(&config.image),
            config.scaleset_size,
        );
        for size in partition_new_capacity(nodes_needed, cap)? {
            let request = ScalesetCreate::for_pool(&pool.name, config, region, size);
            let scaleset = self.scalesets.create(request).await?;
            self.scalesets.save(&scaleset).await?;

            info!(
                scaleset_id = %scaleset.scaleset_id,
                size,
                region,
                "Created scaleset"
            );
            summary.created.push(CreatedScaleset {
                scaleset_id: scaleset.scaleset_id,
                size,
            });
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::fixtures::{autoscale, pool, scaleset};
    use crate::store::{InMemoryFleet, Mutation};
    use fuzzfleet_types::{CUSTOM_IMAGE_MAX_SIZE, POOL_TAG};

    fn allocator(store: &Arc<InMemoryFleet>) -> CapacityAllocator {
        CapacityAllocator::new(store.clone())
    }

    #[tokio::test]
    async fn test_creates_scaleset_when_none_exist() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", Some(autoscale(2, Some(10), 5)));

        let summary = allocator(&store).scale_up(&pool, &[], 2).await.unwrap();

        assert!(summary.resized.is_empty());
        assert_eq!(summary.created.len(), 1);
        assert_eq!(summary.created[0].size, 2);

        let journal = store.journal().await;
        let Mutation::ScalesetCreated(request) = &journal[0] else {
            panic!("expected a create, got {journal:?}");
        };
        assert_eq!(request.size, 2);
        assert_eq!(request.region, "eastus");
        assert_eq!(request.tags.get(POOL_TAG).map(String::as_str), Some("linux"));
    }

    #[tokio::test]
    async fn test_fills_before_creating() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", Some(autoscale(0, None, 5)));
        let existing = scaleset("linux", ScalesetState::Running, 3);

        let summary = allocator(&store)
            .scale_up(&pool, &[existing.clone()], 4)
            .await
            .unwrap();

        assert_eq!(
            summary.resized,
            vec![ScalesetResize {
                scaleset_id: existing.scaleset_id,
                from: 3,
                to: 5
            }]
        );
        assert_eq!(summary.created.len(), 1);
        assert_eq!(summary.created[0].size, 2);
        assert_eq!(summary.nodes_added(), 4);

        let journal = store.journal().await;
        assert_eq!(
            journal[0],
            Mutation::ScalesetSaved {
                scaleset_id: existing.scaleset_id,
                size: 5,
                state: ScalesetState::Resize,
            }
        );
        assert!(matches!(journal[1], Mutation::ScalesetCreated(_)));
    }

    #[tokio::test]
    async fn test_stops_once_demand_met() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", Some(autoscale(0, None, 5)));
        let first = scaleset("linux", ScalesetState::Running, 1);
        let second = scaleset("linux", ScalesetState::Running, 1);

        let summary = allocator(&store)
            .scale_up(&pool, &[first.clone(), second], 3)
            .await
            .unwrap();

        assert_eq!(summary.resized.len(), 1);
        assert_eq!(summary.resized[0].scaleset_id, first.scaleset_id);
        assert_eq!(summary.resized[0].to, 4);
        assert!(summary.created.is_empty());
        assert_eq!(store.journal().await.len(), 1);
    }

    #[tokio::test]
    async fn test_skips_non_running_and_full_scalesets() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", Some(autoscale(0, None, 5)));
        let failed = scaleset("linux", ScalesetState::CreationFailed, 0);
        let full = scaleset("linux", ScalesetState::Running, 5);

        let summary = allocator(&store)
            .scale_up(&pool, &[failed, full], 3)
            .await
            .unwrap();

        assert!(summary.resized.is_empty());
        assert_eq!(summary.created.len(), 1);
        assert_eq!(summary.created[0].size, 3);
    }

    #[tokio::test]
    async fn test_splits_across_new_scalesets() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", Some(autoscale(0, None, 5)));

        let summary = allocator(&store).scale_up(&pool, &[], 12).await.unwrap();

        let sizes: Vec<u32> = summary.created.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
    }

    #[tokio::test]
    async fn test_custom_image_caps_scaleset() {
        let store = Arc::new(InMemoryFleet::new());
        let mut config = autoscale(0, None, 1000);
        config.image = "/subscriptions/0000/images/fuzz".to_string();
        let pool = pool("linux", Some(config));

        let summary = allocator(&store).scale_up(&pool, &[], 700).await.unwrap();

        let sizes: Vec<u32> = summary.created.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![CUSTOM_IMAGE_MAX_SIZE, 100]);
    }

    #[tokio::test]
    async fn test_missing_region_fails_before_create() {
        let store = Arc::new(InMemoryFleet::new());
        let mut config = autoscale(0, None, 5);
        config.region = None;
        let pool = pool("linux", Some(config));
        let existing = scaleset("linux", ScalesetState::Running, 4);

        let result = allocator(&store)
            .scale_up(&pool, &[existing.clone()], 3)
            .await;

        assert!(matches!(result, Err(ScalingError::MissingRegion { .. })));
        // The fill that fit is kept; nothing was created.
        assert_eq!(
            store.journal().await,
            vec![Mutation::ScalesetSaved {
                scaleset_id: existing.scaleset_id,
                size: 5,
                state: ScalesetState::Resize,
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_region_ignored_when_fills_suffice() {
        let store = Arc::new(InMemoryFleet::new());
        let mut config = autoscale(0, None, 5);
        config.region = None;
        let pool = pool("linux", Some(config));

        let summary = allocator(&store)
            .scale_up(&pool, &[scaleset("linux", ScalesetState::Running, 1)], 2)
            .await
            .unwrap();

        assert_eq!(summary.nodes_added(), 2);
    }

    #[tokio::test]
    async fn test_no_autoscale_is_noop() {
        let store = Arc::new(InMemoryFleet::new());
        let pool = pool("linux", None);

        let summary = allocator(&store).scale_up(&pool, &[], 5).await.unwrap();

        assert_eq!(summary, ScaleUpSummary::default());
        assert!(store.journal().await.is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(InMemoryFleet::new());
        store.set_fail_writes(true);
        let pool = pool("linux", Some(autoscale(0, None, 5)));

        let result = allocator(&store).scale_up(&pool, &[], 2).await;

        assert!(matches!(result, Err(ScalingError::Store(_))));
    }
}
