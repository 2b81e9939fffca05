//! Scalesets: elastically sized groups of machines backing a pool.

use std::collections::BTreeMap;

use fuzzfleet_id::{PoolName, ScalesetId};
use serde::{Deserialize, Serialize};

use crate::{AutoScaleConfig, ScalesetState};

/// Size limit for scalesets built from marketplace images.
pub const MARKETPLACE_IMAGE_MAX_SIZE: u32 = 1000;

/// Size limit for scalesets built from custom images.
///
/// Custom images are referenced by resource path and are limited to a
/// single placement group.
pub const CUSTOM_IMAGE_MAX_SIZE: u32 = 600;

/// Tag key linking a scaleset to its pool.
pub const POOL_TAG: &str = "pool";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scaleset {
    pub scaleset_id: ScalesetId,
    pub pool_name: PoolName,
    pub state: ScalesetState,
    pub vm_sku: String,
    pub image: String,
    pub region: String,
    pub size: u32,
    #[serde(default)]
    pub spot_instances: bool,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl Scaleset {
    /// Largest size the platform allows for a scaleset of `image`.
    pub fn max_size_for_image(image: &str) -> u32 {
        if image.starts_with('/') {
            CUSTOM_IMAGE_MAX_SIZE
        } else {
            MARKETPLACE_IMAGE_MAX_SIZE
        }
    }

    /// Largest size the platform allows for this scaleset.
    pub fn max_size(&self) -> u32 {
        Self::max_size_for_image(&self.image)
    }

    /// Builds the record for a freshly requested scaleset.
    pub fn from_request(request: ScalesetCreate) -> Self {
        Self {
            scaleset_id: ScalesetId::new(),
            pool_name: request.pool_name,
            state: ScalesetState::Init,
            vm_sku: request.vm_sku,
            image: request.image,
            region: request.region,
            size: request.size,
            spot_instances: request.spot_instances,
            tags: request.tags,
        }
    }
}

/// Request to provision a new scaleset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalesetCreate {
    pub pool_name: PoolName,
    pub vm_sku: String,
    pub image: String,
    pub region: String,
    pub size: u32,
    pub spot_instances: bool,
    pub tags: BTreeMap<String, String>,
}

impl ScalesetCreate {
    /// Builds a request from a pool's autoscale policy, tagged with the pool.
    pub fn for_pool(
        pool_name: &PoolName,
        config: &AutoScaleConfig,
        region: &str,
        size: u32,
    ) -> Self {
        let tags = BTreeMap::from([(POOL_TAG.to_string(), pool_name.to_string())]);
        Self {
            pool_name: pool_name.clone(),
            vm_sku: config.vm_sku.clone(),
            image: config.image.clone(),
            region: region.to_string(),
            size,
            spot_instances: config.spot_instances,
            tags,
        }
    }
}
