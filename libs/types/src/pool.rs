//! Pools and their autoscale policy.

use fuzzfleet_id::{PoolId, PoolName};
use serde::{Deserialize, Serialize};

use crate::{AutoScaleConfigError, PoolState};

/// A named group of worker capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    pub pool_id: PoolId,
    pub name: PoolName,
    pub state: PoolState,

    /// Pools without a policy are managed by hand and never scaled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autoscale: Option<AutoScaleConfig>,
}

/// Per-pool autoscale policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoScaleConfig {
    /// Machine image for new scalesets.
    pub image: String,

    /// Upper bound on pool size. `None` and `Some(0)` both mean unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,

    /// Lower bound on pool size, held even with no queued work.
    #[serde(default)]
    pub min_size: u32,

    /// Region for new scalesets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Target size of each scaleset.
    pub scaleset_size: u32,

    #[serde(default)]
    pub spot_instances: bool,

    /// VM class for new scalesets.
    pub vm_sku: String,
}

impl AutoScaleConfig {
    /// The effective upper bound on pool size.
    pub fn max_size(&self) -> Option<u32> {
        self.max_size.filter(|max| *max > 0)
    }

    /// The configured region, treating a blank value as unset.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref().filter(|r| !r.trim().is_empty())
    }

    /// Checks that the policy is internally consistent.
    pub fn validate(&self) -> Result<(), AutoScaleConfigError> {
        if let Some(max_size) = self.max_size() {
            if self.min_size > max_size {
                return Err(AutoScaleConfigError::MinExceedsMax {
                    min_size: self.min_size,
                    max_size,
                });
            }
        }
        if self.scaleset_size == 0 {
            return Err(AutoScaleConfigError::ZeroScalesetSize);
        }
        if self.vm_sku.trim().is_empty() {
            return Err(AutoScaleConfigError::MissingField("vm_sku"));
        }
        if self.image.trim().is_empty() {
            return Err(AutoScaleConfigError::MissingField("image"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AutoScaleConfig {
        AutoScaleConfig {
            image: "Canonical:UbuntuServer:18.04-LTS:latest".to_string(),
            max_size: Some(10),
            min_size: 2,
            region: Some("eastus".to_string()),
            scaleset_size: 5,
            spot_instances: false,
            vm_sku: "Standard_D2s_v3".to_string(),
        }
    }

    #[test]
    fn test_valid_config() {
        assert_eq!(config().validate(), Ok(()));
    }

    #[test]
    fn test_min_exceeds_max() {
        let mut cfg = config();
        cfg.min_size = 11;
        assert_eq!(
            cfg.validate(),
            Err(AutoScaleConfigError::MinExceedsMax {
                min_size: 11,
                max_size: 10
            })
        );
    }

    #[test]
    fn test_zero_max_is_unbounded() {
        let mut cfg = config();
        cfg.max_size = Some(0);
        cfg.min_size = 50;
        assert_eq!(cfg.max_size(), None);
        assert_eq!(cfg.validate(), Ok(()));
    }

    #[test]
    fn test_zero_scaleset_size_rejected() {
        let mut cfg = config();
        cfg.scaleset_size = 0;
        assert_eq!(cfg.validate(), Err(AutoScaleConfigError::ZeroScalesetSize));
    }

    #[test]
    fn test_blank_region_is_unset() {
        let mut cfg = config();
        cfg.region = Some("  ".to_string());
        assert_eq!(cfg.region(), None);
    }

    #[test]
    fn test_defaults_from_json() {
        let cfg: AutoScaleConfig = serde_json::from_str(
            r#"{"image": "img", "scaleset_size": 3, "vm_sku": "sku"}"#,
        )
        .unwrap();
        assert_eq!(cfg.min_size, 0);
        assert_eq!(cfg.max_size(), None);
        assert_eq!(cfg.region(), None);
        assert!(!cfg.spot_instances);
    }
}
