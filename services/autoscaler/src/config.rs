use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use fuzzfleet_reconcile::DEFAULT_RECONCILE_INTERVAL;

use crate::scaling::PoolFailurePolicy;

#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub log_level: String,
    pub tick_interval: Duration,
    pub failure_policy: PoolFailurePolicy,
    pub seed_file: Option<PathBuf>,
    pub deployment: DeploymentConfig,
}

/// Where this instance runs, as reported by `/info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentConfig {
    pub resource_group: String,
    pub region: String,
    pub subscription: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let listen_addr: SocketAddr = var("FUZZFLEET_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string())
            .parse()
            .context("invalid FUZZFLEET_LISTEN_ADDR")?;

        let log_level = var("FUZZFLEET_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let tick_interval = match var("FUZZFLEET_TICK_INTERVAL_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("invalid FUZZFLEET_TICK_INTERVAL_SECS '{raw}'"))?;
                if secs == 0 {
                    bail!("FUZZFLEET_TICK_INTERVAL_SECS must be greater than zero");
                }
                Duration::from_secs(secs)
            }
            None => DEFAULT_RECONCILE_INTERVAL,
        };

        let failure_policy = match var("FUZZFLEET_POOL_FAILURE_POLICY") {
            Some(raw) => raw
                .parse::<PoolFailurePolicy>()
                .map_err(|e: String| anyhow!(e))
                .context("invalid FUZZFLEET_POOL_FAILURE_POLICY")?,
            None => PoolFailurePolicy::default(),
        };

        let seed_file = var("FUZZFLEET_SEED_FILE")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);

        let deployment = DeploymentConfig {
            resource_group: var("FUZZFLEET_RESOURCE_GROUP")
                .unwrap_or_else(|| "fuzzfleet".to_string()),
            region: var("FUZZFLEET_REGION").unwrap_or_else(|| "unknown".to_string()),
            subscription: var("FUZZFLEET_SUBSCRIPTION").unwrap_or_else(|| "unknown".to_string()),
        };

        Ok(Self {
            listen_addr,
            log_level,
            tick_interval,
            failure_policy,
            seed_file,
            deployment,
        })
    }
}
