//! Service info endpoint.

use std::collections::BTreeMap;

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Build identity of one service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git: String,
    pub build: String,
}

impl VersionInfo {
    /// Identity of this binary.
    ///
    /// `FUZZFLEET_GIT_SHA` and `FUZZFLEET_BUILD_ID` are read at compile time.
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git: option_env!("FUZZFLEET_GIT_SHA")
                .unwrap_or("unknown")
                .to_string(),
            build: option_env!("FUZZFLEET_BUILD_ID")
                .unwrap_or("local")
                .to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InfoResponse {
    pub resource_group: String,
    pub region: String,
    pub subscription: String,
    pub versions: BTreeMap<String, VersionInfo>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/info", get(info))
}

async fn info(State(state): State<AppState>) -> Json<InfoResponse> {
    let deployment = state.deployment();
    let mut versions = BTreeMap::new();
    versions.insert("autoscaler".to_string(), VersionInfo::current());

    Json(InfoResponse {
        resource_group: deployment.resource_group.clone(),
        region: deployment.region.clone(),
        subscription: deployment.subscription.clone(),
        versions,
    })
}
