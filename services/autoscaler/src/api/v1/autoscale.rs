//! Autoscale status endpoint.

use axum::{extract::State, routing::get, Json, Router};

use crate::api::error::ApiError;
use crate::scaling::TickReport;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/status", get(status))
}

/// Latest tick report published by the worker.
async fn status(State(state): State<AppState>) -> Result<Json<TickReport>, ApiError> {
    state
        .history()
        .latest()
        .await
        .map(Json)
        .ok_or_else(|| ApiError::not_found("no_tick", "no autoscale tick has completed yet"))
}
