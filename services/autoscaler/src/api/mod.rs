//! HTTP API handlers and routing.

pub mod error;
mod health;
mod info;
mod v1;

use axum::{
    http::{header, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::state::AppState;

/// Create the main API router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // Read-only surface
    let cors = CorsLayer::new()
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_origin(Any);

    Router::new()
        .merge(health::routes())
        .merge(info::routes())
        .nest("/v1", v1::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use crate::config::DeploymentConfig;
    use crate::scaling::TickHistory;

    pub(super) fn test_state(history: Arc<TickHistory>) -> AppState {
        AppState::new(
            DeploymentConfig {
                resource_group: "fuzzfleet-test".to_string(),
                region: "eastus".to_string(),
                subscription: "0000".to_string(),
            },
            history,
        )
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_router(test_state(Arc::new(TickHistory::new())));

        let response = app
            .oneshot(Request::get("/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_info_route_is_mounted() {
        let app = create_router(test_state(Arc::new(TickHistory::new())));

        let response = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["region"], "eastus");
    }
}
