use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::Config,
    db::RecommendationStore,
    middleware::{http_span, propagate_request_id},
    services::scheduler::{SchedulerConfig, ScoreWeights},
};

pub mod recommendations;
pub mod results;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecommendationStore>,
    pub config: Config,
    pub scheduler: SchedulerConfig,
}

impl AppState {
    /// Builds the state, deriving scheduler tunables from the config
    pub fn new(store: Arc<dyn RecommendationStore>, config: Config) -> Self {
        let scheduler = SchedulerConfig {
            weights: ScoreWeights::default(),
            bounds: config.day_part_bounds(),
        };
        Self {
            store,
            config,
            scheduler,
        }
    }
}

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/generate", post(recommendations::generate))
        .route("/recommendation-results", get(results::list))
        .with_state(state)
        // Request ids are assigned outside the trace layer so the span can
        // pick them up from the request extensions.
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(propagate_request_id))
                .layer(TraceLayer::new_for_http().make_span_with(http_span)),
        )
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
