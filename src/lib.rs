//! Credit Scoring API
//!
//! Serves a pre-trained credit-default classifier over HTTP and logs every
//! prediction for drift monitoring.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      CREDIT SCORING API                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  POST /predict                                               │
//! │     │                                                        │
//! │     ▼                                                        │
//! │  ┌─────────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │ Prediction log  │──▶│ Feature      │──▶│ Inference     │  │
//! │  │ middleware      │   │ contract     │   │ + threshold   │  │
//! │  └────────┬────────┘   └──────────────┘   └───────────────┘  │
//! │           ▼                                                  │
//! │   ┌───────────────┐      fallback       ┌──────────────────┐ │
//! │   │  PostgreSQL   │ ──────────────────▶ │ predictions.jsonl│ │
//! │   └───────────────┘                     └──────────────────┘ │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod models;
pub mod sink;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
};
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};

pub use config::Config;
pub use error::{AppError, AppResult};
pub use model::{InferenceAdapter, Scorer};
pub use sink::PredictionSink;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub model: InferenceAdapter,
    pub sink: Arc<PredictionSink>,
}

impl AppState {
    pub fn new(config: Config, model: InferenceAdapter, sink: PredictionSink) -> Self {
        Self {
            config: Arc::new(config),
            model,
            sink: Arc::new(sink),
        }
    }
}

/// Create the main router with all routes
pub fn build_router(state: AppState) -> Router {
    // Only POST /predict is wrapped; the method router's 405 fallback stays unlogged
    let prediction_routes = Router::new().route(
        "/predict",
        post(handlers::predict::predict).route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::prediction_log::log_predictions,
        )),
    );

    let public_routes = Router::new()
        .route("/health", get(handlers::health::check))
        .route("/predictions", get(handlers::predictions::list));

    Router::new()
        .merge(public_routes)
        .merge(prediction_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
