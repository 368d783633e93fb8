//! Prediction handler

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde_json::Value;

use crate::{AppError, AppResult, AppState};
use crate::models::{FeatureVector, PredictionOutcome, ValidationError};

/// Score one applicant
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<PredictionOutcome>> {
    let Json(payload) = payload
        .map_err(|rejection| AppError::Validation(ValidationError::body(rejection.body_text())))?;

    let features = FeatureVector::validate(&payload)?;

    // The runtime call is synchronous CPU work; keep it off the async workers
    let model = state.model.clone();
    let probability = tokio::task::spawn_blocking(move || model.score(&features))
        .await
        .map_err(|e| AppError::Internal(format!("scoring task failed: {}", e)))??;
    let outcome = PredictionOutcome::from_probability(probability);

    tracing::debug!(
        "Scored {} -> p={} ({})",
        features,
        outcome.probability_default,
        outcome.credit_decision
    );

    Ok(Json(outcome))
}
