//! Prediction log handlers

use axum::{
    extract::{Query, State},
    Json,
};
use validator::Validate;

use crate::{AppResult, AppState};
use crate::models::{PredictionLog, PredictionQuery};

/// List logged predictions, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PredictionQuery>,
) -> AppResult<Json<Vec<PredictionLog>>> {
    query.validate()?;

    let logs = state.sink.recent(query.limit(), query.offset()).await?;
    Ok(Json(logs))
}
