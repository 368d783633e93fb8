//! Prediction logging middleware
//!
//! Wraps `POST /predict`: captures the raw input, the outcome, status code,
//! duration and error, hands one [`LogEntry`] to the active sink, then returns
//! the handler's response untouched.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value};

use crate::{AppError, AppState};
use crate::models::LogEntry;

/// Largest request body buffered for logging
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Middleware: log every prediction request, successful or not
pub async fn log_predictions(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::POST {
        return next.run(req).await;
    }

    let started = Instant::now();
    let (parts, body) = req.into_parts();

    let request_bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            let response = AppError::BadRequest(format!("Failed to read request body: {}", e))
                .into_response();
            return record(&state, empty_object(), elapsed_ms(started), response).await;
        }
    };

    let input = parse_or_empty(&request_bytes);

    let response = next
        .run(Request::from_parts(parts, Body::from(request_bytes)))
        .await;

    record(&state, input, elapsed_ms(started), response).await
}

async fn record(state: &AppState, input: Value, duration_ms: f64, response: Response) -> Response {
    let (parts, body) = response.into_parts();

    let (body, captured) = match tee_body(body).await {
        Ok(tee) => tee,
        Err(e) => {
            // The body is gone; nothing left to pass through
            tracing::error!("Failed to buffer prediction response: {}", e);
            let entry = LogEntry::new(input)
                .with_status(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), duration_ms)
                .with_error(Some(format!("response body error: {}", e)));
            state.sink.write(&entry).await;
            return AppError::Internal(e.to_string()).into_response();
        }
    };

    let output = parse_or_empty(&captured);

    let entry = LogEntry::new(input)
        .with_outcome(&output)
        .with_status(parts.status.as_u16(), duration_ms)
        .with_error(error_text(parts.status, &output));

    state.sink.write(&entry).await;

    Response::from_parts(parts, body)
}

/// Buffer a body into a captured copy plus a byte-identical pass-through body
pub async fn tee_body(body: Body) -> Result<(Body, Bytes), axum::Error> {
    let bytes = axum::body::to_bytes(body, usize::MAX).await?;
    Ok((Body::from(bytes.clone()), bytes))
}

/// Parsed JSON, or `{}` when the bytes are not valid JSON
pub fn parse_or_empty(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap_or_else(|_| empty_object())
}

/// Error text for 4xx/5xx responses, `None` otherwise
fn error_text(status: StatusCode, body: &Value) -> Option<String> {
    if !(status.is_client_error() || status.is_server_error()) {
        return None;
    }

    let message = body
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_else(|| status.to_string());

    let fields: Vec<&str> = body
        .get("detail")
        .and_then(Value::as_array)
        .map(|issues| {
            issues
                .iter()
                .filter_map(|issue| issue.get("field").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    if fields.is_empty() {
        Some(message)
    } else {
        Some(format!("{}: {}", message, fields.join(", ")))
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
