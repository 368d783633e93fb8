//! Prediction log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use validator::Validate;

/// One logged `/predict` call. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    /// Raw request payload, kept even when it failed validation
    pub input_features: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability_default: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_decision: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    pub fn new(input_features: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            input_features,
            prediction: None,
            probability_default: None,
            credit_decision: None,
            status_code: None,
            duration_ms: None,
            error: None,
        }
    }

    /// Copy outcome fields out of a response body; absent or mistyped fields stay `None`
    pub fn with_outcome(mut self, response: &Value) -> Self {
        self.prediction = response
            .get("prediction")
            .and_then(Value::as_i64)
            .and_then(|p| i16::try_from(p).ok());
        self.probability_default = response.get("probability_default").and_then(Value::as_f64);
        self.credit_decision = response
            .get("credit_decision")
            .and_then(Value::as_str)
            .map(str::to_string);
        self
    }

    pub fn with_status(mut self, status_code: u16, duration_ms: f64) -> Self {
        self.status_code = Some(status_code);
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_error(mut self, error: Option<String>) -> Self {
        self.error = error;
        self
    }
}

/// A stored entry as read back from either sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PredictionLog {
    /// Row id; only present for entries stored in PostgreSQL
    pub id: Option<i64>,
    pub timestamp: DateTime<Utc>,
    pub input_features: Option<Value>,
    pub prediction: Option<i16>,
    pub probability_default: Option<f64>,
    pub credit_decision: Option<String>,
    pub status_code: Option<i32>,
    pub duration_ms: Option<f64>,
    pub error: Option<String>,
}

impl From<LogEntry> for PredictionLog {
    fn from(entry: LogEntry) -> Self {
        Self {
            id: None,
            timestamp: entry.timestamp,
            input_features: Some(entry.input_features),
            prediction: entry.prediction,
            probability_default: entry.probability_default,
            credit_decision: entry.credit_decision,
            status_code: entry.status_code.map(i32::from),
            duration_ms: entry.duration_ms,
            error: entry.error,
        }
    }
}

/// Pagination for `GET /predictions`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PredictionQuery {
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<i64>,
    #[validate(range(min = 0))]
    pub offset: Option<i64>,
}

impl PredictionQuery {
    pub const DEFAULT_LIMIT: i64 = 50;

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0)
    }
}
