//! Model Module - inference and decision policy
//!
//! Keeps the model runtime separate from the HTTP layer so the scorer can be
//! swapped without touching handlers.

pub mod inference;
pub mod threshold;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use inference::{InferenceAdapter, InferenceError, Scorer};
pub use threshold::{decide, round_probability, CreditDecision, Decision, DECISION_THRESHOLD};
