//! Inference Adapter
//!
//! Hides the concrete model runtime behind [`Scorer`] so handlers only ever
//! see `score(features) -> probability`.

use std::path::Path;
use std::sync::Arc;

use crate::models::{FeatureVector, REFERENCE_APPLICANT};

// ============================================================================
// ERROR HANDLING
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    /// No model has been loaded into the process
    #[error("model not loaded")]
    Unavailable,

    /// Model file missing or rejected by the runtime
    #[error("failed to load model: {0}")]
    Load(String),

    /// The runtime failed or produced an unusable value
    #[error("scoring failed: {0}")]
    Scoring(String),
}

// ============================================================================
// SCORER TRAIT
// ============================================================================

/// A loaded model able to score one feature vector
pub trait Scorer: Send + Sync {
    /// Probability of the positive (default) class
    fn score(&self, features: &FeatureVector) -> Result<f64, InferenceError>;

    /// Short description for logs and health output
    fn name(&self) -> &str;
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Shared handle to the process-wide model, possibly absent
#[derive(Clone, Default)]
pub struct InferenceAdapter {
    scorer: Option<Arc<dyn Scorer>>,
}

impl std::fmt::Debug for InferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceAdapter")
            .field("model", &self.scorer.as_ref().map(|s| s.name().to_string()))
            .finish()
    }
}

impl InferenceAdapter {
    pub fn new(scorer: Arc<dyn Scorer>) -> Self {
        Self { scorer: Some(scorer) }
    }

    /// Adapter with no model; every call to `score` reports `Unavailable`
    pub fn unloaded() -> Self {
        Self { scorer: None }
    }

    /// Load the ONNX model at `path`. Failure is logged and yields an
    /// unloaded adapter so the service can still start.
    pub fn load(path: &Path) -> Self {
        match load_scorer(path).and_then(Self::checked) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::error!("Model unavailable ({}): {}", path.display(), e);
                Self::unloaded()
            }
        }
    }

    /// Score the reference applicant once so a model with an unusable
    /// output is rejected at startup instead of on the first request
    pub fn checked(scorer: Arc<dyn Scorer>) -> Result<Self, InferenceError> {
        let adapter = Self::new(scorer);
        let reference = FeatureVector::from_values(REFERENCE_APPLICANT)
            .map_err(|e| InferenceError::Load(e.to_string()))?;
        let probability = adapter
            .score(&reference)
            .map_err(|e| InferenceError::Load(e.to_string()))?;

        tracing::info!(
            "Model loaded: {} (reference applicant p={:.4})",
            adapter.model_name().unwrap_or("unknown"),
            probability
        );
        Ok(adapter)
    }

    pub fn is_loaded(&self) -> bool {
        self.scorer.is_some()
    }

    pub fn model_name(&self) -> Option<&str> {
        self.scorer.as_deref().map(|s| s.name())
    }

    /// Score a validated vector. The result is always a finite value in [0, 1].
    pub fn score(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let scorer = self.scorer.as_ref().ok_or(InferenceError::Unavailable)?;
        let probability = scorer.score(features)?;

        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(InferenceError::Scoring(format!(
                "model returned probability {} outside [0, 1]",
                probability
            )));
        }

        Ok(probability)
    }
}

#[cfg(feature = "onnx")]
fn load_scorer(path: &Path) -> Result<Arc<dyn Scorer>, InferenceError> {
    Ok(Arc::new(super::onnx::OnnxScorer::load(path)?))
}

#[cfg(not(feature = "onnx"))]
fn load_scorer(_path: &Path) -> Result<Arc<dyn Scorer>, InferenceError> {
    Err(InferenceError::Load("built without the `onnx` feature".to_string()))
}
