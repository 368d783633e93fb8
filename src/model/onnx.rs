//! ONNX Runtime scorer

use std::path::Path;

use ndarray::Array2;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;
use parking_lot::Mutex;

use crate::models::{FeatureVector, FEATURE_COUNT};
use super::inference::{InferenceError, Scorer};

/// Exported classifier: `[1, 10]` f32 input, `[label, probabilities]` outputs
pub struct OnnxScorer {
    session: Mutex<Session>,
    probability_output: String,
    name: String,
}

impl OnnxScorer {
    /// Load ONNX model from file
    pub fn load(model_path: &Path) -> Result<Self, InferenceError> {
        tracing::info!("Loading ONNX model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(InferenceError::Load(format!("Model not found: {}", model_path.display())));
        }

        let session = Session::builder()
            .map_err(|e| InferenceError::Load(format!("Failed to create session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::Load(format!("Failed to set optimization: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| InferenceError::Load(format!("Failed to load model: {}", e)))?;

        // Classifier exports put probabilities second, after the label
        let probability_output = session.outputs.get(1)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| InferenceError::Load("No output defined".to_string()))?;

        tracing::debug!(
            "ONNX model has {} input(s), reading output '{}'",
            session.inputs.len(),
            probability_output
        );

        Ok(Self {
            session: Mutex::new(session),
            probability_output,
            name: format!("onnx:{}", model_path.display()),
        })
    }
}

impl Scorer for OnnxScorer {
    fn score(&self, features: &FeatureVector) -> Result<f64, InferenceError> {
        let row = features.to_f32_row();

        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), row.to_vec())
            .map_err(|e| InferenceError::Scoring(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Scoring(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Scoring(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.probability_output)
            .ok_or_else(|| InferenceError::Scoring("No output".to_string()))?;

        let (_, data) = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Scoring(format!(
                "Extract error (export the model with zipmap disabled): {}", e
            )))?;

        // [1, 2] holds (p_negative, p_positive); a single column is already p_positive
        let probability = match data.len() {
            1 => data[0],
            n if n >= 2 => data[1],
            _ => return Err(InferenceError::Scoring("Empty probability output".to_string())),
        };

        Ok(f64::from(probability))
    }

    fn name(&self) -> &str {
        &self.name
    }
}
