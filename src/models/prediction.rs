//! Prediction outcome model

use serde::{Deserialize, Serialize};

use crate::model::{decide, round_probability, CreditDecision};

/// Response body of a successful `/predict`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    pub prediction: u8,
    pub probability_default: f64,
    pub credit_decision: CreditDecision,
}

impl PredictionOutcome {
    /// Round the probability, then apply the threshold to the published value
    pub fn from_probability(probability: f64) -> Self {
        let probability_default = round_probability(probability);
        let decision = decide(probability_default);

        Self {
            prediction: decision.prediction,
            probability_default,
            credit_decision: decision.credit_decision,
        }
    }
}
