//! Decision Policy
//!
//! Turns a default probability into the binary outcome returned to clients.

use serde::{Deserialize, Serialize};

/// Probability at or above which credit is denied
pub const DECISION_THRESHOLD: f64 = 0.10;

/// Decimal places kept on the published probability
pub const PROBABILITY_DECIMALS: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreditDecision {
    Approved,
    Denied,
}

impl CreditDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            CreditDecision::Approved => "approved",
            CreditDecision::Denied => "denied",
        }
    }
}

impl std::fmt::Display for CreditDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Binary prediction plus its label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub prediction: u8,
    pub credit_decision: CreditDecision,
}

/// `prediction = 1` iff `probability >= DECISION_THRESHOLD`
pub fn decide(probability: f64) -> Decision {
    if probability >= DECISION_THRESHOLD {
        Decision { prediction: 1, credit_decision: CreditDecision::Denied }
    } else {
        Decision { prediction: 0, credit_decision: CreditDecision::Approved }
    }
}

/// Round to the precision published in responses
pub fn round_probability(probability: f64) -> f64 {
    let scale = 10f64.powi(PROBABILITY_DECIMALS);
    (probability * scale).round() / scale
}
