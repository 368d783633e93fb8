//! Feature Contract - validated model input
//!
//! The layout below is the single source of truth for the order in which
//! features are fed to the model. Changing the order breaks every exported model.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

/// Total number of features
pub const FEATURE_COUNT: usize = 10;

/// Numeric kind a field must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Float,
    Integer,
}

/// One end of a field's valid range
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Inclusive(f64),
    Exclusive(f64),
}

/// Declared name, kind and range of a single feature
#[derive(Debug, Clone, Copy)]
pub struct FeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub min: Bound,
    pub max: Bound,
}

impl FeatureSpec {
    const fn float(name: &'static str, min: Bound, max: Bound) -> Self {
        Self { name, kind: FeatureKind::Float, min, max }
    }

    const fn integer(name: &'static str, min: Bound, max: Bound) -> Self {
        Self { name, kind: FeatureKind::Integer, min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        let above_min = match self.min {
            Bound::Inclusive(m) => value >= m,
            Bound::Exclusive(m) => value > m,
        };
        let below_max = match self.max {
            Bound::Inclusive(m) => value <= m,
            Bound::Exclusive(m) => value < m,
        };
        above_min && below_max
    }

    /// Interval notation, e.g. `(0, 1000000]`
    pub fn range_label(&self) -> String {
        let (open, lo) = match self.min {
            Bound::Inclusive(m) => ('[', m),
            Bound::Exclusive(m) => ('(', m),
        };
        let (close, hi) = match self.max {
            Bound::Inclusive(m) => (']', m),
            Bound::Exclusive(m) => (')', m),
        };
        format!("{open}{lo}, {hi}{close}")
    }
}

use Bound::{Exclusive, Inclusive};

/// Features in the exact order the model expects them
pub const FEATURE_LAYOUT: [FeatureSpec; FEATURE_COUNT] = [
    FeatureSpec::float("EXT_SOURCES_MEAN", Inclusive(0.0), Inclusive(1.0)),
    FeatureSpec::float("CREDIT_TERM", Inclusive(0.0), Inclusive(1.0)),
    FeatureSpec::float("EXT_SOURCE_3", Inclusive(0.0), Inclusive(1.0)),
    FeatureSpec::float("GOODS_PRICE_CREDIT_PERCENT", Inclusive(0.0), Inclusive(1.5)),
    FeatureSpec::float("INSTAL_AMT_PAYMENT_sum", Inclusive(0.0), Inclusive(1e8)),
    FeatureSpec::float("AMT_ANNUITY", Exclusive(0.0), Inclusive(1e6)),
    FeatureSpec::float("POS_CNT_INSTALMENT_FUTURE_mean", Inclusive(0.0), Inclusive(200.0)),
    FeatureSpec::integer("DAYS_BIRTH", Inclusive(-30000.0), Inclusive(-1.0)),
    FeatureSpec::float("EXT_SOURCES_WEIGHTED", Inclusive(0.0), Inclusive(3.0)),
    FeatureSpec::float("EXT_SOURCE_2", Inclusive(0.0), Inclusive(1.0)),
];

/// Typical applicant in layout order, used to exercise a freshly loaded model
pub const REFERENCE_APPLICANT: [f64; FEATURE_COUNT] = [
    0.524, 0.05, 0.535, 0.9, 318619.5, 24903.0, 6.95, -15750.0, 1.5, 0.566,
];

// ============================================================================
// VALIDATION ERRORS
// ============================================================================

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// Field absent from the payload
    Missing,
    /// Not a number (string, null, list, object)
    InvalidType,
    /// Fractional value for an integer field
    NotInteger,
    /// Outside the declared range
    OutOfRange,
    /// Payload itself is not a JSON object
    InvalidBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub code: IssueCode,
    pub message: String,
}

impl FieldIssue {
    fn new(field: &str, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            code,
            message: message.into(),
        }
    }

    /// Issue that applies to the whole request body rather than one field
    pub fn body(message: impl Into<String>) -> Self {
        Self::new("body", IssueCode::InvalidBody, message)
    }
}

/// Every problem found in a payload, in feature order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} invalid field(s): {}", self.issues.len(), self.field_names().join(", "))
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn body(message: impl Into<String>) -> Self {
        Self { issues: vec![FieldIssue::body(message)] }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.issues.iter().map(|i| i.field.as_str()).collect()
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.issues.iter().any(|i| i.field == name)
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// Validated, ordered input to the scorer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Validate a raw JSON payload, collecting every offending field
    pub fn validate(payload: &Value) -> Result<Self, ValidationError> {
        let object = payload.as_object().ok_or_else(|| {
            ValidationError::body(format!("expected a JSON object, got {}", json_kind(payload)))
        })?;

        let mut values = [0.0; FEATURE_COUNT];
        let mut issues = Vec::new();

        for (slot, spec) in values.iter_mut().zip(FEATURE_LAYOUT.iter()) {
            match check_field(spec, object) {
                Ok(v) => *slot = v,
                Err(issue) => issues.push(issue),
            }
        }

        if issues.is_empty() {
            Ok(Self { values })
        } else {
            Err(ValidationError { issues })
        }
    }

    /// Build from already-ordered values, applying the same range checks
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Result<Self, ValidationError> {
        let mut object = Map::new();
        for (spec, v) in FEATURE_LAYOUT.iter().zip(values) {
            let value = match spec.kind {
                FeatureKind::Integer if v.fract() == 0.0 => Value::from(v as i64),
                _ => Value::from(v),
            };
            object.insert(spec.name.to_string(), value);
        }
        Self::validate(&Value::Object(object))
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_LAYOUT
            .iter()
            .position(|spec| spec.name == name)
            .map(|idx| self.values[idx])
    }

    /// Row in model order, narrowed to the f32 the model was exported with
    pub fn to_f32_row(&self) -> [f32; FEATURE_COUNT] {
        self.values.map(|v| v as f32)
    }
}

impl fmt::Display for FeatureVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = FEATURE_LAYOUT
            .iter()
            .zip(self.values.iter())
            .map(|(spec, v)| format!("{}={}", spec.name, v))
            .collect();
        write!(f, "{}", parts.join(" "))
    }
}

fn check_field(spec: &FeatureSpec, object: &Map<String, Value>) -> Result<f64, FieldIssue> {
    let raw = object
        .get(spec.name)
        .ok_or_else(|| FieldIssue::new(spec.name, IssueCode::Missing, "field required"))?;

    let value = coerce(spec, raw)?;

    if !spec.contains(value) {
        return Err(FieldIssue::new(
            spec.name,
            IssueCode::OutOfRange,
            format!("value {} is outside {}", value, spec.range_label()),
        ));
    }

    Ok(value)
}

/// Numbers pass through; booleans become 1/0; everything else is rejected
fn coerce(spec: &FeatureSpec, raw: &Value) -> Result<f64, FieldIssue> {
    let value = match raw {
        Value::Bool(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        Value::Number(n) => match spec.kind {
            FeatureKind::Float => n.as_f64().ok_or_else(|| not_a_number(spec, raw))?,
            FeatureKind::Integer => {
                if let Some(i) = n.as_i64() {
                    i as f64
                } else {
                    let f = n.as_f64().ok_or_else(|| not_a_number(spec, raw))?;
                    if f.fract() != 0.0 {
                        return Err(FieldIssue::new(
                            spec.name,
                            IssueCode::NotInteger,
                            format!("expected an integer, got {}", f),
                        ));
                    }
                    f
                }
            }
        },
        _ => return Err(not_a_number(spec, raw)),
    };

    Ok(value)
}

fn not_a_number(spec: &FeatureSpec, raw: &Value) -> FieldIssue {
    let expected = match spec.kind {
        FeatureKind::Float => "a number",
        FeatureKind::Integer => "an integer",
    };
    FieldIssue::new(
        spec.name,
        IssueCode::InvalidType,
        format!("expected {}, got {}", expected, json_kind(raw)),
    )
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
