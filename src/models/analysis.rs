//! Structured assessment returned by the symptom-check backend.
//!
//! The backend is not trusted to send a complete or well-typed object: any
//! field may be missing, empty, `null`, or of the wrong JSON type. Decoding
//! goes through `serde_json::Value` so every field lands on a defined default
//! instead of failing the whole response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A candidate condition with its estimated probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct Condition {
    /// Display name. No default is substituted when the backend omits it.
    pub name: Option<String>,
    /// Probability in `[0, 1]`. Missing or non-numeric values decode as 0.
    pub probability: f64,
}

impl Condition {
    pub fn new(name: &str, probability: f64) -> Self {
        Self {
            name: Some(name.to_string()),
            probability: clamp_probability(probability),
        }
    }

    /// Probability as an integer percentage in `[0, 100]`.
    pub fn percent(&self) -> u8 {
        (clamp_probability(self.probability) * 100.0).round() as u8
    }
}

impl From<Value> for Condition {
    fn from(value: Value) -> Self {
        let name = non_empty_str(value.get("name"));
        let probability = value
            .get("probability")
            .and_then(number_like)
            .map(clamp_probability)
            .unwrap_or(0.0);
        Self { name, probability }
    }
}

/// Full analysis for one symptom check.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct AnalysisResult {
    pub triage: Option<String>,
    pub advice: Option<String>,
    /// Assumed pre-ranked by the backend; order is preserved.
    pub conditions: Vec<Condition>,
    pub selfcare: Vec<String>,
    pub warning: Vec<String>,
    pub summary: Option<String>,
}

impl From<Value> for AnalysisResult {
    fn from(value: Value) -> Self {
        let conditions = match value.get("conditions") {
            Some(Value::Array(items)) => items.iter().cloned().map(Condition::from).collect(),
            _ => Vec::new(),
        };

        Self {
            triage: non_empty_str(value.get("triage")),
            advice: non_empty_str(value.get("advice")),
            conditions,
            selfcare: string_list(value.get("selfcare")),
            warning: string_list(value.get("warning")),
            summary: non_empty_str(value.get("summary")),
        }
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}

/// Accepts JSON numbers and numeric strings ("0.4").
fn number_like(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        _ => None,
    }
}

/// A list of strings, one per entry the backend sent. `null` becomes an empty
/// item and other non-strings are shown as their JSON text.
fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
