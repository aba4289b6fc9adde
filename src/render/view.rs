use serde::Serialize;

use super::severity::classify_triage;
use crate::models::{AnalysisResult, Severity};

pub const TRIAGE_FALLBACK: &str = "Not specified";
pub const ADVICE_FALLBACK: &str = "No specific advice available.";
pub const NO_CONDITIONS: &str = "No specific conditions identified.";
pub const SELFCARE_FALLBACK: &str = "No specific self-care recommendations.";
pub const WARNING_FALLBACK: &str = "No specific warning signs listed.";
pub const SUMMARY_FALLBACK: &str = "No summary available.";

/// Display-ready condition row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionRow {
    /// Shown as-is; empty when the backend sent no name.
    pub name: String,
    /// Bar width and label, `0..=100`.
    pub percent: u8,
}

/// A list section: either the backend's items or a single muted fallback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListSection {
    pub items: Vec<String>,
    pub is_fallback: bool,
}

impl ListSection {
    fn from_items(items: &[String], fallback: &str) -> Self {
        if items.is_empty() {
            Self {
                items: vec![fallback.to_string()],
                is_fallback: true,
            }
        } else {
            Self {
                items: items.to_vec(),
                is_fallback: false,
            }
        }
    }
}

/// Results panel with every default already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisView {
    pub severity: Severity,
    pub severity_class: &'static str,
    pub triage_label: String,
    pub advice: String,
    /// Empty means "show the no-conditions placeholder".
    pub conditions: Vec<ConditionRow>,
    pub conditions_placeholder: &'static str,
    pub selfcare: ListSection,
    pub warning: ListSection,
    pub summary: String,
}

impl AnalysisView {
    pub fn from_result(result: &AnalysisResult) -> Self {
        let severity = classify_triage(result.triage.as_deref());

        Self {
            severity,
            severity_class: severity.css_class(),
            triage_label: result
                .triage
                .clone()
                .unwrap_or_else(|| TRIAGE_FALLBACK.to_string()),
            advice: result
                .advice
                .clone()
                .unwrap_or_else(|| ADVICE_FALLBACK.to_string()),
            conditions: result
                .conditions
                .iter()
                .map(|c| ConditionRow {
                    name: c.name.clone().unwrap_or_default(),
                    percent: c.percent(),
                })
                .collect(),
            conditions_placeholder: NO_CONDITIONS,
            selfcare: ListSection::from_items(&result.selfcare, SELFCARE_FALLBACK),
            warning: ListSection::from_items(&result.warning, WARNING_FALLBACK),
            summary: result
                .summary
                .clone()
                .unwrap_or_else(|| SUMMARY_FALLBACK.to_string()),
        }
    }
}
