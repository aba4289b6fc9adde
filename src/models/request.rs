use serde::{Deserialize, Serialize};

use super::enums::ApiMode;

/// Patient metadata entered alongside the chat. All fields are free text and
/// optional; blank values are sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub name: Option<String>,
}

impl PatientInfo {
    pub fn new(age: Option<&str>, gender: Option<&str>, name: Option<&str>) -> Self {
        Self {
            age: age.map(str::to_string),
            gender: gender.map(str::to_string),
            name: name.map(str::to_string),
        }
    }
}

/// Body of `POST /check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub symptoms: String,
    pub patient_name: Option<String>,
    pub use_api: ApiMode,
}

impl RequestPayload {
    /// Build a payload from already-trimmed symptom text.
    ///
    /// Returns `None` when `symptoms` is empty: the backend rejects that with a
    /// 400 and there is nothing to analyse.
    pub fn new(symptoms: &str, patient: &PatientInfo, use_api: ApiMode) -> Option<Self> {
        if symptoms.is_empty() {
            return None;
        }
        Some(Self {
            age: blank_to_none(patient.age.as_deref(), false),
            gender: blank_to_none(patient.gender.as_deref(), false),
            symptoms: symptoms.to_string(),
            patient_name: blank_to_none(patient.name.as_deref(), true),
            use_api,
        })
    }
}

/// Only the patient name is trimmed before sending; age and gender come from
/// fixed selectors and pass through as given.
fn blank_to_none(value: Option<&str>, trim: bool) -> Option<String> {
    let value = value?;
    let value = if trim { value.trim() } else { value };
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn anonymous_payload_serializes_nulls() {
        let payload =
            RequestPayload::new("I have a fever", &PatientInfo::default(), ApiMode::Mock).unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "age": null,
                "gender": null,
                "symptoms": "I have a fever",
                "patient_name": null,
                "use_api": "mock"
            })
        );
    }

    #[test]
    fn blank_fields_become_null_and_name_is_trimmed() {
        let patient = PatientInfo::new(Some(""), Some("female"), Some("  Ada  "));
        let payload = RequestPayload::new("cough", &patient, ApiMode::Deepseek).unwrap();
        assert_eq!(payload.age, None);
        assert_eq!(payload.gender.as_deref(), Some("female"));
        assert_eq!(payload.patient_name.as_deref(), Some("Ada"));
        assert_eq!(payload.use_api, ApiMode::Deepseek);
    }

    #[test]
    fn empty_symptoms_produce_no_payload() {
        assert!(RequestPayload::new("", &PatientInfo::default(), ApiMode::Mock).is_none());
    }
}
