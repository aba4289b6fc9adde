//! Symptom-check backend contract.
//!
//! Two calls: an availability probe and the analysis request. The backend is
//! an external collaborator; this module only fixes the wire shapes and how
//! replies are interpreted.

pub mod http;
#[cfg(test)]
pub mod scripted;

pub use http::HttpSymptomApi;

use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{AnalysisResult, RequestPayload};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Backend is not reachable at {0}")]
    Connection(String),

    /// Any non-2xx status. The body is kept for logs but never shown.
    #[error("Server error: {status}")]
    Http { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Reply of `GET /debug/api-status`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiStatus {
    /// `None` when the backend did not report it.
    #[serde(default)]
    pub deepseek_api_available: Option<bool>,
}

/// Interpreted reply of `POST /check` with a 2xx status.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResponse {
    /// Analysis completed.
    Completed {
        session_id: Option<String>,
        result: AnalysisResult,
    },
    /// The backend answered but reported an `error` field.
    Rejected { error: String },
}

impl CheckResponse {
    /// Interpret a decoded JSON body.
    ///
    /// An `error` field wins over everything else. Otherwise `result` must be
    /// an object; its contents are decoded leniently. `session_id` may be a
    /// string or a number.
    pub fn from_json(body: Value) -> Result<Self, ClientError> {
        let Value::Object(mut map) = body else {
            return Err(ClientError::ResponseParsing(
                "expected a JSON object".to_string(),
            ));
        };

        if let Some(error) = map.get("error").and_then(error_text) {
            return Ok(Self::Rejected { error });
        }

        let session_id = match map.get("session_id") {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        match map.remove("result") {
            Some(result @ Value::Object(_)) => Ok(Self::Completed {
                session_id,
                result: AnalysisResult::from(result),
            }),
            _ => Err(ClientError::ResponseParsing(
                "missing analysis result".to_string(),
            )),
        }
    }
}

/// A truthy `error` value, rendered as text.
fn error_text(value: &Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Backend used by the chat controller.
///
/// Futures are `Send` so calls can run as independent tasks that report back
/// to the controller loop.
pub trait SymptomApi: Send + Sync + 'static {
    /// Probe which analysis modes the backend can serve.
    fn check_status(&self) -> impl Future<Output = Result<ApiStatus, ClientError>> + Send;

    /// Submit one symptom check.
    fn analyze(
        &self,
        payload: &RequestPayload,
    ) -> impl Future<Output = Result<CheckResponse, ClientError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn completed_response_with_string_session() {
        let response = CheckResponse::from_json(json!({
            "session_id": "abc123",
            "result": {"advice": "Rest and hydrate"}
        }))
        .unwrap();
        match response {
            CheckResponse::Completed { session_id, result } => {
                assert_eq!(session_id.as_deref(), Some("abc123"));
                assert_eq!(result.advice.as_deref(), Some("Rest and hydrate"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn numeric_session_id_is_kept_as_text() {
        let response =
            CheckResponse::from_json(json!({"session_id": 17, "result": {}})).unwrap();
        assert_eq!(
            response,
            CheckResponse::Completed {
                session_id: Some("17".to_string()),
                result: AnalysisResult::default(),
            }
        );
    }

    #[test]
    fn error_field_wins() {
        let response = CheckResponse::from_json(json!({
            "error": "Please enter symptoms.",
            "result": {"advice": "ignored"}
        }))
        .unwrap();
        assert_eq!(
            response,
            CheckResponse::Rejected {
                error: "Please enter symptoms.".to_string()
            }
        );
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        for error in [json!(null), json!(""), json!(false)] {
            let response =
                CheckResponse::from_json(json!({"error": error, "result": {}})).unwrap();
            assert!(matches!(response, CheckResponse::Completed { .. }));
        }
    }

    #[test]
    fn missing_result_is_a_parse_error() {
        let err = CheckResponse::from_json(json!({"session_id": "x"})).unwrap_err();
        assert!(matches!(err, ClientError::ResponseParsing(_)));
    }

    #[test]
    fn non_object_body_is_a_parse_error() {
        let err = CheckResponse::from_json(json!(["nope"])).unwrap_err();
        assert!(matches!(err, ClientError::ResponseParsing(_)));
    }

    #[test]
    fn http_error_message_hides_body() {
        let err = ClientError::Http {
            status: 500,
            body: "Traceback (most recent call last)".to_string(),
        };
        assert_eq!(err.to_string(), "Server error: 500");
    }

    #[test]
    fn status_field_is_optional() {
        let status: ApiStatus = serde_json::from_value(json!({"environment_loaded": true})).unwrap();
        assert_eq!(status.deepseek_api_available, None);
        let status: ApiStatus =
            serde_json::from_value(json!({"deepseek_api_available": false})).unwrap();
        assert_eq!(status.deepseek_api_available, Some(false));
    }
}
