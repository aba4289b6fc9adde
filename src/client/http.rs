use serde_json::Value;

use super::{ApiStatus, CheckResponse, ClientError, SymptomApi};
use crate::config::ClientConfig;
use crate::models::RequestPayload;

/// HTTP client for the symptom-check backend.
///
/// No request timeout is set: a check waits until the backend answers or the
/// connection fails.
pub struct HttpSymptomApi {
    base_url: String,
    check_url: String,
    status_url: String,
    client: reqwest::Client,
}

impl HttpSymptomApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "{}/{}",
                crate::config::APP_NAME,
                crate::config::APP_VERSION
            ))
            .build()
            .map_err(|e| ClientError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            check_url: config.check_url(),
            status_url: config.status_url(),
            client,
        })
    }

    fn map_send_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_connect() {
            ClientError::Connection(self.base_url.clone())
        } else {
            ClientError::HttpClient(e.to_string())
        }
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "Backend returned error status");
            return Err(ClientError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }
}

impl SymptomApi for HttpSymptomApi {
    async fn check_status(&self) -> Result<ApiStatus, ClientError> {
        let response = self
            .client
            .get(&self.status_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body = self.read_json(response).await?;
        serde_json::from_value(body).map_err(|e| ClientError::ResponseParsing(e.to_string()))
    }

    async fn analyze(&self, payload: &RequestPayload) -> Result<CheckResponse, ClientError> {
        tracing::debug!(use_api = %payload.use_api, "Submitting symptom check");

        let response = self
            .client
            .post(&self.check_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let body = self.read_json(response).await?;
        CheckResponse::from_json(body)
    }
}
