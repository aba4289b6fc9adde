//! Scripted backend for driver tests: replays queued replies and records
//! every payload it receives.

use std::collections::VecDeque;
use std::sync::Mutex;

use super::{ApiStatus, CheckResponse, ClientError, SymptomApi};
use crate::models::RequestPayload;

pub struct ScriptedSymptomApi {
    status: Mutex<Result<ApiStatus, ClientError>>,
    replies: Mutex<VecDeque<Result<CheckResponse, ClientError>>>,
    received: Mutex<Vec<RequestPayload>>,
}

impl ScriptedSymptomApi {
    pub fn new() -> Self {
        Self {
            status: Mutex::new(Ok(ApiStatus {
                deepseek_api_available: Some(true),
            })),
            replies: Mutex::new(VecDeque::new()),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn with_status(self, status: Result<ApiStatus, ClientError>) -> Self {
        *self.status.lock().unwrap() = status;
        self
    }

    pub fn with_reply(self, reply: Result<CheckResponse, ClientError>) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    /// Payloads received so far, in order.
    pub fn received(&self) -> Vec<RequestPayload> {
        self.received.lock().unwrap().clone()
    }
}

impl SymptomApi for ScriptedSymptomApi {
    async fn check_status(&self) -> Result<ApiStatus, ClientError> {
        self.status.lock().unwrap().clone()
    }

    async fn analyze(&self, payload: &RequestPayload) -> Result<CheckResponse, ClientError> {
        self.received.lock().unwrap().push(payload.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::HttpClient("no scripted reply".to_string())))
    }
}
