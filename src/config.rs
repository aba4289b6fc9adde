use std::time::Duration;

use crate::models::ApiMode;

/// Application-level constants
pub const APP_NAME: &str = "symptom-chat";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Backend used when neither flag nor environment names one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Pause before a canned reply to a non-medical message.
pub const CANNED_REPLY_DELAY: Duration = Duration::from_millis(1000);

/// Pause between the analysis reply and the follow-up prompt.
pub const FOLLOW_UP_DELAY: Duration = Duration::from_millis(500);

/// How long a toast stays on screen.
pub const TOAST_DURATION: Duration = Duration::from_millis(3500);

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> String {
    format!("{}=info,symptom_chat_lib=info,warn", APP_NAME.replace('-', "_"))
}

/// Delays the controller applies to timer-driven UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub canned_reply_delay: Duration,
    pub follow_up_delay: Duration,
    pub toast_duration: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            canned_reply_delay: CANNED_REPLY_DELAY,
            follow_up_delay: FOLLOW_UP_DELAY,
            toast_duration: TOAST_DURATION,
        }
    }
}

/// Runtime configuration for one chat client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend root, without trailing slash.
    pub base_url: String,
    /// Analysis mode requested on every check.
    pub api_mode: ApiMode,
    pub timings: Timings,
}

impl ClientConfig {
    pub fn new(base_url: &str, api_mode: ApiMode) -> Self {
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            api_mode,
            timings: Timings::default(),
        }
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn check_url(&self) -> String {
        format!("{}/check", self.base_url)
    }

    pub fn status_url(&self) -> String {
        format!("{}/debug/api-status", self.base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL, ApiMode::default())
    }
}
