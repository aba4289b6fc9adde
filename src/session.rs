//! Conversation state machine.
//!
//! `transition` is a pure function: it takes the current [`ChatState`], one
//! [`ChatEvent`] and the wall-clock time, and returns the next state plus the
//! [`Effect`]s a driver must carry out (render a turn, start a request, arm a
//! timer, ...). Nothing here performs I/O, sleeps, or draws random numbers, so
//! every path can be tested without a UI.
//!
//! Cycle: `Idle → (AwaitingClassification | AwaitingBackend) → Idle`.

use std::time::Duration;

use chrono::{DateTime, Local};
use crate::client::{ApiStatus, CheckResponse, ClientError};
use crate::config::Timings;
use crate::intake::{self, MessageKind};
use crate::models::{
    AnalysisResult, ApiMode, ChatTurn, PatientInfo, RequestPayload, Session, ToastKind, Transcript,
};

pub const ANALYSIS_FALLBACK_REPLY: &str = "I've analyzed your symptoms.";
pub const FOLLOW_UP_PROMPT: &str = "Is there anything else you'd like to know about your symptoms or would you like to describe additional symptoms?";
pub const TRANSPORT_FAILURE_REPLY: &str =
    "I'm sorry, I encountered an error while analyzing your symptoms. Please try again.";
pub const STATUS_UNKNOWN_BANNER: &str =
    "Note: Unable to verify API status. Using mock data for demonstration.";
pub const DEEPSEEK_UNAVAILABLE_BANNER: &str =
    "DeepSeek Medical AI is currently unavailable. Using mock data for demonstration.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Non-medical message; waiting out the canned-reply delay.
    AwaitingClassification,
    /// One analysis request is in flight.
    AwaitingBackend,
}

/// What the availability probe has told us about the DeepSeek mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Unchecked,
    Available,
    Unavailable,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

/// Ambient visual state mirrored by the view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UiState {
    pub typing: bool,
    pub loading: bool,
    pub results_visible: bool,
    pub toast: Option<Toast>,
    pub status_banner: Option<String>,
}

/// Everything the controller owns between events.
#[derive(Debug, Clone)]
pub struct ChatState {
    pub phase: Phase,
    pub session: Session,
    pub transcript: Transcript,
    pub ui: UiState,
    /// Mode requested by configuration.
    pub api_mode: ApiMode,
    pub availability: Availability,
    timings: Timings,
    next_toast_id: u64,
}

impl ChatState {
    pub fn new(api_mode: ApiMode, timings: Timings) -> Self {
        Self {
            phase: Phase::Idle,
            session: Session::default(),
            transcript: Transcript::new(),
            ui: UiState::default(),
            api_mode,
            availability: Availability::Unchecked,
            timings,
            next_toast_id: 0,
        }
    }

    /// A request or canned reply is pending; new submissions are dropped.
    pub fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    /// Mode actually sent to the backend. DeepSeek falls back to mock once
    /// the probe has reported it unavailable.
    pub fn effective_mode(&self) -> ApiMode {
        match (self.api_mode, self.availability) {
            (ApiMode::Deepseek, Availability::Unavailable) => ApiMode::Mock,
            (mode, _) => mode,
        }
    }
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new(ApiMode::default(), Timings::default())
    }
}

/// Timers a driver arms on request. When one fires the driver feeds the
/// matching [`ChatEvent`] back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// Fires [`ChatEvent::CannedReplyDue`]; the driver picks the variant.
    CannedReply,
    /// Fires [`ChatEvent::FollowUpDue`].
    FollowUp,
    /// Fires [`ChatEvent::ToastExpired`] for this toast id.
    ToastExpiry(u64),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    Submit { text: String, patient: PatientInfo },
    CannedReplyDue { variant: usize },
    FollowUpDue,
    AnalysisCompleted(Result<CheckResponse, ClientError>),
    StatusChecked(Result<ApiStatus, ClientError>),
    ToastExpired { id: u64 },
}

/// Side effects requested by a transition, in execution order.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AppendTurn(ChatTurn),
    RemoveWelcome,
    ClearComposer,
    SetTyping(bool),
    SetLoading(bool),
    SendAnalysis(RequestPayload),
    /// Render the panel, make it visible and scroll it into view.
    ShowResults(AnalysisResult),
    ShowToast(Toast),
    HideToast,
    ShowStatusBanner(String),
    Schedule { delay: Duration, timer: Timer },
}

pub struct Transition {
    pub state: ChatState,
    pub effects: Vec<Effect>,
}

/// Advance the conversation by one event.
pub fn transition(state: ChatState, event: ChatEvent, now: DateTime<Local>) -> Transition {
    let mut t = Transition {
        state,
        effects: Vec::new(),
    };

    match event {
        ChatEvent::Submit { text, patient } => t.submit(&text, &patient, now),
        ChatEvent::CannedReplyDue { variant } => t.canned_reply(variant, now),
        ChatEvent::FollowUpDue => t.append(ChatTurn::assistant(FOLLOW_UP_PROMPT, now)),
        ChatEvent::AnalysisCompleted(outcome) => t.analysis_completed(outcome, now),
        ChatEvent::StatusChecked(outcome) => t.status_checked(outcome),
        ChatEvent::ToastExpired { id } => t.toast_expired(id),
    }

    t
}

impl Transition {
    fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    fn append(&mut self, turn: ChatTurn) {
        self.state.transcript.push(turn.clone());
        self.push(Effect::AppendTurn(turn));
    }

    fn set_typing(&mut self, visible: bool) {
        self.state.ui.typing = visible;
        self.push(Effect::SetTyping(visible));
    }

    fn set_loading(&mut self, visible: bool) {
        self.state.ui.loading = visible;
        self.push(Effect::SetLoading(visible));
    }

    fn show_toast(&mut self, message: String, kind: ToastKind) {
        self.state.next_toast_id += 1;
        let toast = Toast {
            id: self.state.next_toast_id,
            message,
            kind,
        };
        self.state.ui.toast = Some(toast.clone());
        self.push(Effect::ShowToast(toast.clone()));
        self.push(Effect::Schedule {
            delay: self.state.timings.toast_duration,
            timer: Timer::ToastExpiry(toast.id),
        });
    }

    fn submit(&mut self, raw: &str, patient: &PatientInfo, now: DateTime<Local>) {
        let Some(text) = intake::sanitize(raw) else {
            return;
        };
        if self.state.is_busy() {
            tracing::debug!(phase = ?self.state.phase, "Submission dropped while busy");
            return;
        }

        // The payload is settled before any effect goes out, so a submission
        // either runs to a busy phase or leaves no trace.
        let payload = match intake::classify_message(text) {
            MessageKind::General => None,
            MessageKind::Medical => {
                let mode = self.state.effective_mode();
                if mode != self.state.api_mode {
                    tracing::warn!(
                        requested = %self.state.api_mode,
                        using = %mode,
                        "Requested analysis mode unavailable, falling back"
                    );
                }
                let Some(payload) = RequestPayload::new(text, patient, mode) else {
                    return;
                };
                Some(payload)
            }
        };

        self.append(ChatTurn::user(text, now));
        if self.state.transcript.dismiss_welcome() {
            self.push(Effect::RemoveWelcome);
        }
        self.push(Effect::ClearComposer);
        self.set_typing(true);

        match payload {
            None => {
                self.state.phase = Phase::AwaitingClassification;
                self.push(Effect::Schedule {
                    delay: self.state.timings.canned_reply_delay,
                    timer: Timer::CannedReply,
                });
            }
            Some(payload) => {
                self.state.phase = Phase::AwaitingBackend;
                self.set_loading(true);
                self.push(Effect::SendAnalysis(payload));
            }
        }
    }

    fn canned_reply(&mut self, variant: usize, now: DateTime<Local>) {
        if self.state.phase != Phase::AwaitingClassification {
            tracing::debug!(phase = ?self.state.phase, "Stale canned reply ignored");
            return;
        }
        self.set_typing(false);
        self.append(ChatTurn::assistant(intake::clarifying_reply(variant), now));
        self.state.phase = Phase::Idle;
    }

    fn analysis_completed(
        &mut self,
        outcome: Result<CheckResponse, ClientError>,
        now: DateTime<Local>,
    ) {
        if self.state.phase != Phase::AwaitingBackend {
            tracing::debug!(phase = ?self.state.phase, "Stale analysis completion ignored");
            return;
        }

        // Busy flag clears on every path before anything else happens.
        self.state.phase = Phase::Idle;
        self.set_typing(false);
        self.set_loading(false);

        match outcome {
            Ok(CheckResponse::Completed { session_id, result }) => {
                if let Some(id) = session_id {
                    tracing::info!(session_id = %id, "Symptom check completed");
                    self.state.session.id = Some(id);
                }
                let reply = result
                    .advice
                    .clone()
                    .unwrap_or_else(|| ANALYSIS_FALLBACK_REPLY.to_string());
                self.append(ChatTurn::assistant(reply, now));
                self.state.ui.results_visible = true;
                self.push(Effect::ShowResults(result));
                self.push(Effect::Schedule {
                    delay: self.state.timings.follow_up_delay,
                    timer: Timer::FollowUp,
                });
            }
            Ok(CheckResponse::Rejected { error }) => {
                tracing::warn!(error = %error, "Backend rejected symptom check");
                self.append(ChatTurn::assistant(
                    format!("I encountered an error: {error}"),
                    now,
                ));
            }
            Err(e) => {
                tracing::error!(error = %e, "Symptom check failed");
                self.append(ChatTurn::assistant(TRANSPORT_FAILURE_REPLY, now));
                self.show_toast(format!("Analysis failed: {e}"), ToastKind::Error);
            }
        }
    }

    fn status_checked(&mut self, outcome: Result<ApiStatus, ClientError>) {
        let banner = match outcome {
            Ok(ApiStatus {
                deepseek_api_available: Some(true),
            }) => {
                self.state.availability = Availability::Available;
                None
            }
            Ok(ApiStatus {
                deepseek_api_available: Some(false),
            }) => {
                self.state.availability = Availability::Unavailable;
                Some(DEEPSEEK_UNAVAILABLE_BANNER)
            }
            Ok(ApiStatus {
                deepseek_api_available: None,
            }) => {
                tracing::warn!("API status response did not report availability");
                self.state.availability = Availability::Unknown;
                Some(STATUS_UNKNOWN_BANNER)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error checking API status");
                self.state.availability = Availability::Unknown;
                Some(STATUS_UNKNOWN_BANNER)
            }
        };

        if let Some(banner) = banner {
            self.state.ui.status_banner = Some(banner.to_string());
            self.push(Effect::ShowStatusBanner(banner.to_string()));
        }
    }

    fn toast_expired(&mut self, id: u64) {
        // A newer toast owns the slot and its own timer.
        if self.state.ui.toast.as_ref().is_some_and(|t| t.id == id) {
            self.state.ui.toast = None;
            self.push(Effect::HideToast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::{CLARIFYING_REPLIES, MEDICAL_KEYWORDS};
    use crate::models::{Condition, Speaker};
    use serde_json::json;

    fn now() -> DateTime<Local> {
        Local::now()
    }

    fn idle() -> ChatState {
        ChatState::new(ApiMode::Mock, Timings::default())
    }

    fn submit(state: ChatState, text: &str) -> Transition {
        transition(
            state,
            ChatEvent::Submit {
                text: text.to_string(),
                patient: PatientInfo::default(),
            },
            now(),
        )
    }

    fn sent_payloads(effects: &[Effect]) -> Vec<&RequestPayload> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::SendAnalysis(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    fn example_result() -> AnalysisResult {
        serde_json::from_value(json!({
            "triage": "GP within 48 hours",
            "advice": "Rest and hydrate",
            "conditions": [{"name": "Viral infection", "probability": 0.6}],
            "selfcare": ["Rest", "Fluids"],
            "warning": ["High fever >39°C"],
            "summary": "Likely viral."
        }))
        .unwrap()
    }

    fn in_flight() -> ChatState {
        submit(idle(), "I have a fever and headache").state
    }

    #[test]
    fn blank_submit_is_noop() {
        let t = submit(idle(), "   \n\t");
        assert!(t.effects.is_empty());
        assert!(t.state.transcript.is_empty());
        assert_eq!(t.state.phase, Phase::Idle);
        assert!(t.state.transcript.welcome_visible());
    }

    #[test]
    fn non_medical_input_never_sends() {
        for text in ["hello", "what time is it?", "thanks!", "Tell me a joke"] {
            let t = submit(idle(), text);
            assert!(sent_payloads(&t.effects).is_empty(), "{text} was sent");
            assert_eq!(t.state.phase, Phase::AwaitingClassification);
            assert!(t.effects.contains(&Effect::Schedule {
                delay: Timings::default().canned_reply_delay,
                timer: Timer::CannedReply,
            }));
        }
    }

    #[test]
    fn medical_input_sends_exactly_one_trimmed_request() {
        for keyword in MEDICAL_KEYWORDS {
            let text = format!("  my {keyword} is bad  ");
            let t = submit(idle(), &text);
            let payloads = sent_payloads(&t.effects);
            assert_eq!(payloads.len(), 1, "keyword {keyword}");
            assert_eq!(payloads[0].symptoms, text.trim());
            assert_eq!(t.state.phase, Phase::AwaitingBackend);
            assert!(t.state.ui.loading);
        }
    }

    #[test]
    fn typing_indicator_only_shows_with_a_pending_reply() {
        for text in ["hello", "  I have a cough ", "tell me a joke", "chest pain", "\u{a0}fever"] {
            let t = submit(idle(), text);
            if t.effects.contains(&Effect::SetTyping(true)) {
                assert!(t.state.is_busy(), "{text:?} left typing on while idle");
                assert!(t.state.ui.typing);
            } else {
                assert!(t.effects.is_empty(), "{text:?} emitted partial effects");
            }
        }
    }

    #[test]
    fn medical_submit_emits_effects_in_order() {
        let t = submit(idle(), "I have a fever");
        let turn = t.state.transcript.turns()[0].clone();
        let payload = RequestPayload::new("I have a fever", &PatientInfo::default(), ApiMode::Mock)
            .unwrap();
        assert_eq!(
            t.effects,
            vec![
                Effect::AppendTurn(turn),
                Effect::RemoveWelcome,
                Effect::ClearComposer,
                Effect::SetTyping(true),
                Effect::SetLoading(true),
                Effect::SendAnalysis(payload),
            ]
        );
    }

    #[test]
    fn submit_appends_user_turn_and_clears_welcome_once() {
        let t = submit(idle(), "hello");
        assert_eq!(t.state.transcript.len(), 1);
        assert_eq!(t.state.transcript.turns()[0].speaker, Speaker::User);
        assert_eq!(t.state.transcript.turns()[0].text, "hello");
        assert_eq!(
            &t.effects[..4],
            &[
                Effect::AppendTurn(t.state.transcript.turns()[0].clone()),
                Effect::RemoveWelcome,
                Effect::ClearComposer,
                Effect::SetTyping(true),
            ]
        );

        let state = transition(t.state, ChatEvent::CannedReplyDue { variant: 0 }, now()).state;
        let t = submit(state, "hello again");
        assert!(!t.effects.contains(&Effect::RemoveWelcome));
    }

    #[test]
    fn submit_while_busy_is_noop() {
        for busy in [in_flight(), submit(idle(), "hi").state] {
            let before = busy.transcript.len();
            let t = submit(busy, "I also have a cough");
            assert!(t.effects.is_empty());
            assert_eq!(t.state.transcript.len(), before);
        }
    }

    #[test]
    fn canned_reply_returns_to_idle() {
        let state = submit(idle(), "hello").state;
        let t = transition(state, ChatEvent::CannedReplyDue { variant: 2 }, now());
        assert_eq!(t.state.phase, Phase::Idle);
        assert!(!t.state.ui.typing);
        let last = t.state.transcript.last().unwrap();
        assert_eq!(last.speaker, Speaker::Assistant);
        assert_eq!(last.text, CLARIFYING_REPLIES[2]);
        assert_eq!(t.effects[0], Effect::SetTyping(false));
    }

    #[test]
    fn stale_canned_reply_is_ignored() {
        let t = transition(idle(), ChatEvent::CannedReplyDue { variant: 0 }, now());
        assert!(t.effects.is_empty());
        assert!(t.state.transcript.is_empty());

        let t = transition(in_flight(), ChatEvent::CannedReplyDue { variant: 0 }, now());
        assert!(t.effects.is_empty());
        assert_eq!(t.state.phase, Phase::AwaitingBackend);
    }

    #[test]
    fn end_to_end_success() {
        let t = submit(idle(), "I have a fever and headache");
        let payloads = sent_payloads(&t.effects);
        assert_eq!(
            serde_json::to_value(payloads[0]).unwrap(),
            json!({
                "age": null,
                "gender": null,
                "symptoms": "I have a fever and headache",
                "patient_name": null,
                "use_api": "mock"
            })
        );

        let t = transition(
            t.state,
            ChatEvent::AnalysisCompleted(Ok(CheckResponse::Completed {
                session_id: Some("abc123".to_string()),
                result: example_result(),
            })),
            now(),
        );

        assert_eq!(t.state.phase, Phase::Idle);
        assert!(!t.state.ui.loading);
        assert!(!t.state.ui.typing);
        assert!(t.state.ui.results_visible);
        assert_eq!(t.state.session.id.as_deref(), Some("abc123"));
        assert_eq!(t.state.transcript.last().unwrap().text, "Rest and hydrate");
        assert!(t.effects.contains(&Effect::ShowResults(example_result())));
        assert_eq!(
            t.effects.last(),
            Some(&Effect::Schedule {
                delay: Timings::default().follow_up_delay,
                timer: Timer::FollowUp,
            })
        );

        let t = transition(t.state, ChatEvent::FollowUpDue, now());
        assert_eq!(t.state.transcript.last().unwrap().text, FOLLOW_UP_PROMPT);
        assert_eq!(t.state.transcript.len(), 3);
    }

    #[test]
    fn missing_advice_uses_fallback_reply() {
        let t = transition(
            in_flight(),
            ChatEvent::AnalysisCompleted(Ok(CheckResponse::Completed {
                session_id: None,
                result: AnalysisResult {
                    conditions: vec![Condition::new("Flu", 0.73)],
                    ..Default::default()
                },
            })),
            now(),
        );
        assert_eq!(t.state.transcript.last().unwrap().text, ANALYSIS_FALLBACK_REPLY);
        assert!(!t.state.session.is_established());
    }

    #[test]
    fn backend_error_is_quoted_without_toast_or_results() {
        let t = transition(
            in_flight(),
            ChatEvent::AnalysisCompleted(Ok(CheckResponse::Rejected {
                error: "Please enter symptoms.".to_string(),
            })),
            now(),
        );
        assert_eq!(t.state.phase, Phase::Idle);
        assert!(!t.state.ui.loading);
        assert_eq!(
            t.state.transcript.last().unwrap().text,
            "I encountered an error: Please enter symptoms."
        );
        assert!(t.state.ui.toast.is_none());
        assert!(!t.state.ui.results_visible);
        assert!(!t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ShowResults(_) | Effect::ShowToast(_))));
    }

    #[test]
    fn http_500_hides_loading_clears_busy_and_toasts() {
        let t = transition(
            in_flight(),
            ChatEvent::AnalysisCompleted(Err(ClientError::Http {
                status: 500,
                body: String::new(),
            })),
            now(),
        );
        assert!(!t.state.is_busy());
        assert!(!t.state.ui.loading);
        assert!(!t.state.ui.results_visible);
        let toast = t.state.ui.toast.clone().unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Analysis failed: Server error: 500");
        assert_eq!(t.state.transcript.last().unwrap().text, TRANSPORT_FAILURE_REPLY);
        assert!(t.effects.contains(&Effect::SetLoading(false)));
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::ShowResults(_))));
        assert!(t.effects.contains(&Effect::Schedule {
            delay: Timings::default().toast_duration,
            timer: Timer::ToastExpiry(toast.id),
        }));
    }

    #[test]
    fn user_may_submit_again_after_failure() {
        let state = transition(
            in_flight(),
            ChatEvent::AnalysisCompleted(Err(ClientError::Connection("x".into()))),
            now(),
        )
        .state;
        let t = submit(state, "still coughing");
        assert_eq!(sent_payloads(&t.effects).len(), 1);
    }

    #[test]
    fn stale_completion_is_ignored() {
        let t = transition(
            idle(),
            ChatEvent::AnalysisCompleted(Ok(CheckResponse::Rejected {
                error: "late".into(),
            })),
            now(),
        );
        assert!(t.effects.is_empty());
        assert!(t.state.transcript.is_empty());
    }

    #[test]
    fn new_toast_replaces_old_and_old_timer_is_ignored() {
        let fail = || {
            ChatEvent::AnalysisCompleted(Err(ClientError::HttpClient("reset".into())))
        };
        let state = transition(in_flight(), fail(), now()).state;
        let first = state.ui.toast.clone().unwrap();

        let state = submit(state, "fever again").state;
        let state = transition(state, fail(), now()).state;
        let second = state.ui.toast.clone().unwrap();
        assert_ne!(first.id, second.id);

        let t = transition(state, ChatEvent::ToastExpired { id: first.id }, now());
        assert!(t.effects.is_empty());
        assert_eq!(t.state.ui.toast.as_ref(), Some(&second));

        let t = transition(t.state, ChatEvent::ToastExpired { id: second.id }, now());
        assert_eq!(t.effects, vec![Effect::HideToast]);
        assert!(t.state.ui.toast.is_none());
    }

    #[test]
    fn status_available_shows_no_banner() {
        let t = transition(
            idle(),
            ChatEvent::StatusChecked(Ok(ApiStatus {
                deepseek_api_available: Some(true),
            })),
            now(),
        );
        assert!(t.effects.is_empty());
        assert_eq!(t.state.availability, Availability::Available);
    }

    #[test]
    fn status_failure_or_absence_shows_unknown_banner() {
        for outcome in [
            Err(ClientError::Connection("http://x".into())),
            Ok(ApiStatus::default()),
        ] {
            let t = transition(idle(), ChatEvent::StatusChecked(outcome), now());
            assert_eq!(
                t.effects,
                vec![Effect::ShowStatusBanner(STATUS_UNKNOWN_BANNER.to_string())]
            );
            assert_eq!(t.state.availability, Availability::Unknown);
            assert!(!t.state.is_busy());
        }
    }

    #[test]
    fn unavailable_deepseek_falls_back_to_mock() {
        let state = ChatState::new(ApiMode::Deepseek, Timings::default());
        let t = transition(
            state,
            ChatEvent::StatusChecked(Ok(ApiStatus {
                deepseek_api_available: Some(false),
            })),
            now(),
        );
        assert_eq!(
            t.state.ui.status_banner.as_deref(),
            Some(DEEPSEEK_UNAVAILABLE_BANNER)
        );

        let t = submit(t.state, "chest pain");
        assert_eq!(sent_payloads(&t.effects)[0].use_api, ApiMode::Mock);
    }

    #[test]
    fn configured_mode_is_sent_when_available() {
        let state = ChatState::new(ApiMode::Deepseek, Timings::default());
        let t = submit(state, "chest pain");
        assert_eq!(sent_payloads(&t.effects)[0].use_api, ApiMode::Deepseek);
    }
}
