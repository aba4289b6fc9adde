//! Driver for the conversation state machine.
//!
//! `ChatController` owns the [`ChatState`], feeds events through
//! [`transition`], and carries out the resulting effects: view updates run
//! inline, backend calls and timers run as tasks that post their outcome
//! back onto the controller's channel. All state changes happen on the
//! controller loop, one event at a time.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::mpsc;

use crate::client::SymptomApi;
use crate::config::ClientConfig;
use crate::intake;
use crate::models::{ChatTurn, PatientInfo, RequestPayload};
use crate::render::AnalysisView;
use crate::session::{transition, ChatEvent, ChatState, Effect, Timer, Toast};

/// Surface the controller draws on.
pub trait ChatView {
    fn append_turn(&mut self, turn: &ChatTurn);
    fn remove_welcome(&mut self);
    fn clear_composer(&mut self);
    fn set_typing(&mut self, visible: bool);
    fn set_loading(&mut self, visible: bool);
    /// Populate the results panel, reveal it and bring it into view.
    fn show_results(&mut self, view: &AnalysisView);
    fn show_toast(&mut self, toast: &Toast);
    fn hide_toast(&mut self);
    fn show_status_banner(&mut self, message: &str);
}

enum Inbound {
    Event(ChatEvent),
    Shutdown,
}

/// Cloneable sender for user input. Dropped silently once the controller
/// has stopped.
#[derive(Clone)]
pub struct ChatHandle {
    tx: mpsc::UnboundedSender<Inbound>,
}

impl ChatHandle {
    /// Queue a message. Returns `false` if the controller is gone.
    pub fn submit(&self, text: impl Into<String>, patient: PatientInfo) -> bool {
        self.tx
            .send(Inbound::Event(ChatEvent::Submit {
                text: text.into(),
                patient,
            }))
            .is_ok()
    }

    pub fn shutdown(&self) {
        let _ = self.tx.send(Inbound::Shutdown);
    }
}

pub struct ChatController<A: SymptomApi, V: ChatView> {
    state: ChatState,
    api: Arc<A>,
    view: V,
    tx: mpsc::UnboundedSender<Inbound>,
    rx: mpsc::UnboundedReceiver<Inbound>,
}

impl<A: SymptomApi, V: ChatView> ChatController<A, V> {
    pub fn new(api: Arc<A>, view: V, config: &ClientConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: ChatState::new(config.api_mode, config.timings),
            api,
            view,
            tx,
            rx,
        }
    }

    pub fn handle(&self) -> ChatHandle {
        ChatHandle {
            tx: self.tx.clone(),
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Start the availability probe. Its outcome arrives as an event.
    pub fn check_status(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = api.check_status().await;
            let _ = tx.send(Inbound::Event(ChatEvent::StatusChecked(outcome)));
        });
    }

    /// Apply one event and execute its effects.
    pub fn dispatch(&mut self, event: ChatEvent) {
        let state = std::mem::take(&mut self.state);
        let next = transition(state, event, Local::now());
        self.state = next.state;

        for effect in next.effects {
            self.execute(effect);
        }
    }

    /// Wait for the next queued event and apply it. Returns `false` on
    /// shutdown.
    pub async fn step(&mut self) -> bool {
        match self.rx.recv().await {
            Some(Inbound::Event(event)) => {
                self.dispatch(event);
                true
            }
            Some(Inbound::Shutdown) | None => false,
        }
    }

    /// Probe the backend, then process events until shutdown. Returns the
    /// final state.
    pub async fn run(mut self) -> ChatState {
        self.check_status();
        while self.step().await {}
        tracing::info!(
            turns = self.state.transcript.len(),
            session_id = ?self.state.session.id,
            "Chat controller stopped"
        );
        self.state
    }

    fn execute(&mut self, effect: Effect) {
        tracing::trace!(?effect, "Executing effect");
        match effect {
            Effect::AppendTurn(turn) => self.view.append_turn(&turn),
            Effect::RemoveWelcome => self.view.remove_welcome(),
            Effect::ClearComposer => self.view.clear_composer(),
            Effect::SetTyping(visible) => self.view.set_typing(visible),
            Effect::SetLoading(visible) => self.view.set_loading(visible),
            Effect::SendAnalysis(payload) => self.send_analysis(payload),
            Effect::ShowResults(result) => {
                self.view.show_results(&AnalysisView::from_result(&result))
            }
            Effect::ShowToast(toast) => self.view.show_toast(&toast),
            Effect::HideToast => self.view.hide_toast(),
            Effect::ShowStatusBanner(message) => self.view.show_status_banner(&message),
            Effect::Schedule { delay, timer } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = tx.send(Inbound::Event(timer_event(timer)));
                });
            }
        }
    }

    /// Run the request in its own task. Every outcome, failures included,
    /// comes back as one completion event; that event releases the busy flag.
    fn send_analysis(&self, payload: RequestPayload) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = api.analyze(&payload).await;
            let _ = tx.send(Inbound::Event(ChatEvent::AnalysisCompleted(outcome)));
        });
    }
}

/// The event a fired timer feeds back. The canned-reply variant is drawn
/// here so the state machine itself stays deterministic.
fn timer_event(timer: Timer) -> ChatEvent {
    match timer {
        Timer::CannedReply => ChatEvent::CannedReplyDue {
            variant: intake::random_reply_variant(),
        },
        Timer::FollowUp => ChatEvent::FollowUpDue,
        Timer::ToastExpiry(id) => ChatEvent::ToastExpired { id },
    }
}
