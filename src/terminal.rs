//! Line-oriented front end: reads messages and slash commands from an async
//! reader, prints the conversation to a writer, and optionally mirrors the
//! latest results panel into an HTML file.

use std::fmt;
use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::client::SymptomApi;
use crate::composer::{self, QUICK_SYMPTOMS};
use crate::controller::{ChatController, ChatView};
use crate::models::{ChatTurn, PatientInfo, Speaker};
use crate::render::{AnalysisView, HtmlRenderer, ListSection, RenderError};
use crate::session::{ChatEvent, Toast};

pub const WELCOME_MESSAGE: &str = "Hello! I'm your medical assistant. I can help you understand your symptoms and provide guidance. How can I help you today?";

const HELP: &str = "Commands: /chips, /chip <n>, /session, /quit";

/// Input line, parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Chips,
    Chip(usize),
    Session,
    Help,
    Message(String),
    Empty,
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if !composer::can_send(line) {
            return Command::Empty;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Command::Message(line.to_string());
        };

        let mut parts = rest.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("quit" | "exit"), None) => Command::Quit,
            (Some("chips"), None) => Command::Chips,
            (Some("chip"), Some(n)) => n.parse().map(Command::Chip).unwrap_or(Command::Help),
            (Some("session"), None) => Command::Session,
            _ => Command::Help,
        }
    }
}

/// [`ChatView`] that prints to a writer.
pub struct TerminalView<W: Write> {
    out: W,
    renderer: HtmlRenderer,
    html_out: Option<PathBuf>,
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, html_out: Option<PathBuf>) -> Result<Self, RenderError> {
        Ok(Self {
            out,
            renderer: HtmlRenderer::new()?,
            html_out,
        })
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}").and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "Failed to write to terminal");
        }
    }

    fn welcome(&mut self) {
        self.line(format_args!("bot: {WELCOME_MESSAGE}"));
        self.line(format_args!("({HELP})"));
    }

    fn chips(&mut self) {
        for (i, symptom) in QUICK_SYMPTOMS.iter().enumerate() {
            self.line(format_args!("  {}. {symptom}", i + 1));
        }
    }

    fn list(&mut self, title: &str, section: &ListSection) {
        self.line(format_args!("{title}:"));
        for item in &section.items {
            if section.is_fallback {
                self.line(format_args!("  ({item})"));
            } else {
                self.line(format_args!("  - {item}"));
            }
        }
    }

    fn write_html(&self, view: &AnalysisView) {
        let Some(path) = &self.html_out else {
            return;
        };
        let written = self
            .renderer
            .render_results(view)
            .map_err(|e| e.to_string())
            .and_then(|html| std::fs::write(path, html).map_err(|e| e.to_string()));
        match written {
            Ok(()) => tracing::debug!(path = %path.display(), "Results panel written"),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "Failed to write results panel"),
        }
    }
}

impl<W: Write> ChatView for TerminalView<W> {
    fn append_turn(&mut self, turn: &ChatTurn) {
        let who = match turn.speaker {
            Speaker::User => "you",
            Speaker::Assistant => "bot",
        };
        self.line(format_args!("[{}] {who}: {}", turn.time_label(), turn.text));
    }

    // The welcome text has already scrolled past and input is consumed line
    // by line, so neither needs undoing.
    fn remove_welcome(&mut self) {}

    fn clear_composer(&mut self) {}

    fn set_typing(&mut self, visible: bool) {
        if visible {
            self.line(format_args!("bot is typing..."));
        }
    }

    fn set_loading(&mut self, visible: bool) {
        if visible {
            self.line(format_args!("Analyzing your symptoms..."));
        }
    }

    fn show_results(&mut self, view: &AnalysisView) {
        self.line(format_args!(
            "== Assessment: {} [{}] ==",
            view.triage_label, view.severity
        ));
        self.line(format_args!("{}", view.advice));
        self.line(format_args!("Possible conditions:"));
        if view.conditions.is_empty() {
            self.line(format_args!("  ({})", view.conditions_placeholder));
        }
        for condition in &view.conditions {
            self.line(format_args!("  - {} {}%", condition.name, condition.percent));
        }
        self.list("Self-care", &view.selfcare);
        self.list("Warning signs", &view.warning);
        self.line(format_args!("Summary: {}", view.summary));
        self.write_html(view);
    }

    fn show_toast(&mut self, toast: &Toast) {
        self.line(format_args!("[{}] {}", toast.kind, toast.message));
    }

    fn hide_toast(&mut self) {}

    fn show_status_banner(&mut self, message: &str) {
        self.line(format_args!("! {message}"));
    }
}

/// Run the terminal loop until `/quit` or end of input.
///
/// Input and controller events are interleaved on one task, so slash
/// commands see the controller state as of the last processed event.
pub async fn run<A, W, R>(
    mut controller: ChatController<A, TerminalView<W>>,
    input: R,
    patient: PatientInfo,
) -> std::io::Result<ChatController<A, TerminalView<W>>>
where
    A: SymptomApi,
    W: Write,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    controller.view_mut().welcome();
    controller.check_status();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match Command::parse(&line) {
                    Command::Quit => break,
                    Command::Empty => {}
                    Command::Help => controller.view_mut().line(format_args!("{HELP}")),
                    Command::Chips => controller.view_mut().chips(),
                    Command::Chip(n) => match composer::chip_prompt(n) {
                        Some(prompt) => submit(&mut controller, prompt, &patient),
                        None => controller
                            .view_mut()
                            .line(format_args!("No quick symptom #{n}; try /chips")),
                    },
                    Command::Session => {
                        let session = match &controller.state().session.id {
                            Some(id) => format!("session: {id}"),
                            None => "No session yet".to_string(),
                        };
                        controller.view_mut().line(format_args!("{session}"));
                    }
                    Command::Message(text) => submit(&mut controller, text, &patient),
                }
            }
            alive = controller.step() => {
                if !alive {
                    break;
                }
            }
        }
    }

    tracing::info!(
        turns = controller.state().transcript.len(),
        session_id = ?controller.state().session.id,
        "Terminal session ended"
    );
    Ok(controller)
}

fn submit<A: SymptomApi, W: Write>(
    controller: &mut ChatController<A, TerminalView<W>>,
    text: String,
    patient: &PatientInfo,
) {
    if controller.state().is_busy() {
        tracing::debug!("Input dropped while a reply is pending");
    }
    controller.dispatch(ChatEvent::Submit {
        text,
        patient: patient.clone(),
    });
}
