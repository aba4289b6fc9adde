use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::enums::Speaker;

/// One entry in the visible chat log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
    pub timestamp: DateTime<Local>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
            timestamp,
        }
    }

    pub fn assistant(text: impl Into<String>, timestamp: DateTime<Local>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
            timestamp,
        }
    }

    /// Time label shown under the message (`HH:MM`).
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Append-only, insertion-ordered chat log.
///
/// The welcome placeholder is not a turn; it is tracked as a flag that can
/// only go from shown to removed.
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
    welcome_visible: bool,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            welcome_visible: true,
        }
    }

    pub fn push(&mut self, turn: ChatTurn) {
        self.turns.push(turn);
    }

    /// Removes the welcome placeholder. Returns `true` only the first time.
    pub fn dismiss_welcome(&mut self) -> bool {
        std::mem::replace(&mut self.welcome_visible, false)
    }

    pub fn welcome_visible(&self) -> bool {
        self.welcome_visible
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

/// Opaque correlation token issued by the backend on the first successful check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<String>,
}

impl Session {
    pub fn is_established(&self) -> bool {
        self.id.is_some()
    }
}
