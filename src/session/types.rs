use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Who a transcript entry is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnKind {
    User,
    Assistant,
    Error,
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TurnKind::User => write!(f, "user"),
            TurnKind::Assistant => write!(f, "assistant"),
            TurnKind::Error => write!(f, "error"),
        }
    }
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub kind: TurnKind,
    pub text: String,
    /// Client-side capture time, used only for display
    pub timestamp: DateTime<Local>,
}

impl Turn {
    pub fn new(kind: TurnKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Local::now(),
        }
    }

    /// `HH:MM` label shown under the turn
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Progress of the automatic reconnect path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LinkState {
    /// Connected, or never dropped
    #[default]
    Idle,
    /// Waiting `delay` before retry `attempt`
    Retrying { attempt: u32, delay: Duration },
    /// Retries exhausted; only a restart reconnects
    Exhausted,
}

/// UI-relevant session state
///
/// Fields are private; the only writer is
/// [`SessionStore`](crate::session::SessionStore).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub(super) connected: bool,
    pub(super) listening: bool,
    pub(super) loading: bool,
    pub(super) transcript: Vec<Turn>,
    pub(super) link: LinkState,
}

impl SessionState {
    /// True iff the session channel is currently open
    pub fn connected(&self) -> bool {
        self.connected
    }

    /// Server-reported capture state
    pub fn listening(&self) -> bool {
        self.listening
    }

    /// True while a request awaits its terminal server response
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// Transcript in arrival order
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn link(&self) -> LinkState {
        self.link
    }

    /// Whether the start control may be invoked
    pub fn can_start(&self) -> bool {
        self.connected && !self.loading && !self.listening
    }

    /// Whether text may be typed and submitted
    pub fn can_submit_text(&self) -> bool {
        self.connected && !self.loading
    }

    /// Label for the start control
    pub fn start_label(&self) -> &'static str {
        if self.loading {
            "Initializing..."
        } else {
            "Start Listening"
        }
    }

    /// Header status text
    pub fn status_label(&self) -> String {
        if self.connected {
            return "Connected".to_string();
        }
        match self.link {
            LinkState::Idle => "Disconnected".to_string(),
            LinkState::Retrying { attempt, .. } => format!("Reconnecting (attempt {})...", attempt),
            LinkState::Exhausted => "Connection lost. Reload to retry.".to_string(),
        }
    }
}
