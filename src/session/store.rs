//! Session state store
//!
//! The store is the single writer of [`SessionState`]. Every inbound event and
//! every user action goes through one transition function, applied to
//! completion before the next one starts.

use super::events::{OutboundCommand, SessionEvent, UserAction};
use super::types::{LinkState, SessionState, Turn, TurnKind};
use tracing::{debug, info};

/// Owner of the session state
#[derive(Debug, Clone)]
pub struct SessionStore {
    state: SessionState,
    /// Set after the first successful connect of the client's lifetime
    welcomed: bool,
    welcome_message: String,
}

impl SessionStore {
    /// Create a store in the startup state
    pub fn new(welcome_message: impl Into<String>) -> Self {
        Self {
            state: SessionState::default(),
            welcomed: false,
            welcome_message: welcome_message.into(),
        }
    }

    /// Read-only view of the current state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Owned copy of the current state
    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Apply one inbound event
    pub fn apply(&mut self, event: SessionEvent) {
        debug!(?event, "applying session event");
        match event {
            SessionEvent::Connected => {
                self.state.connected = true;
                self.state.link = LinkState::Idle;
                if !self.welcomed {
                    self.welcomed = true;
                    self.append(TurnKind::Assistant, self.welcome_message.clone());
                }
                info!("session connected");
            }
            SessionEvent::Disconnected => {
                self.state.connected = false;
                self.state.listening = false;
                self.state.loading = false;
                info!("session disconnected");
            }
            SessionEvent::StatusChanged { listening } => {
                self.state.listening = listening;
            }
            SessionEvent::UserTurnReceived { text } => {
                self.append(TurnKind::User, text);
            }
            SessionEvent::AssistantTurnReceived { text } => {
                self.append(TurnKind::Assistant, text);
                self.state.loading = false;
            }
            SessionEvent::ErrorReceived { message } => {
                self.append(TurnKind::Error, format!("Error: {}", message));
                self.state.loading = false;
            }
            SessionEvent::ReconnectScheduled { attempt, delay } => {
                self.state.link = LinkState::Retrying { attempt, delay };
            }
            SessionEvent::ReconnectExhausted => {
                self.state.link = LinkState::Exhausted;
            }
        }
    }

    /// Apply a user action, returning the command to forward
    ///
    /// Returns `None` when the action's guard does not hold; state is left
    /// untouched in that case.
    pub fn apply_action(&mut self, action: UserAction) -> Option<OutboundCommand> {
        match action {
            UserAction::StartRequested => {
                if !self.state.connected {
                    return None;
                }
                self.state.loading = true;
                Some(OutboundCommand::StartListening)
            }
            UserAction::StopRequested => {
                self.state.loading = false;
                Some(OutboundCommand::StopListening)
            }
            UserAction::TextSubmitted { text } => {
                if !self.state.connected || text.trim().is_empty() {
                    return None;
                }
                self.state.loading = true;
                Some(OutboundCommand::TextCommand { text })
            }
        }
    }

    fn append(&mut self, kind: TurnKind, text: String) {
        self.state.transcript.push(Turn::new(kind, text));
    }
}
