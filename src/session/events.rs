//! Typed events flowing into the session store and commands flowing out

use std::time::Duration;

/// Inbound events, produced by the connection manager
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session channel opened
    Connected,
    /// The session channel dropped
    Disconnected,
    /// Server capture state changed
    StatusChanged { listening: bool },
    /// Server echoed what the user said
    UserTurnReceived { text: String },
    /// Terminal assistant reply
    AssistantTurnReceived { text: String },
    /// Terminal server-reported error
    ErrorReceived { message: String },
    /// A retry was scheduled after a drop or failed open
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// Automatic retries gave up
    ReconnectExhausted,
}

impl SessionEvent {
    /// Whether this event appends a turn to the transcript
    pub fn is_turn(&self) -> bool {
        matches!(
            self,
            SessionEvent::UserTurnReceived { .. }
                | SessionEvent::AssistantTurnReceived { .. }
                | SessionEvent::ErrorReceived { .. }
        )
    }
}

/// User-initiated transitions, emitted by the command dispatcher after its
/// precondition checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    StartRequested,
    StopRequested,
    TextSubmitted { text: String },
}

/// Outbound commands forwarded verbatim over the session channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundCommand {
    StartListening,
    StopListening,
    TextCommand { text: String },
}

impl OutboundCommand {
    /// Wire name of the command
    pub fn name(&self) -> &'static str {
        match self {
            OutboundCommand::StartListening => "start_listening",
            OutboundCommand::StopListening => "stop_listening",
            OutboundCommand::TextCommand { .. } => "text_command",
        }
    }
}
