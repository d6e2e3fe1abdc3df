//! Error types for the voicehud client
//!
//! Transport and protocol failures are absorbed into session state; only
//! `NotConnected` is surfaced to the user as an interruptive notice.

use thiserror::Error;

/// Client errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HudError {
    /// The session channel could not be opened or dropped mid-session
    #[error("Transport error: {0}")]
    Transport(String),

    /// A frame could not be decoded or encoded
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// A user command was issued while the session channel is closed
    #[error("Not connected to server")]
    NotConnected,

    /// An internal channel was closed unexpectedly
    #[error("Channel error: {0}")]
    ChannelClosed(String),
}

impl From<serde_json::Error> for HudError {
    fn from(e: serde_json::Error) -> Self {
        HudError::Protocol(e.to_string())
    }
}

impl From<url::ParseError> for HudError {
    fn from(e: url::ParseError) -> Self {
        HudError::Config(format!("invalid endpoint: {}", e))
    }
}

impl HudError {
    /// Check if this error is recoverable
    ///
    /// Recoverable errors are absorbed into session state and the client keeps
    /// running. Non-recoverable errors stop the connection worker for good.
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Retried by the reconnect loop
            HudError::Transport(_) => true,
            // Bad frames are dropped
            HudError::Protocol(_) => true,
            // The user can retry once connected
            HudError::NotConnected => true,
            HudError::Config(_) => false,
            HudError::ChannelClosed(_) => false,
        }
    }

    /// Get a user-friendly description of the error
    pub fn user_message(&self) -> String {
        match self {
            HudError::Transport(_) => "Connection to the assistant was lost.".to_string(),
            HudError::Protocol(_) => "Received an unreadable message from the assistant.".to_string(),
            HudError::Config(_) => "Configuration error. Please check settings.".to_string(),
            HudError::NotConnected => {
                "Not connected to server. Please refresh the page.".to_string()
            }
            HudError::ChannelClosed(_) => {
                "Internal communication error. Please restart the application.".to_string()
            }
        }
    }
}

/// Result type alias for voicehud operations
pub type Result<T> = std::result::Result<T, HudError>;
