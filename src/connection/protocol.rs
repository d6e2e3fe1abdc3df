//! Wire frames for the session channel
//!
//! The assistant service speaks Socket.IO over Engine.IO v4 on a WebSocket.
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its payload. Engine.IO `message` packets carry a Socket.IO
//! packet, so a named event on the default namespace reads
//! `42["status",{"listening":true}]`.

use crate::error::{HudError, Result};
use crate::session::{OutboundCommand, SessionEvent};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Engine.IO protocol revision requested in the handshake URL
pub const ENGINE_IO_VERSION: u8 = 4;

/// Path the Socket.IO server is mounted on, relative to the endpoint
pub const SOCKET_IO_PATH: &str = "socket.io/";

/// Engine.IO pong, the reply to a server ping
pub const PONG: &str = "3";

/// Socket.IO connect request for the default namespace
pub const CONNECT: &str = "40";

/// Socket.IO disconnect notice for the default namespace
pub const DISCONNECT: &str = "41";

/// Payload of the Engine.IO `open` packet
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Handshake {
    pub sid: String,
    /// Milliseconds between server pings
    pub ping_interval: u64,
    /// Milliseconds the server waits for a pong
    pub ping_timeout: u64,
}

impl Handshake {
    /// Longest silence tolerated before the link counts as dead
    pub fn liveness_timeout(&self) -> Duration {
        Duration::from_millis(self.ping_interval.saturating_add(self.ping_timeout))
    }
}

/// One Engine.IO packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnginePacket {
    Open(Handshake),
    Close,
    Ping,
    Pong,
    /// Carries a Socket.IO packet
    Message(String),
    Upgrade,
    Noop,
}

impl EnginePacket {
    pub fn parse(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| HudError::Protocol("empty frame".to_string()))?;
        let payload = chars.as_str();

        Ok(match kind {
            '0' => EnginePacket::Open(serde_json::from_str(payload)?),
            '1' => EnginePacket::Close,
            '2' => EnginePacket::Ping,
            '3' => EnginePacket::Pong,
            '4' => EnginePacket::Message(payload.to_string()),
            '5' => EnginePacket::Upgrade,
            '6' => EnginePacket::Noop,
            other => {
                return Err(HudError::Protocol(format!(
                    "unknown engine.io packet type {:?}",
                    other
                )))
            }
        })
    }
}

/// One Socket.IO packet on the default namespace
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect,
    Disconnect,
    Event { name: String, data: Value },
    ConnectError(String),
}

impl SocketPacket {
    /// Parse the payload of an Engine.IO `message` packet
    pub fn parse(payload: &str) -> Result<Self> {
        let mut chars = payload.chars();
        let kind = chars
            .next()
            .ok_or_else(|| HudError::Protocol("empty socket.io packet".to_string()))?;
        let body = strip_namespace(chars.as_str())?;

        match kind {
            '0' => Ok(SocketPacket::Connect),
            '1' => Ok(SocketPacket::Disconnect),
            '2' => {
                // Ack ids sit between the namespace and the arguments
                let args = body.trim_start_matches(|c: char| c.is_ascii_digit());
                let mut args: Vec<Value> = serde_json::from_str(args)?;
                if args.is_empty() {
                    return Err(HudError::Protocol("event without a name".to_string()));
                }
                let name = match args.remove(0) {
                    Value::String(name) => name,
                    other => {
                        return Err(HudError::Protocol(format!("event name {} is not a string", other)))
                    }
                };
                let data = if args.is_empty() { Value::Null } else { args.remove(0) };
                Ok(SocketPacket::Event { name, data })
            }
            '4' => {
                let message = match serde_json::from_str::<Value>(body) {
                    Ok(Value::Object(map)) => map
                        .get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| body.to_string()),
                    _ => body.to_string(),
                };
                Ok(SocketPacket::ConnectError(message))
            }
            other => Err(HudError::Protocol(format!(
                "unsupported socket.io packet type {:?}",
                other
            ))),
        }
    }
}

/// Drop a `/nsp,` prefix; only the default namespace is served
fn strip_namespace(body: &str) -> Result<&str> {
    if !body.starts_with('/') {
        return Ok(body);
    }
    let (namespace, rest) = body.split_once(',').unwrap_or((body, ""));
    if namespace != "/" {
        return Err(HudError::Protocol(format!("unexpected namespace {}", namespace)));
    }
    Ok(rest)
}

/// Events sent by the assistant service
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    Status { listening: bool },
    UserMessage { text: String },
    AssistantMessage { text: String },
    Error { message: String },
}

impl From<ServerMessage> for SessionEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::Status { listening } => SessionEvent::StatusChanged { listening },
            ServerMessage::UserMessage { text } => SessionEvent::UserTurnReceived { text },
            ServerMessage::AssistantMessage { text } => {
                SessionEvent::AssistantTurnReceived { text }
            }
            ServerMessage::Error { message } => SessionEvent::ErrorReceived { message },
        }
    }
}

/// Events sent by the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientMessage {
    StartListening,
    StopListening,
    TextCommand { text: String },
}

impl From<OutboundCommand> for ClientMessage {
    fn from(cmd: OutboundCommand) -> Self {
        match cmd {
            OutboundCommand::StartListening => ClientMessage::StartListening,
            OutboundCommand::StopListening => ClientMessage::StopListening,
            OutboundCommand::TextCommand { text } => ClientMessage::TextCommand { text },
        }
    }
}

/// Translate one inbound event frame into a domain event
pub fn decode(frame: &str) -> Result<SessionEvent> {
    let payload = match EnginePacket::parse(frame)? {
        EnginePacket::Message(payload) => payload,
        other => return Err(HudError::Protocol(format!("not a message packet: {:?}", other))),
    };
    match SocketPacket::parse(&payload)? {
        SocketPacket::Event { name, data } => {
            let msg: ServerMessage = serde_json::from_value(json!({ "event": name, "data": data }))?;
            Ok(msg.into())
        }
        other => Err(HudError::Protocol(format!("not an event: {:?}", other))),
    }
}

/// Encode an outbound command as an event frame
pub fn encode(cmd: OutboundCommand) -> Result<String> {
    let tagged = serde_json::to_value(ClientMessage::from(cmd))?;
    let mut args = vec![tagged["event"].clone()];
    if let Some(data) = tagged.get("data") {
        args.push(data.clone());
    }
    Ok(format!("42{}", Value::Array(args)))
}
