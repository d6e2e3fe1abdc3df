//! Session channel transports
//!
//! A [`Transport`] opens [`Link`]s; a link is an ordered, bidirectional
//! stream of Socket.IO event frames. The WebSocket link runs the Engine.IO
//! handshake and answers heartbeats itself, so only event frames reach the
//! connection manager.

use super::protocol::{self, EnginePacket, SocketPacket};
use crate::error::{HudError, Result};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::future::Future;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, trace, warn};
use url::Url;

/// Read timeout until the server announces its ping interval
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Opens session links to an endpoint
pub trait Transport: Send + 'static {
    type Link: Link;

    /// Open a new link
    fn open(&mut self, endpoint: &Url) -> impl Future<Output = Result<Self::Link>> + Send;
}

/// One open session link
pub trait Link: Send + 'static {
    /// Next inbound event frame; `None` once the peer closed the link
    fn recv(&mut self) -> impl Future<Output = Option<Result<String>>> + Send;

    /// Send one event frame
    fn send(&mut self, frame: String) -> impl Future<Output = Result<()>> + Send;

    /// Close the link; errors are ignored
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Socket.IO over WebSocket, backed by tokio-tungstenite
#[derive(Debug, Default, Clone, Copy)]
pub struct WsTransport;

impl Transport for WsTransport {
    type Link = WsLink;

    async fn open(&mut self, endpoint: &Url) -> Result<WsLink> {
        debug!("opening websocket to {}", endpoint);
        let (stream, response) = connect_async(endpoint.as_str())
            .await
            .map_err(|e| match e {
                tungstenite::Error::Url(e) => HudError::Config(e.to_string()),
                e => HudError::Transport(e.to_string()),
            })?;
        info!("websocket connected: {} ({})", endpoint, response.status());

        let (sink, stream) = stream.split();
        let mut link = WsLink {
            sink,
            stream,
            liveness: HANDSHAKE_TIMEOUT,
        };
        link.handshake().await?;
        Ok(link)
    }
}

/// WebSocket link carrying one Socket.IO session
pub struct WsLink {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    /// Longest wait for any inbound frame
    liveness: Duration,
}

impl WsLink {
    /// Wait for the Engine.IO open packet, then join the default namespace
    async fn handshake(&mut self) -> Result<()> {
        let session = match self.next_text().await {
            Some(text) => match EnginePacket::parse(&text?)? {
                EnginePacket::Open(session) => session,
                other => {
                    return Err(HudError::Protocol(format!("expected open packet, got {:?}", other)))
                }
            },
            None => return Err(HudError::Transport("closed during handshake".to_string())),
        };
        debug!(sid = %session.sid, ping_interval = session.ping_interval, "engine.io session open");
        self.liveness = session.liveness_timeout();

        self.send_raw(protocol::CONNECT.to_string()).await?;
        loop {
            let packet = match self.next_text().await {
                Some(text) => EnginePacket::parse(&text?)?,
                None => return Err(HudError::Transport("closed during handshake".to_string())),
            };
            match packet {
                EnginePacket::Ping => self.send_raw(protocol::PONG.to_string()).await?,
                EnginePacket::Close => {
                    return Err(HudError::Transport("closed during handshake".to_string()))
                }
                EnginePacket::Message(payload) => match SocketPacket::parse(&payload)? {
                    SocketPacket::Connect => {
                        info!("socket.io namespace joined");
                        return Ok(());
                    }
                    SocketPacket::ConnectError(message) => {
                        return Err(HudError::Transport(format!("connection rejected: {}", message)))
                    }
                    other => debug!("ignoring {:?} before connect", other),
                },
                other => trace!("ignoring {:?} before connect", other),
            }
        }
    }

    /// Next WebSocket text frame, bounded by the liveness timeout
    async fn next_text(&mut self) -> Option<Result<String>> {
        loop {
            let msg = match tokio::time::timeout(self.liveness, self.stream.next()).await {
                Ok(Some(msg)) => msg,
                Ok(None) => return None,
                Err(_) => {
                    return Some(Err(HudError::Transport(format!(
                        "no frame from server within {:?}",
                        self.liveness
                    ))))
                }
            };
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("frame in: {}", text);
                    return Some(Ok(text));
                }
                Ok(Message::Close(frame)) => {
                    info!("websocket closed by server: {:?}", frame);
                    return None;
                }
                Ok(Message::Binary(data)) => {
                    warn!("ignoring {} byte binary frame", data.len());
                }
                Ok(_) => {
                    trace!("control frame");
                }
                Err(e) => {
                    return Some(Err(HudError::Transport(e.to_string())));
                }
            }
        }
    }

    async fn send_raw(&mut self, frame: String) -> Result<()> {
        trace!("frame out: {}", frame);
        self.sink
            .send(Message::Text(frame))
            .await
            .map_err(|e| HudError::Transport(e.to_string()))
    }
}

impl Link for WsLink {
    async fn recv(&mut self) -> Option<Result<String>> {
        loop {
            let text = match self.next_text().await? {
                Ok(text) => text,
                Err(e) => return Some(Err(e)),
            };
            match EnginePacket::parse(&text) {
                Ok(EnginePacket::Ping) => {
                    if let Err(e) = self.send_raw(protocol::PONG.to_string()).await {
                        return Some(Err(e));
                    }
                }
                Ok(EnginePacket::Close) => {
                    info!("engine.io session closed by server");
                    return None;
                }
                Ok(EnginePacket::Message(payload)) => {
                    if let Ok(SocketPacket::Disconnect) = SocketPacket::parse(&payload) {
                        info!("socket.io namespace left by server");
                        return None;
                    }
                    return Some(Ok(text));
                }
                Ok(other) => trace!("ignoring {:?}", other),
                // Surfaced to the decoder, which logs and drops it
                Err(_) => return Some(Ok(text)),
            }
        }
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        self.send_raw(frame).await
    }

    async fn close(&mut self) {
        if let Err(e) = self.send_raw(protocol::DISCONNECT.to_string()).await {
            debug!("socket.io disconnect: {}", e);
        }
        if let Err(e) = self.sink.close().await {
            debug!("websocket close: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    const OPEN: &str =
        r#"0{"sid":"lv_VI97HAXpY6yYWAAAC","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#;

    type ServerSocket = WebSocketStream<TcpStream>;

    async fn next_text(ws: &mut ServerSocket) -> Option<String> {
        while let Some(Ok(msg)) = ws.next().await {
            if let Message::Text(text) = msg {
                return Some(text);
            }
        }
        None
    }

    async fn push(ws: &mut ServerSocket, frame: &str) {
        ws.send(Message::Text(frame.to_string())).await.unwrap();
    }

    /// Accept one client and hand the socket to `script`
    async fn serve<F, Fut>(script: F) -> (Url, tokio::task::JoinHandle<()>)
    where
        F: FnOnce(ServerSocket) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let task = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(tcp).await.unwrap();
            script(ws).await;
        });
        let url = Url::parse(&format!("ws://{}/socket.io/?EIO=4&transport=websocket", addr)).unwrap();
        (url, task)
    }

    #[tokio::test]
    async fn test_handshake_heartbeat_and_events() {
        let (url, server) = serve(|mut ws| async move {
            push(&mut ws, OPEN).await;
            assert_eq!(next_text(&mut ws).await.as_deref(), Some("40"));
            push(&mut ws, r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).await;

            push(&mut ws, "2").await;
            push(&mut ws, r#"42["status",{"listening":true}]"#).await;
            assert_eq!(next_text(&mut ws).await.as_deref(), Some("3"));

            assert_eq!(
                next_text(&mut ws).await.as_deref(),
                Some(r#"42["start_listening"]"#)
            );
            push(&mut ws, "41").await;
        })
        .await;

        let mut link = WsTransport.open(&url).await.unwrap();
        assert_eq!(
            link.recv().await.unwrap().unwrap(),
            r#"42["status",{"listening":true}]"#
        );
        link.send(r#"42["start_listening"]"#.to_string()).await.unwrap();
        assert!(link.recv().await.is_none());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_namespace_fails_open() {
        let (url, server) = serve(|mut ws| async move {
            push(&mut ws, OPEN).await;
            assert_eq!(next_text(&mut ws).await.as_deref(), Some("40"));
            push(&mut ws, r#"44{"message":"Not authorized"}"#).await;
        })
        .await;

        let err = WsTransport.open(&url).await.err().unwrap();
        assert_eq!(
            err,
            HudError::Transport("connection rejected: Not authorized".into())
        );
        assert!(err.is_recoverable());
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_non_socket_io_server_fails_open() {
        let (url, server) = serve(|mut ws| async move {
            push(&mut ws, r#"{"event":"status","data":{"listening":true}}"#).await;
            let _ = next_text(&mut ws).await;
        })
        .await;

        assert!(matches!(
            WsTransport.open(&url).await,
            Err(HudError::Protocol(_))
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_close_leaves_namespace() {
        let (url, server) = serve(|mut ws| async move {
            push(&mut ws, OPEN).await;
            assert_eq!(next_text(&mut ws).await.as_deref(), Some("40"));
            push(&mut ws, r#"40{"sid":"wZX3oN0bSVIhsaknAAAI"}"#).await;
            assert_eq!(next_text(&mut ws).await.as_deref(), Some("41"));
        })
        .await;

        let mut link = WsTransport.open(&url).await.unwrap();
        link.close().await;
        server.await.unwrap();
    }
}
