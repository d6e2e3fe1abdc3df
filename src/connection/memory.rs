//! In-process transport
//!
//! Scripted counterpart of [`WsTransport`](super::WsTransport): each call to
//! [`Transport::open`] consumes the next outcome queued on the
//! [`MemoryServer`]. Links carry Socket.IO event frames, as a WebSocket link
//! hands them up once its handshake is done. Used by the test suites and for
//! running the UI without a backend.

use super::transport::{Link, Transport};
use crate::error::{HudError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

#[derive(Default)]
struct Shared {
    outcomes: Mutex<VecDeque<Result<MemoryLink>>>,
    opens: AtomicUsize,
}

/// Client side: handed to the connection manager
pub struct MemoryTransport {
    shared: Arc<Shared>,
}

/// Server side: scripts open outcomes and talks to accepted links
#[derive(Clone)]
pub struct MemoryServer {
    shared: Arc<Shared>,
}

impl MemoryTransport {
    pub fn pair() -> (MemoryTransport, MemoryServer) {
        let shared = Arc::new(Shared::default());
        (
            MemoryTransport {
                shared: Arc::clone(&shared),
            },
            MemoryServer { shared },
        )
    }
}

impl MemoryServer {
    /// Let the next open succeed and return the server end of that link
    pub fn accept(&self) -> MemoryPeer {
        let (inbound_tx, inbound_rx) = unbounded_channel();
        let (outbound_tx, outbound_rx) = unbounded_channel();
        self.shared.outcomes.lock().push_back(Ok(MemoryLink {
            inbound: inbound_rx,
            outbound: outbound_tx,
        }));
        MemoryPeer {
            inbound: Some(inbound_tx),
            outbound: outbound_rx,
        }
    }

    /// Make the next open fail the way a refused TCP connect does
    pub fn refuse(&self) {
        self.fail_with(HudError::Transport("connection refused".to_string()));
    }

    /// Make the next open fail with `err`
    pub fn fail_with(&self, err: HudError) {
        self.shared.outcomes.lock().push_back(Err(err));
    }

    /// Number of open attempts seen so far
    pub fn open_count(&self) -> usize {
        self.shared.opens.load(Ordering::SeqCst)
    }
}

impl Transport for MemoryTransport {
    type Link = MemoryLink;

    async fn open(&mut self, endpoint: &Url) -> Result<MemoryLink> {
        self.shared.opens.fetch_add(1, Ordering::SeqCst);
        let next = self.shared.outcomes.lock().pop_front();
        next.unwrap_or_else(|| Err(HudError::Transport(format!("no listener at {}", endpoint))))
    }
}

/// Client end of an in-process link
pub struct MemoryLink {
    inbound: UnboundedReceiver<String>,
    outbound: UnboundedSender<String>,
}

impl Link for MemoryLink {
    async fn recv(&mut self) -> Option<Result<String>> {
        self.inbound.recv().await.map(Ok)
    }

    async fn send(&mut self, frame: String) -> Result<()> {
        self.outbound
            .send(frame)
            .map_err(|_| HudError::Transport("peer closed".to_string()))
    }

    async fn close(&mut self) {
        self.inbound.close();
    }
}

/// Server end of an in-process link
pub struct MemoryPeer {
    inbound: Option<UnboundedSender<String>>,
    outbound: UnboundedReceiver<String>,
}

impl MemoryPeer {
    /// Push a raw frame to the client; false once the link is gone
    pub fn push(&self, frame: impl Into<String>) -> bool {
        match &self.inbound {
            Some(tx) => tx.send(frame.into()).is_ok(),
            None => false,
        }
    }

    /// Next frame sent by the client; `None` once the client closed the link
    pub async fn next_frame(&mut self) -> Option<String> {
        self.outbound.recv().await
    }

    /// Frame already sent by the client, if any
    pub fn try_frame(&mut self) -> Option<String> {
        self.outbound.try_recv().ok()
    }

    /// Drop the link from the server side
    pub fn hang_up(&mut self) {
        self.inbound = None;
    }
}
