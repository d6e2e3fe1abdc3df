use crate::error::{HudError, Result};
use crate::session::SessionEvent;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::debug;

/// Callback used to wake the UI thread when an event is queued
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// Producer side of the inbound event queue
///
/// Events are delivered in send order; the UI thread drains them once per
/// frame.
#[derive(Clone)]
pub struct EventSink {
    tx: Sender<SessionEvent>,
    waker: Option<Waker>,
}

impl EventSink {
    pub fn new(tx: Sender<SessionEvent>) -> Self {
        Self { tx, waker: None }
    }

    /// Wake the consumer after every event
    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    /// Queue an event
    ///
    /// Fails with [`HudError::ChannelClosed`] once the consumer is gone.
    pub fn emit(&self, event: SessionEvent) -> Result<()> {
        self.tx.send(event).map_err(|e| {
            debug!(event = ?e.0, "event consumer dropped");
            HudError::ChannelClosed("session events".to_string())
        })?;
        if let Some(waker) = &self.waker {
            waker();
        }
        Ok(())
    }
}

impl std::fmt::Debug for EventSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSink")
            .field("queued", &self.tx.len())
            .field("waker", &self.waker.is_some())
            .finish()
    }
}

/// Inbound event queue between the connection manager and the UI thread
pub struct SessionChannels {
    pub sink: EventSink,
    pub events: Receiver<SessionEvent>,
}

impl SessionChannels {
    pub fn new() -> Self {
        let (tx, events) = unbounded();
        Self {
            sink: EventSink::new(tx),
            events,
        }
    }

    /// Drain every queued event in arrival order
    pub fn drain(events: &Receiver<SessionEvent>) -> Vec<SessionEvent> {
        events.try_iter().collect()
    }
}

impl Default for SessionChannels {
    fn default() -> Self {
        Self::new()
    }
}
