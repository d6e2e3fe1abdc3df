//! Connection manager
//!
//! Owns the single session channel: opens it, re-opens it with bounded
//! backoff after a drop, translates inbound frames into [`SessionEvent`]s and
//! forwards outbound commands while the channel is open.

use super::protocol;
use super::transport::{Link, Transport};
use crate::config::{ClientConfig, ReconnectPolicy};
use crate::dispatch::CommandSink;
use crate::error::Result;
use crate::session::{OutboundCommand, SessionEvent};
use crate::utils::EventSink;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use url::Url;

/// Not-yet-connected manager
///
/// [`connect`](Self::connect) consumes the manager, so a second connect on
/// the same channel cannot be expressed.
pub struct ConnectionManager<T: Transport> {
    transport: T,
    endpoint: Url,
    policy: ReconnectPolicy,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: T, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            transport,
            endpoint: config.websocket_url()?,
            policy: config.reconnect.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Start the connection worker on `runtime`
    pub fn connect(self, runtime: &tokio::runtime::Handle, sink: EventSink) -> ConnectionHandle {
        let (commands_tx, commands_rx) = unbounded_channel();
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let open = Arc::new(AtomicBool::new(false));

        info!("connecting to {}", self.endpoint);
        let worker = Worker {
            transport: self.transport,
            endpoint: self.endpoint,
            policy: self.policy,
            sink,
            commands: commands_rx,
            open: Arc::clone(&open),
            shutdown: shutdown_rx,
        };
        let task = runtime.spawn(worker.run());

        ConnectionHandle {
            commands: commands_tx,
            open,
            shutdown: shutdown_tx,
            task: Some(task),
        }
    }
}

/// Handle to the running connection worker
///
/// Dropping the handle shuts the worker down: the open link is closed and any
/// pending retry timer is cancelled.
pub struct ConnectionHandle {
    commands: UnboundedSender<OutboundCommand>,
    open: Arc<AtomicBool>,
    shutdown: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl ConnectionHandle {
    /// Whether the session channel is currently open
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Forward a command if the channel is open, otherwise drop it
    pub fn send(&self, cmd: OutboundCommand) {
        if !self.is_open() {
            debug!(command = cmd.name(), "session channel closed, dropping command");
            return;
        }
        if let Err(e) = self.commands.send(cmd) {
            debug!(command = e.0.name(), "connection worker stopped, dropping command");
        }
    }

    /// Signal the worker to stop
    pub fn shutdown(&self) {
        if self.shutdown.send(true).is_ok() {
            info!("closing session channel");
        }
    }

    /// Whether the worker has exited
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Shut down and wait for the worker to exit
    pub async fn join(mut self) {
        self.shutdown();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("connection worker failed: {}", e);
            }
        }
    }
}

impl CommandSink for ConnectionHandle {
    fn send(&self, cmd: OutboundCommand) {
        ConnectionHandle::send(self, cmd);
    }
}

impl Drop for ConnectionHandle {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

enum LinkEnd {
    Dropped,
    Shutdown,
}

struct Worker<T: Transport> {
    transport: T,
    endpoint: Url,
    policy: ReconnectPolicy,
    sink: EventSink,
    commands: UnboundedReceiver<OutboundCommand>,
    open: Arc<AtomicBool>,
    shutdown: watch::Receiver<bool>,
}

impl<T: Transport> Worker<T> {
    async fn run(mut self) {
        let mut attempt: u32 = 0;

        loop {
            let opened = tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                result = self.transport.open(&self.endpoint) => result,
            };

            match opened {
                Ok(link) => {
                    attempt = 0;
                    if let LinkEnd::Shutdown = self.drive(link).await {
                        break;
                    }
                }
                Err(e) if !e.is_recoverable() => {
                    error!("cannot open session channel: {}", e);
                    self.give_up();
                    break;
                }
                Err(e) => warn!("failed to open session channel: {}", e),
            }

            attempt += 1;
            let Some(delay) = self.policy.delay_for(attempt) else {
                warn!("giving up on {} after {} retries", self.endpoint, attempt - 1);
                self.give_up();
                break;
            };

            info!(attempt, ?delay, "scheduling reconnect");
            if let Err(e) = self.sink.emit(SessionEvent::ReconnectScheduled { attempt, delay }) {
                info!("stopping connection worker: {}", e);
                break;
            }

            tokio::select! {
                biased;
                _ = self.shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        self.open.store(false, Ordering::SeqCst);
        debug!("connection worker stopped");
    }

    fn give_up(&self) {
        if let Err(e) = self.sink.emit(SessionEvent::ReconnectExhausted) {
            debug!("retries exhausted unobserved: {}", e);
        }
    }

    async fn drive(&mut self, mut link: T::Link) -> LinkEnd {
        // No replay: anything queued while closed is discarded
        let mut stale = 0usize;
        while self.commands.try_recv().is_ok() {
            stale += 1;
        }
        if stale > 0 {
            debug!(stale, "discarded commands issued while disconnected");
        }

        self.open.store(true, Ordering::SeqCst);
        if let Err(e) = self.sink.emit(SessionEvent::Connected) {
            info!("stopping connection worker: {}", e);
            self.open.store(false, Ordering::SeqCst);
            link.close().await;
            return LinkEnd::Shutdown;
        }

        let end = loop {
            // Commands are polled before inbound frames so a busy server
            // cannot starve them
            tokio::select! {
                biased;
                _ = self.shutdown.changed() => {
                    link.close().await;
                    break LinkEnd::Shutdown;
                }
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => {
                        let name = cmd.name();
                        match protocol::encode(cmd) {
                            Ok(frame) => {
                                if let Err(e) = link.send(frame).await {
                                    warn!("failed to send {}: {}", name, e);
                                }
                            }
                            Err(e) => warn!("failed to encode {}: {}", name, e),
                        }
                    }
                    None => {
                        link.close().await;
                        break LinkEnd::Shutdown;
                    }
                },
                frame = link.recv() => match frame {
                    Some(Ok(text)) => match protocol::decode(&text) {
                        Ok(event) => {
                            if let Err(e) = self.sink.emit(event) {
                                info!("stopping connection worker: {}", e);
                                link.close().await;
                                break LinkEnd::Shutdown;
                            }
                        }
                        Err(e) => warn!("dropping frame {:?}: {}", text, e),
                    },
                    Some(Err(e)) => {
                        warn!("session channel failed: {}", e);
                        break LinkEnd::Dropped;
                    }
                    None => {
                        info!("session channel closed by peer");
                        break LinkEnd::Dropped;
                    }
                },
            }
        };

        self.open.store(false, Ordering::SeqCst);
        if let LinkEnd::Dropped = end {
            if let Err(e) = self.sink.emit(SessionEvent::Disconnected) {
                info!("stopping connection worker: {}", e);
                return LinkEnd::Shutdown;
            }
        }
        end
    }
}
