//! Command dispatcher
//!
//! Sole entry point for user intents. Guards are checked against the current
//! session state before anything is forwarded to the session channel.

use crate::error::{HudError, Result};
use crate::session::{OutboundCommand, SessionStore, UserAction};
use tracing::{debug, info};

/// Outbound side of the session channel
///
/// Delivery is at-most-once and fire-and-forget; implementations drop the
/// command when the channel is closed.
pub trait CommandSink {
    fn send(&self, cmd: OutboundCommand);
}

/// Turns user intents into store transitions and outbound commands
pub struct CommandDispatcher<S: CommandSink> {
    sink: S,
}

impl<S: CommandSink> CommandDispatcher<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Ask the assistant to start capturing
    ///
    /// Fails with [`HudError::NotConnected`] when the channel is closed; the
    /// caller shows that as a blocking notice. A request while one is already
    /// in flight, or while already listening, is ignored.
    pub fn start_listening(&self, store: &mut SessionStore) -> Result<()> {
        let state = store.state();
        if !state.connected() {
            info!("start listening rejected: not connected");
            return Err(HudError::NotConnected);
        }
        if state.loading() || state.listening() {
            debug!("start listening ignored: already in progress");
            return Ok(());
        }
        self.forward(store, UserAction::StartRequested);
        Ok(())
    }

    /// Ask the assistant to stop capturing; always permitted
    pub fn stop_listening(&self, store: &mut SessionStore) {
        self.forward(store, UserAction::StopRequested);
    }

    /// Send a typed command; returns whether it was forwarded
    pub fn submit_text(&self, store: &mut SessionStore, text: String) -> bool {
        if text.trim().is_empty() || !store.state().connected() {
            debug!("text submission ignored");
            return false;
        }
        self.forward(store, UserAction::TextSubmitted { text })
    }

    fn forward(&self, store: &mut SessionStore, action: UserAction) -> bool {
        match store.apply_action(action) {
            Some(cmd) => {
                debug!(command = cmd.name(), "forwarding command");
                self.sink.send(cmd);
                true
            }
            None => false,
        }
    }
}

/// Buffered text of the command input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDraft {
    pub text: String,
}

impl TextDraft {
    /// Whether the draft holds anything worth sending
    pub fn is_sendable(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Submit the draft
    ///
    /// The buffer is cleared as soon as the submission is accepted, before
    /// any server acknowledgement, and is not restored if the request later
    /// fails. Nothing happens while input is disabled.
    pub fn submit<S: CommandSink>(
        &mut self,
        store: &mut SessionStore,
        dispatcher: &CommandDispatcher<S>,
    ) -> bool {
        if !self.is_sendable() || !store.state().can_submit_text() {
            return false;
        }
        let text = std::mem::take(&mut self.text);
        dispatcher.submit_text(store, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionEvent;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<OutboundCommand>>,
    }

    impl CommandSink for RecordingSink {
        fn send(&self, cmd: OutboundCommand) {
            self.sent.borrow_mut().push(cmd);
        }
    }

    fn setup(connected: bool) -> (SessionStore, CommandDispatcher<RecordingSink>) {
        let mut store = SessionStore::new("welcome");
        if connected {
            store.apply(SessionEvent::Connected);
        }
        (store, CommandDispatcher::new(RecordingSink::default()))
    }

    fn sent(dispatcher: &CommandDispatcher<RecordingSink>) -> Vec<OutboundCommand> {
        dispatcher.sink().sent.borrow().clone()
    }

    #[test]
    fn test_start_while_disconnected_is_rejected_without_side_effects() {
        let (mut store, dispatcher) = setup(false);
        let before = store.snapshot();

        let result = dispatcher.start_listening(&mut store);

        assert_eq!(result, Err(HudError::NotConnected));
        assert!(sent(&dispatcher).is_empty());
        assert_eq!(store.state(), &before);
    }

    #[test]
    fn test_start_when_connected_sets_loading_and_forwards() {
        let (mut store, dispatcher) = setup(true);
        dispatcher.start_listening(&mut store).unwrap();
        assert!(store.state().loading());
        assert_eq!(sent(&dispatcher), vec![OutboundCommand::StartListening]);
    }

    #[test]
    fn test_only_one_start_in_flight() {
        let (mut store, dispatcher) = setup(true);
        dispatcher.start_listening(&mut store).unwrap();
        dispatcher.start_listening(&mut store).unwrap();
        assert_eq!(sent(&dispatcher).len(), 1);

        store.apply(SessionEvent::StatusChanged { listening: true });
        store.apply(SessionEvent::AssistantTurnReceived { text: "ok".into() });
        dispatcher.start_listening(&mut store).unwrap();
        assert_eq!(sent(&dispatcher).len(), 1);
    }

    #[test]
    fn test_stop_always_permitted() {
        let (mut store, dispatcher) = setup(false);
        dispatcher.stop_listening(&mut store);
        assert_eq!(sent(&dispatcher), vec![OutboundCommand::StopListening]);

        let (mut store, dispatcher) = setup(true);
        dispatcher.start_listening(&mut store).unwrap();
        dispatcher.stop_listening(&mut store);
        assert!(!store.state().loading());
        assert_eq!(
            sent(&dispatcher),
            vec![OutboundCommand::StartListening, OutboundCommand::StopListening]
        );
    }

    #[test]
    fn test_blank_text_is_noop() {
        let (mut store, dispatcher) = setup(true);
        assert!(!dispatcher.submit_text(&mut store, String::new()));
        assert!(!dispatcher.submit_text(&mut store, "   ".into()));
        assert!(sent(&dispatcher).is_empty());
        assert!(!store.state().loading());
    }

    #[test]
    fn test_text_while_disconnected_is_noop() {
        let (mut store, dispatcher) = setup(false);
        assert!(!dispatcher.submit_text(&mut store, "hello".into()));
        assert!(sent(&dispatcher).is_empty());
    }

    #[test]
    fn test_text_forwarded_and_loading() {
        let (mut store, dispatcher) = setup(true);
        assert!(dispatcher.submit_text(&mut store, "lights on".into()));
        assert!(store.state().loading());
        assert_eq!(
            sent(&dispatcher),
            vec![OutboundCommand::TextCommand { text: "lights on".into() }]
        );
    }

    #[test]
    fn test_draft_cleared_on_submission() {
        let (mut store, dispatcher) = setup(true);
        let mut draft = TextDraft {
            text: "what's the weather".into(),
        };
        assert!(draft.submit(&mut store, &dispatcher));
        assert!(draft.text.is_empty());

        // Input is disabled while loading; the draft is kept
        draft.text = "second".into();
        assert!(!draft.submit(&mut store, &dispatcher));
        assert_eq!(draft.text, "second");
        assert_eq!(sent(&dispatcher).len(), 1);
    }

    #[test]
    fn test_draft_kept_when_blank_or_disconnected() {
        let (mut store, dispatcher) = setup(true);
        let mut draft = TextDraft { text: "  ".into() };
        assert!(!draft.submit(&mut store, &dispatcher));
        assert_eq!(draft.text, "  ");

        let (mut store, dispatcher) = setup(false);
        let mut draft = TextDraft { text: "hello".into() };
        assert!(!draft.submit(&mut store, &dispatcher));
        assert_eq!(draft.text, "hello");
    }
}
