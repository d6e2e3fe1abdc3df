//! End-to-end session tests
//!
//! Drive the connection manager over the in-memory transport and apply its
//! events to a store, the way the UI thread does.

use crossbeam_channel::Receiver;
use std::time::Duration;
use voicehud::config::{ClientConfig, ReconnectPolicy, DEFAULT_WELCOME};
use voicehud::connection::{ConnectionHandle, ConnectionManager, MemoryServer, MemoryTransport};
use voicehud::dispatch::{CommandDispatcher, TextDraft};
use voicehud::session::{LinkState, SessionEvent, SessionStore, TurnKind};
use voicehud::utils::SessionChannels;
use voicehud::HudError;

struct Client {
    store: SessionStore,
    dispatcher: CommandDispatcher<ConnectionHandle>,
    events: Receiver<SessionEvent>,
}

impl Client {
    fn start(config: &ClientConfig) -> (Client, MemoryServer) {
        let (transport, server) = MemoryTransport::pair();
        let channels = SessionChannels::new();
        let handle = ConnectionManager::new(transport, config)
            .unwrap()
            .connect(&tokio::runtime::Handle::current(), channels.sink);
        let client = Client {
            store: SessionStore::new(config.welcome_message.clone()),
            dispatcher: CommandDispatcher::new(handle),
            events: channels.events,
        };
        (client, server)
    }

    /// Wait for the next event and apply it
    async fn step(&mut self) -> SessionEvent {
        for _ in 0..10_000 {
            if let Ok(event) = self.events.try_recv() {
                self.store.apply(event.clone());
                return event;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no session event arrived");
    }

    /// Apply events until one matches
    async fn step_until(&mut self, pred: impl Fn(&SessionEvent) -> bool) {
        loop {
            let event = self.step().await;
            if pred(&event) {
                return;
            }
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_first_connect_and_voice_turn() {
    let config = ClientConfig::default();
    let (mut client, server) = Client::start(&config);
    let peer = server.accept();

    assert_eq!(client.step().await, SessionEvent::Connected);
    let transcript = client.store.state().transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].kind, TurnKind::Assistant);
    assert_eq!(transcript[0].text, DEFAULT_WELCOME);

    peer.push(r#"42["status",{"listening":true}]"#);
    client.step().await;
    assert!(client.store.state().listening());

    peer.push(r#"42["user_message",{"text":"turn on lights"}]"#);
    client.step().await;
    let transcript = client.store.state().transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[1].kind, TurnKind::User);
    assert_eq!(transcript[1].text, "turn on lights");

    peer.push(r#"42["assistant_message",{"text":"Done"}]"#);
    client.step().await;
    assert_eq!(client.store.state().transcript().len(), 3);
    assert!(!client.store.state().loading());
}

#[tokio::test(start_paused = true)]
async fn test_start_before_connect_shows_notice_and_sends_nothing() {
    let config = ClientConfig::default();
    let (mut client, server) = Client::start(&config);
    server.refuse();

    client
        .step_until(|e| matches!(e, SessionEvent::ReconnectScheduled { .. }))
        .await;
    let before = client.store.snapshot();

    let err = client
        .dispatcher
        .start_listening(&mut client.store)
        .unwrap_err();
    assert_eq!(err, HudError::NotConnected);
    assert_eq!(
        err.user_message(),
        "Not connected to server. Please refresh the page."
    );
    assert_eq!(client.store.state(), &before);

    // The next open succeeds; nothing queued earlier reaches the server
    let mut peer = server.accept();
    client
        .step_until(|e| *e == SessionEvent::Connected)
        .await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(peer.try_frame(), None);
}

#[tokio::test(start_paused = true)]
async fn test_drop_during_request_is_not_retried() {
    let config = ClientConfig::default();
    let (mut client, server) = Client::start(&config);
    let mut first = server.accept();
    let mut second = server.accept();

    client.step_until(|e| *e == SessionEvent::Connected).await;

    let mut draft = TextDraft {
        text: "what time is it".into(),
    };
    assert!(draft.submit(&mut client.store, &client.dispatcher));
    assert!(draft.text.is_empty());
    assert!(client.store.state().loading());
    assert_eq!(
        first.next_frame().await.unwrap(),
        r#"42["text_command",{"text":"what time is it"}]"#
    );

    first.hang_up();
    assert_eq!(client.step().await, SessionEvent::Disconnected);
    let state = client.store.state();
    assert!(!state.connected() && !state.listening() && !state.loading());

    assert!(matches!(
        client.step().await,
        SessionEvent::ReconnectScheduled { attempt: 1, .. }
    ));
    assert_eq!(
        client.store.state().status_label(),
        "Reconnecting (attempt 1)..."
    );

    assert_eq!(client.step().await, SessionEvent::Connected);
    let state = client.store.state();
    assert!(state.connected());
    assert!(!state.loading());
    // No second welcome
    assert_eq!(state.transcript().len(), 1);
    assert_eq!(state.link(), LinkState::Idle);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(second.try_frame(), None);
}

#[tokio::test(start_paused = true)]
async fn test_server_error_clears_loading() {
    let config = ClientConfig::default();
    let (mut client, server) = Client::start(&config);
    let peer = server.accept();
    client.step_until(|e| *e == SessionEvent::Connected).await;

    client.dispatcher.start_listening(&mut client.store).unwrap();
    assert!(client.store.state().loading());
    assert_eq!(client.store.state().start_label(), "Initializing...");

    peer.push(r#"42["error",{"message":"microphone unavailable"}]"#);
    client.step().await;

    let state = client.store.state();
    assert!(!state.loading());
    let last = state.transcript().last().unwrap();
    assert_eq!(last.kind, TurnKind::Error);
    assert!(last.text.contains("microphone unavailable"));
}

#[tokio::test(start_paused = true)]
async fn test_retries_exhausted() {
    let policy = ReconnectPolicy {
        enabled: true,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(200),
        max_attempts: 2,
    };
    let config = ClientConfig::default().with_reconnect(policy);
    let (mut client, server) = Client::start(&config);

    client
        .step_until(|e| *e == SessionEvent::ReconnectExhausted)
        .await;
    assert_eq!(server.open_count(), 3);
    assert_eq!(client.store.state().link(), LinkState::Exhausted);
    assert_eq!(
        client.store.state().status_label(),
        "Connection lost. Reload to retry."
    );
    assert!(client.store.state().transcript().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_transcript_counts_only_turn_events() {
    let config = ClientConfig::default();
    let (mut client, server) = Client::start(&config);
    let peer = server.accept();
    client.step_until(|e| *e == SessionEvent::Connected).await;

    let frames = [
        r#"42["status",{"listening":true}]"#,
        r#"42["user_message",{"text":"a"}]"#,
        "not json",
        r#"42["connect_response",{"data":"Connected to Voice Assistant"}]"#,
        r#"42["status",{"listening":false}]"#,
        r#"42["assistant_message",{"text":""}]"#,
        r#"42["bogus",{"text":"x"}]"#,
        r#"42["error",{"message":"b"}]"#,
    ];
    for frame in frames {
        peer.push(frame);
    }

    let mut turns = 0;
    let mut last_len = client.store.state().transcript().len();
    for _ in 0..5 {
        let event = client.step().await;
        if event.is_turn() {
            turns += 1;
        }
        let len = client.store.state().transcript().len();
        assert!(len >= last_len);
        last_len = len;
    }

    assert_eq!(turns, 3);
    assert_eq!(client.store.state().transcript().len(), 1 + turns);
    assert!(client.events.try_recv().is_err());
}
