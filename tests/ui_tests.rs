//! UI automation tests using egui_kittest and AccessKit
//!
//! The full app is rendered against a recording command sink; server events
//! are injected through the same queue the connection manager feeds.

use crossbeam_channel::{unbounded, Sender};
use egui_kittest::kittest::Queryable;
use egui_kittest::Harness;
use std::cell::RefCell;
use voicehud::config::{ClientConfig, DEFAULT_WELCOME};
use voicehud::dispatch::{CommandDispatcher, CommandSink};
use voicehud::session::{OutboundCommand, SessionEvent};
use voicehud::ui::components::VoiceIntent;
use voicehud::ui::HudApp;

#[derive(Default)]
struct RecordingSink {
    sent: RefCell<Vec<OutboundCommand>>,
}

impl CommandSink for RecordingSink {
    fn send(&self, cmd: OutboundCommand) {
        self.sent.borrow_mut().push(cmd);
    }
}

struct TestApp {
    app: HudApp<RecordingSink>,
    server: Sender<SessionEvent>,
}

impl TestApp {
    fn new() -> Self {
        let (server, events) = unbounded();
        let app = HudApp::new(
            &egui::Context::default(),
            &ClientConfig::default(),
            CommandDispatcher::new(RecordingSink::default()),
            events,
        );
        Self { app, server }
    }

    fn connected() -> Self {
        let test = Self::new();
        test.push(SessionEvent::Connected);
        test
    }

    fn push(&self, event: SessionEvent) {
        self.server.send(event).unwrap();
    }

    fn sent(&self) -> Vec<OutboundCommand> {
        self.app
            .dispatcher()
            .map(|d| d.sink().sent.borrow().clone())
            .unwrap_or_default()
    }
}

fn harness(test: TestApp) -> Harness<'static, TestApp> {
    let mut harness = Harness::builder()
        .with_size(egui::Vec2::new(520.0, 900.0))
        .build_state(|ctx, test: &mut TestApp| test.app.show(ctx), test);
    harness.run();
    harness
}

/// Welcome turn appears after the first connect
#[test]
fn test_welcome_turn_shown_on_connect() {
    let harness = harness(TestApp::connected());

    let _welcome = harness.get_by_label(&format!("assistant turn: {}", DEFAULT_WELCOME));
    let _status = harness.get_by_label("Connected");
    assert_eq!(harness.state().app.state().transcript().len(), 1);
}

/// Status indicator reports a disconnected client
#[test]
fn test_status_shows_disconnected() {
    let harness = harness(TestApp::new());
    let _status = harness.get_by_label("Disconnected");
}

/// Clicking start forwards the command and shows the initializing label
#[test]
fn test_start_button_sends_start_listening() {
    let mut harness = harness(TestApp::connected());

    harness.get_by_label("Start Listening").click();
    harness.run();

    assert_eq!(harness.state().sent(), vec![OutboundCommand::StartListening]);
    assert!(harness.state().app.state().loading());
    let _label = harness.get_by_label("Initializing...");
}

/// The start button cannot be used while disconnected
#[test]
fn test_start_button_disabled_when_disconnected() {
    let mut harness = harness(TestApp::new());

    harness.get_by_label("Start Listening").click();
    harness.run();

    assert!(harness.state().sent().is_empty());
    assert!(harness.state().app.notice().is_none());
}

/// A start rejected for lack of a connection raises a blocking notice
#[test]
fn test_not_connected_notice_dismissed_with_ok() {
    let mut harness = harness(TestApp::new());

    harness.state_mut().app.handle_voice(VoiceIntent::Start);
    harness.run();

    assert_eq!(
        harness.state().app.notice(),
        Some("Not connected to server. Please refresh the page.")
    );
    let _notice = harness.get_by_label("Not connected to server. Please refresh the page.");
    assert!(harness.state().sent().is_empty());

    harness.get_by_label("OK").click();
    harness.run();
    assert!(harness.state().app.notice().is_none());
}

/// Space while disconnected reaches the dispatcher and raises the notice
#[test]
fn test_space_while_disconnected_shows_notice() {
    let mut harness = harness(TestApp::new());

    harness.press_key(egui::Key::Space);
    harness.run();

    assert_eq!(
        harness.state().app.notice(),
        Some("Not connected to server. Please refresh the page.")
    );
    let _notice = harness.get_by_label("Not connected to server. Please refresh the page.");
    assert!(harness.state().sent().is_empty());
    assert!(!harness.state().app.state().loading());
}

/// Space toggles start and stop while connected
#[test]
fn test_space_toggles_listening() {
    let mut harness = harness(TestApp::connected());

    harness.press_key(egui::Key::Space);
    harness.run();
    assert_eq!(harness.state().sent(), vec![OutboundCommand::StartListening]);

    harness.state().push(SessionEvent::StatusChanged { listening: true });
    harness.run();

    harness.press_key(egui::Key::Space);
    harness.run();
    assert_eq!(
        harness.state().sent(),
        vec![OutboundCommand::StartListening, OutboundCommand::StopListening]
    );
    assert!(harness.state().app.notice().is_none());
}

/// Space typed into the command input stays text
#[test]
fn test_space_in_input_is_not_a_shortcut() {
    let mut harness = harness(TestApp::connected());

    harness.get_by_label("Command input").focus();
    harness.run();
    harness.press_key(egui::Key::Space);
    harness.run();

    assert!(harness.state().sent().is_empty());
    assert!(!harness.state().app.state().loading());
}

/// Stop replaces start while listening
#[test]
fn test_stop_button_while_listening() {
    let mut harness = harness(TestApp::connected());

    harness.state().push(SessionEvent::StatusChanged { listening: true });
    harness.run();

    harness.get_by_label("Stop").click();
    harness.run();

    assert_eq!(harness.state().sent(), vec![OutboundCommand::StopListening]);
}

/// Typing and sending a command forwards it and clears the input
#[test]
fn test_text_command_submitted() {
    let mut harness = harness(TestApp::connected());

    harness.get_by_label("Command input").focus();
    harness.run();
    harness.get_by_label("Command input").type_text("what's the weather");
    harness.run();
    assert_eq!(harness.state().app.draft().text, "what's the weather");

    harness.get_by_label("Send command").click();
    harness.run();

    assert_eq!(
        harness.state().sent(),
        vec![OutboundCommand::TextCommand {
            text: "what's the weather".into()
        }]
    );
    assert!(harness.state().app.draft().text.is_empty());
    assert!(harness.state().app.state().loading());
}

/// Blank input is never sent
#[test]
fn test_cannot_send_empty_command() {
    let mut harness = harness(TestApp::connected());

    harness.get_by_label("Send command").click();
    harness.run();

    assert!(harness.state().sent().is_empty());
}

/// Server turns show up in the transcript in arrival order
#[test]
fn test_turns_rendered_in_order() {
    let mut harness = harness(TestApp::connected());

    harness.state().push(SessionEvent::UserTurnReceived {
        text: "turn on lights".into(),
    });
    harness.state().push(SessionEvent::AssistantTurnReceived {
        text: "Done".into(),
    });
    harness.state().push(SessionEvent::ErrorReceived {
        message: "lamp offline".into(),
    });
    harness.run();

    let _user = harness.get_by_label("user turn: turn on lights");
    let _assistant = harness.get_by_label("assistant turn: Done");
    let _error = harness.get_by_label("error turn: Error: lamp offline");
    assert_eq!(harness.state().app.state().transcript().len(), 4);
}

/// Shutting down stops the render loop and releases the channel
#[test]
fn test_shutdown_unmounts_hud() {
    let mut harness = harness(TestApp::connected());
    assert!(harness.state().app.hud().is_some());

    harness.state_mut().app.shutdown();
    harness.run();

    assert!(harness.state().app.hud().is_none());
    assert!(harness.state().app.dispatcher().is_none());
}
