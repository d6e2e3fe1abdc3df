//! Main application struct and eframe integration

use crate::config::ClientConfig;
use crate::connection::ConnectionHandle;
use crate::dispatch::{CommandDispatcher, CommandSink, TextDraft};
use crate::render::{EguiScheduler, HudLoop};
use crate::session::{SessionEvent, SessionState, SessionStore};
use crate::ui::components::{InputBar, MessageList, Notice, StatusBar, VoiceButton, VoiceIntent};
use crate::ui::theme::Theme;
use crate::utils::SessionChannels;
use crossbeam_channel::Receiver;
use egui::{self, CentralPanel, RichText, TopBottomPanel};
use tracing::{debug, info};

/// Voice assistant window
///
/// Owns the session store; inbound events are drained and applied at the
/// start of every frame, so each one lands atomically between renders.
pub struct HudApp<S: CommandSink = ConnectionHandle> {
    store: SessionStore,
    events: Receiver<SessionEvent>,
    /// `None` once the app has shut down
    dispatcher: Option<CommandDispatcher<S>>,
    draft: TextDraft,
    hud: Option<HudLoop<EguiScheduler>>,
    theme: Theme,
    /// Text of the blocking notice, while one is shown
    notice: Option<String>,
}

impl<S: CommandSink> HudApp<S> {
    pub fn new(
        ctx: &egui::Context,
        config: &ClientConfig,
        dispatcher: CommandDispatcher<S>,
        events: Receiver<SessionEvent>,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(ctx);

        let hud = HudLoop::mount(
            EguiScheduler::new(ctx.clone()),
            config.hud.clone(),
            theme.hud.clone(),
        );
        info!("voice HUD mounted");

        Self {
            store: SessionStore::new(config.welcome_message.clone()),
            events,
            dispatcher: Some(dispatcher),
            draft: TextDraft::default(),
            hud: Some(hud),
            theme,
            notice: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.store.state()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn draft(&self) -> &TextDraft {
        &self.draft
    }

    pub fn dispatcher(&self) -> Option<&CommandDispatcher<S>> {
        self.dispatcher.as_ref()
    }

    pub fn hud(&self) -> Option<&HudLoop<EguiScheduler>> {
        self.hud.as_ref()
    }

    /// Apply every queued inbound event in arrival order
    pub fn poll_events(&mut self) {
        for event in SessionChannels::drain(&self.events) {
            self.store.apply(event);
        }
    }

    /// Render one frame
    pub fn show(&mut self, ctx: &egui::Context) {
        self.poll_events();

        self.show_header(ctx);
        let intent = self.show_controls(ctx);
        self.show_content(ctx);

        if let Some(message) = &self.notice {
            if Notice::new(message, &self.theme).show(ctx) {
                self.notice = None;
            }
        } else if let Some(intent) = intent {
            self.handle_voice(intent);
        }
    }

    /// Close the session channel and stop the render loop
    pub fn shutdown(&mut self) {
        if let Some(mut hud) = self.hud.take() {
            hud.unmount();
        }
        if self.dispatcher.take().is_some() {
            info!("voice HUD shut down");
        }
    }

    /// Route a start/stop intent through the dispatcher
    ///
    /// A rejected start raises the blocking notice.
    pub fn handle_voice(&mut self, intent: VoiceIntent) {
        let Some(dispatcher) = &self.dispatcher else {
            return;
        };
        match intent {
            VoiceIntent::Start => {
                if let Err(e) = dispatcher.start_listening(&mut self.store) {
                    debug!("start rejected: {}", e);
                    self.notice = Some(e.user_message());
                }
            }
            VoiceIntent::Stop => dispatcher.stop_listening(&mut self.store),
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        let fps = self.hud.as_ref().map_or(0.0, |hud| hud.fps());

        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Voice Assistant")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            RichText::new(format!("{:.0} FPS", fps))
                                .size(11.0)
                                .family(egui::FontFamily::Monospace)
                                .color(self.theme.text_muted),
                        );
                        ui.add_space(self.theme.spacing_sm);
                        StatusBar::new(self.store.state(), &self.theme).show(ui);
                    });
                });
            });
    }

    fn show_controls(&mut self, ctx: &egui::Context) -> Option<VoiceIntent> {
        let mut intent = None;

        TopBottomPanel::bottom("controls")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    intent = VoiceButton::new(self.store.state(), &self.theme).show(ui);
                });
                ui.add_space(self.theme.spacing_sm);

                let submit = InputBar::new(&mut self.draft, self.store.state(), &self.theme).show(ui);
                if submit && self.notice.is_none() {
                    if let Some(dispatcher) = &self.dispatcher {
                        self.draft.submit(&mut self.store, dispatcher);
                    }
                }
            });

        intent
    }

    fn show_content(&mut self, ctx: &egui::Context) {
        let listening = self.store.state().listening();

        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| {
                if let Some(hud) = &mut self.hud {
                    ui.vertical_centered(|ui| {
                        hud.show(ui, listening);
                    });
                    ui.add_space(self.theme.spacing);
                }
                MessageList::new(self.store.state().transcript(), &self.theme).show(ui);
            });
    }
}

impl<S: CommandSink> eframe::App for HudApp<S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.shutdown();
    }
}
