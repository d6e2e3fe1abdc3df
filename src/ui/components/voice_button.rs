//! Start/stop listening control
//!
//! Reports what the user asked for; the app routes it through the
//! [`CommandDispatcher`](crate::dispatch::CommandDispatcher).

use crate::session::SessionState;
use crate::ui::theme::Theme;
use egui::{Key, RichText, Vec2};

/// Intent raised by the voice button
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoiceIntent {
    Start,
    Stop,
}

pub struct VoiceButton<'a> {
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> VoiceButton<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> Option<VoiceIntent> {
        let mut intent = if self.state.listening() {
            self.show_stop(ui)
        } else {
            self.show_start(ui)
        };

        // Space toggles when no text field has focus
        let space_pressed = ui.input(|i| i.key_pressed(Key::Space));
        let any_widget_focused = ui.memory(|m| m.focused().is_some());
        if intent.is_none() && space_pressed && !any_widget_focused {
            intent = Some(if self.state.listening() {
                VoiceIntent::Stop
            } else {
                VoiceIntent::Start
            });
        }

        intent
    }

    fn show_start(&self, ui: &mut egui::Ui) -> Option<VoiceIntent> {
        let label = self.state.start_label();
        let color = if self.state.loading() {
            self.theme.warning
        } else {
            self.theme.text_primary
        };
        let button = egui::Button::new(RichText::new(label).size(15.0).color(color))
            .min_size(Vec2::new(180.0, 44.0))
            .rounding(self.theme.button_rounding)
            .stroke(egui::Stroke::new(1.0, self.theme.accent.gamma_multiply(0.6)));

        let response = ui.add_enabled(self.state.can_start(), button);
        let tooltip = if self.state.connected() {
            "Start listening (Space)"
        } else {
            "Not connected"
        };
        let response = response.on_disabled_hover_text(tooltip).on_hover_text(tooltip);

        response.clicked().then_some(VoiceIntent::Start)
    }

    fn show_stop(&self, ui: &mut egui::Ui) -> Option<VoiceIntent> {
        let listening = self.theme.hud.listening;
        let color = egui::Color32::from_rgb(listening.0, listening.1, listening.2);
        let button = egui::Button::new(RichText::new("Stop").size(15.0).color(egui::Color32::WHITE))
            .min_size(Vec2::new(180.0, 44.0))
            .rounding(self.theme.button_rounding)
            .fill(color.gamma_multiply(0.5));

        let response = ui.add(button);
        let rect = response.rect;

        let t = ui.ctx().input(|i| i.time);
        let pulse = ((t * 3.0).sin() * 0.5 + 0.5) as f32;
        ui.painter().rect_stroke(
            rect.expand(2.0 + pulse * 4.0),
            self.theme.button_rounding,
            egui::Stroke::new(2.0, color.gamma_multiply(1.0 - pulse * 0.6)),
        );
        ui.ctx().request_repaint();

        response
            .on_hover_text("Stop listening (Space)")
            .clicked()
            .then_some(VoiceIntent::Stop)
    }
}
