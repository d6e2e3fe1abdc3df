//! Typed command input

use crate::dispatch::TextDraft;
use crate::session::SessionState;
use crate::ui::theme::Theme;
use egui::{self, Key, RichText, Vec2};

pub const PLACEHOLDER: &str = "Type a command or question...";
/// Accessibility labels
pub const INPUT_LABEL: &str = "Command input";
pub const SEND_LABEL: &str = "Send command";

/// Text field plus send button, editing a [`TextDraft`]
pub struct InputBar<'a> {
    draft: &'a mut TextDraft,
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> InputBar<'a> {
    pub fn new(draft: &'a mut TextDraft, state: &'a SessionState, theme: &'a Theme) -> Self {
        Self {
            draft,
            state,
            theme,
        }
    }

    /// Show the bar; true when the user asked to submit the draft
    pub fn show(self, ui: &mut egui::Ui) -> bool {
        let enabled = self.state.can_submit_text();
        let mut submit = false;

        egui::Frame::none()
            .fill(self.theme.bg_secondary)
            .rounding(self.theme.card_rounding)
            .inner_margin(self.theme.spacing_sm)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let available_width = ui.available_width() - 60.0;
                    let text_edit = egui::TextEdit::singleline(&mut self.draft.text)
                        .hint_text(PLACEHOLDER)
                        .desired_width(available_width)
                        .font(egui::TextStyle::Body)
                        .margin(egui::Margin::symmetric(12.0, 8.0));
                    let response = ui.add_enabled(enabled, text_edit);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::TextEdit, enabled, INPUT_LABEL)
                    });

                    if response.lost_focus() && ui.input(|i| i.key_pressed(Key::Enter)) {
                        submit = true;
                        response.request_focus();
                    }

                    let can_send = enabled && self.draft.is_sendable();
                    let button = egui::Button::new(
                        RichText::new("➤").size(18.0).color(egui::Color32::WHITE),
                    )
                    .min_size(Vec2::splat(40.0))
                    .rounding(self.theme.button_rounding)
                    .fill(if can_send {
                        self.theme.accent.gamma_multiply(0.6)
                    } else {
                        self.theme.text_muted.gamma_multiply(0.4)
                    });

                    let response = ui.add_enabled(can_send, button);
                    response.widget_info(|| {
                        egui::WidgetInfo::labeled(egui::WidgetType::Button, can_send, SEND_LABEL)
                    });
                    if response.on_hover_text("Send (Enter)").clicked() {
                        submit = true;
                    }
                });
            });

        submit && enabled && self.draft.is_sendable()
    }
}
