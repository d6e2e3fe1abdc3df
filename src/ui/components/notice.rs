//! Blocking notice for rejected actions

use crate::ui::theme::Theme;
use egui::{self, RichText};

/// Modal notice with a single OK button
pub struct Notice<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> Notice<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }

    /// Show the notice; true once the user dismisses it
    pub fn show(self, ctx: &egui::Context) -> bool {
        let screen = ctx.screen_rect();
        // Dim and swallow input behind the window
        egui::Area::new(egui::Id::new("notice_backdrop"))
            .fixed_pos(screen.min)
            .order(egui::Order::Middle)
            .show(ctx, |ui| {
                ui.allocate_response(screen.size(), egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_black_alpha(160));
            });

        let mut dismissed = false;
        egui::Window::new("Notice")
            .collapsible(false)
            .resizable(false)
            .order(egui::Order::Foreground)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(RichText::new(self.message).color(self.theme.text_primary));
                ui.add_space(self.theme.spacing_sm);
                ui.vertical_centered(|ui| {
                    if ui.button("OK").clicked() {
                        dismissed = true;
                    }
                });
            });

        dismissed || ctx.input(|i| i.key_pressed(egui::Key::Escape))
    }
}
