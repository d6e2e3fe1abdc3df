//! Transcript view
//!
//! One row per turn, in arrival order: role icon, text and local time.

use crate::session::{Turn, TurnKind};
use crate::ui::theme::Theme;
use egui::{self, Align, RichText};

/// Icon shown next to a turn
pub fn turn_icon(kind: TurnKind) -> &'static str {
    match kind {
        TurnKind::User => "👤",
        TurnKind::Assistant => "🤖",
        TurnKind::Error => "⚠",
    }
}

/// Transcript component
pub struct MessageList<'a> {
    turns: &'a [Turn],
    theme: &'a Theme,
}

impl<'a> MessageList<'a> {
    pub fn new(turns: &'a [Turn], theme: &'a Theme) -> Self {
        Self { turns, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                ui.add_space(self.theme.spacing_sm);
                if self.turns.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new("Waiting for the assistant...")
                                .size(13.0)
                                .color(self.theme.text_muted),
                        );
                    });
                }
                for turn in self.turns {
                    self.show_turn(ui, turn);
                    ui.add_space(self.theme.spacing_sm);
                }
            });
    }

    fn show_turn(&self, ui: &mut egui::Ui, turn: &Turn) {
        let text_color = match turn.kind {
            TurnKind::Error => self.theme.error,
            _ => self.theme.text_primary,
        };

        egui::Frame::none()
            .fill(self.theme.row_fill(turn.kind))
            .rounding(self.theme.card_rounding)
            .inner_margin(egui::Margin::symmetric(12.0, 8.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal_top(|ui| {
                    ui.label(RichText::new(turn_icon(turn.kind)).size(16.0));
                    ui.with_layout(egui::Layout::top_down(Align::LEFT), |ui| {
                        let response = ui.label(RichText::new(&turn.text).color(text_color));
                        response.widget_info(|| {
                            egui::WidgetInfo::labeled(
                                egui::WidgetType::Label,
                                true,
                                format!("{} turn: {}", turn.kind, turn.text),
                            )
                        });
                        ui.label(
                            RichText::new(turn.time_label())
                                .size(10.0)
                                .color(self.theme.text_muted),
                        );
                    });
                });
            });
    }
}
