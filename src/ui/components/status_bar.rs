//! Connection status indicator
//!
//! A colored dot plus the status text from [`SessionState::status_label`].

use crate::session::{LinkState, SessionState};
use crate::ui::theme::Theme;
use egui::{self, Color32, RichText, Vec2};

/// Coarse connection status
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkStatus {
    /// Channel open (green)
    Online,
    /// Waiting on a reconnect attempt (yellow, pulsing)
    Retrying,
    /// Closed with nothing scheduled (red)
    Offline,
}

impl LinkStatus {
    pub fn of(state: &SessionState) -> Self {
        if state.connected() {
            return LinkStatus::Online;
        }
        match state.link() {
            LinkState::Retrying { .. } => LinkStatus::Retrying,
            LinkState::Idle | LinkState::Exhausted => LinkStatus::Offline,
        }
    }
}

/// Status indicator for the header
pub struct StatusBar<'a> {
    state: &'a SessionState,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a SessionState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let status = LinkStatus::of(self.state);
        let base = match status {
            LinkStatus::Online => self.theme.success,
            LinkStatus::Retrying => self.theme.warning,
            LinkStatus::Offline => self.theme.error,
        };

        let color = if status == LinkStatus::Retrying {
            let t = ui.ctx().input(|i| i.time);
            let pulse = ((t * 2.0).sin() * 0.5 + 0.5) as f32;
            Color32::from_rgba_unmultiplied(
                base.r(),
                base.g(),
                base.b(),
                (255.0 * (0.6 + 0.4 * pulse)) as u8,
            )
        } else {
            base
        };

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(Vec2::splat(10.0), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 5.0, color);
            ui.label(
                RichText::new(self.state.status_label())
                    .size(12.0)
                    .color(self.theme.text_secondary),
            );
        })
        .response
    }
}
