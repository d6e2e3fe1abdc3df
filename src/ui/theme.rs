//! Colors and styling for the HUD window

use crate::render::HudPalette;
use egui::{Color32, FontFamily, FontId, Rounding, Stroke, Vec2, Visuals};

/// Application theme
#[derive(Clone, Debug)]
pub struct Theme {
    /// Accent used for interactive elements
    pub accent: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub error: Color32,

    pub bg_primary: Color32,
    pub bg_secondary: Color32,
    pub bg_tertiary: Color32,

    pub text_primary: Color32,
    pub text_secondary: Color32,
    pub text_muted: Color32,

    /// Transcript row backgrounds
    pub user_row: Color32,
    pub assistant_row: Color32,
    pub error_row: Color32,

    /// Listening indicator colors
    pub hud: HudPalette,

    pub button_rounding: Rounding,
    pub card_rounding: Rounding,

    pub spacing: f32,
    pub spacing_lg: f32,
    pub spacing_sm: f32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        let hud = HudPalette::default();
        let (r, g, b) = hud.idle;
        let accent = Color32::from_rgb(r, g, b);
        Self {
            accent,
            success: Color32::from_rgb(34, 197, 94),
            warning: Color32::from_rgb(234, 179, 8),
            error: Color32::from_rgb(239, 68, 68),

            bg_primary: hud.background,
            bg_secondary: Color32::from_rgb(20, 27, 61),
            bg_tertiary: Color32::from_rgb(34, 43, 86),

            text_primary: Color32::from_rgb(236, 254, 255),
            text_secondary: Color32::from_rgb(165, 243, 252),
            text_muted: Color32::from_rgb(120, 140, 170),

            user_row: Color32::from_rgba_unmultiplied(0, 255, 255, 24),
            assistant_row: Color32::from_rgba_unmultiplied(255, 255, 255, 12),
            error_row: Color32::from_rgba_unmultiplied(239, 68, 68, 36),

            hud,

            button_rounding: Rounding::same(8.0),
            card_rounding: Rounding::same(12.0),

            spacing: 16.0,
            spacing_lg: 24.0,
            spacing_sm: 8.0,
        }
    }

    /// Apply this theme to egui
    pub fn apply(&self, ctx: &egui::Context) {
        let mut visuals = Visuals::dark();

        visuals.panel_fill = self.bg_primary;
        visuals.window_fill = self.bg_secondary;
        visuals.extreme_bg_color = self.bg_tertiary;

        visuals.widgets.noninteractive.bg_fill = self.bg_secondary;
        visuals.widgets.noninteractive.fg_stroke = Stroke::new(1.0, self.text_muted);

        visuals.widgets.inactive.bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.weak_bg_fill = self.bg_tertiary;
        visuals.widgets.inactive.fg_stroke = Stroke::new(1.0, self.text_secondary);

        visuals.widgets.hovered.bg_fill = self.accent.gamma_multiply(0.4);
        visuals.widgets.hovered.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.widgets.active.bg_fill = self.accent.gamma_multiply(0.6);
        visuals.widgets.active.fg_stroke = Stroke::new(1.0, self.text_primary);

        visuals.selection.bg_fill = self.accent.gamma_multiply(0.3);
        visuals.selection.stroke = Stroke::new(1.0, self.accent);

        visuals.window_rounding = self.card_rounding;
        visuals.window_stroke = Stroke::new(1.0, self.accent.gamma_multiply(0.5));

        ctx.set_visuals(visuals);

        let mut style = (*ctx.style()).clone();
        style.spacing.item_spacing = Vec2::splat(self.spacing_sm);
        style.spacing.button_padding = Vec2::new(self.spacing, self.spacing_sm);
        style.text_styles.insert(
            egui::TextStyle::Heading,
            FontId::new(22.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Body,
            FontId::new(14.0, FontFamily::Proportional),
        );
        style.text_styles.insert(
            egui::TextStyle::Small,
            FontId::new(11.0, FontFamily::Proportional),
        );
        ctx.set_style(style);
    }

    /// Row background for a transcript turn
    pub fn row_fill(&self, kind: crate::session::TurnKind) -> Color32 {
        use crate::session::TurnKind;
        match kind {
            TurnKind::User => self.user_row,
            TurnKind::Assistant => self.assistant_row,
            TurnKind::Error => self.error_row,
        }
    }
}
