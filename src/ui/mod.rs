//! egui front end

pub mod app;
pub mod components;
pub mod theme;

pub use app::HudApp;
pub use theme::Theme;
