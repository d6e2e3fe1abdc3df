//! Voice assistant HUD client
//!
//! Keeps a local session in sync with a remote voice assistant over one
//! persistent channel, and renders an animated listening indicator.

pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod render;
pub mod session;
pub mod ui;
pub mod utils;

pub use config::{ClientConfig, HudConfig, ReconnectPolicy};
pub use error::{HudError, Result};
