pub mod hud;
pub mod scheduler;

pub use hud::{HudFrame, HudLoop, HudPalette, HudPhase, HudShape};
pub use scheduler::{EguiScheduler, FrameScheduler, FrameToken};
