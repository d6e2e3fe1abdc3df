//! Per-frame scheduling for the render loop

/// Identifies one requested frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameToken(pub u64);

/// Platform frame-pacing primitive
pub trait FrameScheduler {
    /// Ask for one more frame callback
    fn request_frame(&mut self) -> FrameToken;

    /// Withdraw a requested frame; unknown or already-fired tokens are ignored
    fn cancel_frame(&mut self, token: FrameToken);
}

/// Scheduler backed by egui repaint requests
///
/// egui cannot withdraw a repaint that was already requested, so a cancelled
/// token simply ends the chain: the loop never asks again.
pub struct EguiScheduler {
    ctx: egui::Context,
    next: u64,
    live: Option<FrameToken>,
}

impl EguiScheduler {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            next: 0,
            live: None,
        }
    }

    /// Token of the outstanding request, if any
    pub fn live(&self) -> Option<FrameToken> {
        self.live
    }
}

impl FrameScheduler for EguiScheduler {
    fn request_frame(&mut self) -> FrameToken {
        self.next += 1;
        let token = FrameToken(self.next);
        self.live = Some(token);
        self.ctx.request_repaint();
        token
    }

    fn cancel_frame(&mut self, token: FrameToken) {
        if self.live == Some(token) {
            self.live = None;
        }
    }
}
