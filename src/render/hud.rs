//! Listening indicator
//!
//! A free-running animation: every display frame the phases advance, a new
//! frame of primitives is built from the phases and the `listening` flag,
//! and the next frame is requested. The flag is passed in fresh on every
//! frame; nothing about it is cached between frames.

use super::scheduler::{FrameScheduler, FrameToken};
use crate::config::HudConfig;
use crate::utils::FrameTimer;
use egui::{Color32, Painter, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::collections::VecDeque;
use std::f32::consts::TAU;
use std::time::Instant;

/// Rotation advance per frame, in degrees
pub const ROTATION_STEP_DEG: f32 = 2.0;
/// Pulse advance per frame, in radians
pub const PULSE_STEP: f32 = 0.1;

const RING_RADII: [f32; 3] = [80.0, 110.0, 140.0];
const SPOKE_COUNT: usize = 4;
const SPOKE_LENGTH: f32 = 80.0;
const ARC_COUNT: usize = 8;
const ARC_RADIUS: f32 = 85.0;
const ARC_SWEEP_DEG: f32 = 30.0;
const ARC_POINTS: usize = 9;
const DOT_RADIUS: f32 = 5.0;
const DOT_AMPLITUDE: f32 = 3.0;
const GLOW_OFFSET: f32 = 5.0;

/// Colors of the indicator
#[derive(Clone, Debug, PartialEq)]
pub struct HudPalette {
    pub background: Color32,
    /// Hue while idle
    pub idle: (u8, u8, u8),
    /// Hue while the assistant is listening
    pub listening: (u8, u8, u8),
}

impl Default for HudPalette {
    fn default() -> Self {
        Self {
            background: Color32::from_rgb(10, 14, 39),
            idle: (0, 255, 255),
            listening: (255, 100, 100),
        }
    }
}

impl HudPalette {
    fn tint(rgb: (u8, u8, u8), alpha: f32) -> Color32 {
        Color32::from_rgba_unmultiplied(rgb.0, rgb.1, rgb.2, (alpha * 255.0).round() as u8)
    }

    fn hue(&self, listening: bool) -> (u8, u8, u8) {
        if listening {
            self.listening
        } else {
            self.idle
        }
    }

    /// Static reference rings; always the idle hue
    pub fn ring(&self) -> Color32 {
        Self::tint(self.idle, 0.1)
    }

    pub fn spoke(&self, listening: bool) -> Color32 {
        Self::tint(self.hue(listening), 0.6)
    }

    pub fn arc(&self, listening: bool) -> Color32 {
        Self::tint(self.hue(listening), 0.4)
    }

    pub fn dot(&self, listening: bool) -> Color32 {
        Self::tint(self.hue(listening), 0.8)
    }

    pub fn glow(&self, listening: bool) -> Color32 {
        Self::tint(self.hue(listening), 0.3)
    }
}

/// Rotation and pulse accumulators
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HudPhase {
    /// Rotation in degrees, within `[0, 360)`
    pub angle_deg: f32,
    /// Pulse in radians, within `[0, TAU)`
    pub pulse: f32,
}

impl HudPhase {
    /// Normalizing constructor; non-finite inputs become zero
    pub fn new(angle_deg: f32, pulse: f32) -> Self {
        Self {
            angle_deg: wrap(angle_deg, 360.0),
            pulse: wrap(pulse, TAU),
        }
    }

    /// Advance by one frame
    pub fn advance(&mut self) {
        *self = Self::new(self.angle_deg + ROTATION_STEP_DEG, self.pulse + PULSE_STEP);
    }

    /// Center dot radius for this phase
    pub fn dot_radius(&self) -> f32 {
        DOT_RADIUS + DOT_AMPLITUDE * self.pulse.sin()
    }
}

fn wrap(value: f32, period: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value.rem_euclid(period);
    // rem_euclid may round up to exactly `period` for tiny negative inputs
    if wrapped >= period {
        0.0
    } else {
        wrapped
    }
}

/// One drawing primitive, in canvas units relative to the canvas center
#[derive(Debug, Clone, PartialEq)]
pub enum HudShape {
    Ring { radius: f32, stroke: Stroke },
    Spoke { tip: Vec2, stroke: Stroke },
    Arc { radius: f32, start: f32, sweep: f32, stroke: Stroke },
    Dot { radius: f32, fill: Color32 },
}

/// Primitives for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct HudFrame {
    pub phase: HudPhase,
    pub listening: bool,
    pub shapes: Vec<HudShape>,
}

impl HudFrame {
    /// Build the frame for `phase`; a pure function of its inputs
    pub fn build(phase: HudPhase, listening: bool, palette: &HudPalette) -> Self {
        let mut shapes = Vec::with_capacity(RING_RADII.len() + SPOKE_COUNT + ARC_COUNT + 2);

        for radius in RING_RADII {
            shapes.push(HudShape::Ring {
                radius,
                stroke: Stroke::new(1.0, palette.ring()),
            });
        }

        let spoke_stroke = Stroke::new(2.0, palette.spoke(listening));
        for i in 0..SPOKE_COUNT {
            let angle = (phase.angle_deg + i as f32 * 360.0 / SPOKE_COUNT as f32).to_radians();
            shapes.push(HudShape::Spoke {
                tip: Vec2::angled(angle) * SPOKE_LENGTH,
                stroke: spoke_stroke,
            });
        }

        let arc_stroke = Stroke::new(1.0, palette.arc(listening));
        for i in 0..ARC_COUNT {
            let start = wrap(phase.angle_deg + i as f32 * 360.0 / ARC_COUNT as f32, 360.0);
            shapes.push(HudShape::Arc {
                radius: ARC_RADIUS,
                start: start.to_radians(),
                sweep: ARC_SWEEP_DEG.to_radians(),
                stroke: arc_stroke,
            });
        }

        let dot = phase.dot_radius();
        shapes.push(HudShape::Dot {
            radius: dot,
            fill: palette.dot(listening),
        });
        shapes.push(HudShape::Ring {
            radius: dot + GLOW_OFFSET,
            stroke: Stroke::new(1.0, palette.glow(listening)),
        });

        Self {
            phase,
            listening,
            shapes,
        }
    }

    /// Paint onto `painter`, scaled and with every color faded by `weight`
    pub fn paint(&self, painter: &Painter, center: Pos2, scale: f32, weight: f32) {
        let fade = |stroke: Stroke| Stroke::new(stroke.width * scale, stroke.color.gamma_multiply(weight));

        for shape in &self.shapes {
            match shape {
                HudShape::Ring { radius, stroke } => {
                    painter.circle_stroke(center, radius * scale, fade(*stroke));
                }
                HudShape::Spoke { tip, stroke } => {
                    painter.line_segment([center, center + *tip * scale], fade(*stroke));
                }
                HudShape::Arc {
                    radius,
                    start,
                    sweep,
                    stroke,
                } => {
                    let points: Vec<Pos2> = (0..ARC_POINTS)
                        .map(|k| {
                            let t = start + sweep * k as f32 / (ARC_POINTS - 1) as f32;
                            center + Vec2::angled(t) * *radius * scale
                        })
                        .collect();
                    painter.add(Shape::line(points, fade(*stroke)));
                }
                HudShape::Dot { radius, fill } => {
                    painter.circle_filled(center, radius * scale, fill.gamma_multiply(weight));
                }
            }
        }
    }
}

/// The render loop for one mount of the indicator
pub struct HudLoop<S: FrameScheduler> {
    scheduler: S,
    config: HudConfig,
    palette: HudPalette,
    phase: HudPhase,
    /// Most recent frames, oldest first, for the fade trail
    trail: VecDeque<HudFrame>,
    pending: Option<FrameToken>,
    mounted: bool,
    timer: FrameTimer,
}

impl<S: FrameScheduler> HudLoop<S> {
    /// Mount the loop and request its first frame
    pub fn mount(mut scheduler: S, config: HudConfig, palette: HudPalette) -> Self {
        let pending = Some(scheduler.request_frame());
        let trail_frames = config.trail_frames.max(1);
        Self {
            scheduler,
            config,
            palette,
            phase: HudPhase::default(),
            trail: VecDeque::with_capacity(trail_frames),
            pending,
            mounted: true,
            timer: FrameTimer::default(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn phase(&self) -> HudPhase {
        self.phase
    }

    /// Outstanding frame request, if any
    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Measured frame rate
    pub fn fps(&self) -> f32 {
        self.timer.fps()
    }

    /// Run one frame
    ///
    /// Returns the newly built frame, or `None` once unmounted.
    pub fn frame(&mut self, listening: bool) -> Option<&HudFrame> {
        if !self.mounted {
            return None;
        }
        // Keep at most one request outstanding
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }

        self.timer.tick(Instant::now());
        self.phase.advance();

        if self.trail.len() >= self.config.trail_frames.max(1) {
            self.trail.pop_front();
        }
        self.trail
            .push_back(HudFrame::build(self.phase, listening, &self.palette));

        self.pending = Some(self.scheduler.request_frame());
        self.trail.back()
    }

    /// Paint the background and the trail, newest frame at full strength
    pub fn paint(&self, painter: &Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, self.palette.background);

        let scale = rect.width().min(rect.height()) / self.config.size;
        let center = rect.center();
        let persistence = 1.0 - self.config.fade;
        let newest = self.trail.len().saturating_sub(1);

        for (i, frame) in self.trail.iter().enumerate() {
            let weight = persistence.powi((newest - i) as i32);
            frame.paint(painter, center, scale, weight);
        }
    }

    /// Allocate the drawing surface, run one frame and paint it
    pub fn show(&mut self, ui: &mut egui::Ui, listening: bool) -> egui::Response {
        let size = Vec2::splat(self.config.size);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        self.frame(listening);
        self.paint(&painter, response.rect);
        response
    }

    /// Stop the loop and withdraw the pending frame request
    pub fn unmount(&mut self) {
        if let Some(token) = self.pending.take() {
            self.scheduler.cancel_frame(token);
        }
        self.mounted = false;
        self.trail.clear();
        self.timer.reset();
    }
}

impl<S: FrameScheduler> Drop for HudLoop<S> {
    fn drop(&mut self) {
        self.unmount();
    }
}
