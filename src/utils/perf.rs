//! Frame timing
//!
//! Sliding-window measurements of the render loop's frame interval, shown in
//! the header so stutter is visible while developing.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Frame intervals over a fixed-size window
#[derive(Debug)]
pub struct FrameTimer {
    samples: VecDeque<Duration>,
    max_samples: usize,
    last_frame: Option<Instant>,
}

impl FrameTimer {
    /// Create a timer keeping the last `max_samples` intervals
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples),
            max_samples: max_samples.max(1),
            last_frame: None,
        }
    }

    /// Mark the start of a frame
    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last_frame {
            self.record(now.saturating_duration_since(last));
        }
        self.last_frame = Some(now);
    }

    /// Record one frame interval
    pub fn record(&mut self, interval: Duration) {
        if self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(interval);
    }

    /// Mean interval over the window
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Longest interval in the window
    pub fn worst(&self) -> Duration {
        self.samples.iter().max().copied().unwrap_or(Duration::ZERO)
    }

    /// Frames per second derived from the mean interval
    pub fn fps(&self) -> f32 {
        let avg = self.average().as_secs_f32();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Forget all samples, e.g. after the loop was unmounted
    pub fn reset(&mut self) {
        self.samples.clear();
        self.last_frame = None;
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_timer_average_and_fps() {
        let mut timer = FrameTimer::new(10);
        for _ in 0..4 {
            timer.record(Duration::from_millis(20));
        }
        assert_eq!(timer.count(), 4);
        assert_eq!(timer.average(), Duration::from_millis(20));
        assert!((timer.fps() - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_frame_timer_window_is_bounded() {
        let mut timer = FrameTimer::new(3);
        for i in 1..=100 {
            timer.record(Duration::from_millis(i));
        }
        assert_eq!(timer.count(), 3);
        assert_eq!(timer.worst(), Duration::from_millis(100));
    }

    #[test]
    fn test_tick_measures_intervals() {
        let mut timer = FrameTimer::default();
        let start = Instant::now();
        timer.tick(start);
        assert_eq!(timer.count(), 0);
        timer.tick(start + Duration::from_millis(16));
        timer.tick(start + Duration::from_millis(40));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.worst(), Duration::from_millis(24));

        timer.reset();
        assert_eq!(timer.count(), 0);
        assert_eq!(timer.fps(), 0.0);
    }
}
