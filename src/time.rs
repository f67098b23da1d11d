//! Frame timing for movement rates and the FPS readout.
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // Once per frame:
//! let dt = clock.tick();
//! if clock.fps_updated() {
//!     window.set_title(&format!("{:.0} fps", clock.fps()));
//! }
//! ```

use std::time::{Duration, Instant};

/// Longest delta handed to movement code; avoids huge jumps after a stall.
const MAX_DELTA: f32 = 0.25;

#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    /// Time since last frame in seconds.
    delta_secs: f32,
    frame_count: u64,
    /// Calculated FPS (updated periodically).
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
    fps_updated: bool,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Clock whose FPS estimate refreshes every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: interval,
            fps_updated: false,
        }
    }

    /// Advance one frame. Returns the clamped delta in seconds.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let raw_delta = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.delta_secs = raw_delta.min(MAX_DELTA);
        self.last_frame = now;
        self.frame_count += 1;

        let fps_elapsed = now.saturating_duration_since(self.fps_update_time);
        self.fps_updated = fps_elapsed >= self.fps_update_interval;
        if self.fps_updated {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }

        self.delta_secs
    }

    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Total frames since start.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Whether the last `tick` produced a new FPS estimate.
    #[inline]
    pub fn fps_updated(&self) -> bool {
        self.fps_updated
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clock_new() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_fps_over_interval() {
        let mut clock = FrameClock::with_interval(Duration::from_millis(500));
        let start = clock.last_frame;
        for i in 1..=30 {
            clock.tick_at(start + Duration::from_millis(i * 1000 / 60));
        }
        assert_eq!(clock.frame(), 30);
        assert!(clock.fps_updated());
        assert!((clock.fps() - 60.0).abs() < 1.0, "fps = {}", clock.fps());
    }

    #[test]
    fn test_delta_is_clamped() {
        let mut clock = FrameClock::new();
        let start = clock.last_frame;
        let dt = clock.tick_at(start + Duration::from_secs(3));
        assert_eq!(dt, MAX_DELTA);
    }
}
