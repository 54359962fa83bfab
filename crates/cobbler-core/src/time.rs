//! Frame timing for the render loop
//!
//! The configurator is frame-driven: camera smoothing consumes the clamped
//! delta, auto-rotate consumes the frame count.

use serde::{Deserialize, Serialize};

/// Configuration for the frame clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameClockConfig {
    /// Maximum delta time handed out per frame (long stalls are clamped)
    pub max_delta_time: f32,
    /// Delta used when the host has no wall clock (headless stepping)
    pub fixed_delta_time: f32,
}

impl Default for FrameClockConfig {
    fn default() -> Self {
        Self {
            max_delta_time: 0.1,
            fixed_delta_time: 1.0 / 60.0,
        }
    }
}

/// Per-frame time tracking
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    /// Configuration
    pub config: FrameClockConfig,
    /// Time since the clock started in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
}

impl FrameClock {
    /// Create a new frame clock with custom config
    pub fn new(config: FrameClockConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Advance the clock with the raw delta from the previous frame and
    /// return the clamped delta
    pub fn tick(&mut self, raw_delta: f32) -> f32 {
        let raw = if raw_delta.is_finite() { raw_delta.max(0.0) } else { 0.0 };
        self.delta_time = raw.min(self.config.max_delta_time);
        self.total_time += self.delta_time as f64;
        self.frame_count += 1;
        self.delta_time
    }

    /// Advance by the configured fixed delta
    pub fn tick_fixed(&mut self) -> f32 {
        self.tick(self.config.fixed_delta_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_clock() {
        let mut clock = FrameClock::default();
        let dt = clock.tick(0.016);

        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(clock.frame_count, 1);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let mut clock = FrameClock::default();
        assert_eq!(clock.tick(5.0), clock.config.max_delta_time);
        assert_eq!(clock.tick(f32::NAN), 0.0);
        assert_eq!(clock.tick(-1.0), 0.0);
        assert_eq!(clock.frame_count, 3);
    }

    #[test]
    fn test_fixed_tick_accumulates() {
        let mut clock = FrameClock::default();
        for _ in 0..60 {
            clock.tick_fixed();
        }
        assert!((clock.total_time - 1.0).abs() < 1e-4);
    }
}
