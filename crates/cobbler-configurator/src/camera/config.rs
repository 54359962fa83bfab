//! Camera configuration

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Closest the camera may orbit to its target
    pub min_distance: f32,
    /// Farthest the camera may orbit from its target
    pub max_distance: f32,
    /// Smallest polar angle in degrees (0 = looking straight down)
    pub min_polar_degrees: f32,
    /// Largest polar angle in degrees
    pub max_polar_degrees: f32,
    /// Approximate time in seconds for a reframe to reach its goal
    pub smooth_time: f32,
    /// Yaw applied by one rotate-left / rotate-right command, in degrees
    pub rotate_step_degrees: f32,
    /// Yaw added per frame while auto-rotate is on, in degrees
    pub auto_rotate_step_degrees: f32,
    /// World-space margin added on every side of a box when fitting to it
    pub fit_padding: f32,
    pub initial_position: Vec3,
    pub initial_target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            min_distance: 2.0,
            max_distance: 4.0,
            min_polar_degrees: 45.0,
            max_polar_degrees: 120.0,
            smooth_time: 0.5,
            rotate_step_degrees: 45.0,
            auto_rotate_step_degrees: 0.5,
            fit_padding: 0.5,
            initial_position: Vec3::new(3.0, 2.0, 3.0),
            initial_target: Vec3::ZERO,
        }
    }
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn polar_range(&self) -> (f32, f32) {
        let min = self.min_polar_degrees.to_radians();
        let max = self.max_polar_degrees.to_radians().max(min);
        (min, max)
    }

    pub fn distance_range(&self) -> (f32, f32) {
        let min = self.min_distance.max(0.0);
        (min, self.max_distance.max(min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let config = CameraConfig::default();
        let (min_polar, max_polar) = config.polar_range();
        assert!((min_polar - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert!((max_polar - std::f32::consts::PI / 1.5).abs() < 1e-5);
        assert_eq!(config.distance_range(), (2.0, 4.0));
    }

    #[test]
    fn test_inverted_limits_collapse() {
        let config = CameraConfig {
            min_distance: 5.0,
            max_distance: 1.0,
            ..Default::default()
        };
        assert_eq!(config.distance_range(), (5.0, 5.0));
    }
}
