//! Orbit camera with damped reframing

use std::f32::consts::{FRAC_PI_2, TAU};

use cobbler_scene::{Aabb, Ray};
use glam::{Mat4, Vec2, Vec3};
use tracing::{debug, warn};

use super::CameraConfig;

/// Components closer than this to their goal count as settled
const SETTLE_EPSILON: f32 = 1e-4;

/// Spherical camera placement around a target point.
///
/// `yaw` is the azimuth around +Y measured from +Z, `polar` the angle down
/// from +Y. The camera sits at
/// `target + distance * (sin(polar) sin(yaw), cos(polar), sin(polar) cos(yaw))`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub target: Vec3,
    pub yaw: f32,
    pub polar: f32,
    pub distance: f32,
}

impl CameraPose {
    /// Pose that places the camera at `position` looking at `target`
    pub fn from_position(position: Vec3, target: Vec3) -> Self {
        let offset = position - target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return Self {
                target,
                yaw: 0.0,
                polar: FRAC_PI_2,
                distance: 0.0,
            };
        }
        Self {
            target,
            yaw: offset.x.atan2(offset.z),
            polar: (offset.y / distance).clamp(-1.0, 1.0).acos(),
            distance,
        }
    }

    /// Unit vector from the target towards the camera
    pub fn offset_direction(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(sin_polar * sin_yaw, cos_polar, sin_polar * cos_yaw)
    }

    pub fn position(&self) -> Vec3 {
        self.target + self.offset_direction() * self.distance
    }

    /// Camera-space right and up axes
    fn basis(&self) -> (Vec3, Vec3) {
        let back = self.offset_direction();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        (right, back.cross(right))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct PoseVelocity {
    target: Vec3,
    yaw: f32,
    polar: f32,
    distance: f32,
}

/// Orbit camera controller.
///
/// Keeps a current pose (what is rendered) and a desired pose (where a
/// reframe is heading). `update` moves the current pose towards the desired
/// one with a critically damped spring.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    config: CameraConfig,
    current: CameraPose,
    desired: CameraPose,
    velocity: PoseVelocity,
    transitioning: bool,
    auto_rotate: bool,
}

impl OrbitCamera {
    pub fn new(config: CameraConfig) -> Self {
        let mut camera = Self {
            current: CameraPose::from_position(config.initial_position, config.initial_target),
            desired: CameraPose::from_position(config.initial_position, config.initial_target),
            config,
            velocity: PoseVelocity::default(),
            transitioning: false,
            auto_rotate: false,
        };
        camera.reset();
        camera
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// Jump back to the configured initial pose, dropping any transition.
    /// Auto-rotate is left as it was.
    pub fn reset(&mut self) {
        let pose = self.clamped(CameraPose::from_position(
            self.config.initial_position,
            self.config.initial_target,
        ));
        self.current = pose;
        self.desired = pose;
        self.velocity = PoseVelocity::default();
        self.transitioning = false;
    }

    pub fn pose(&self) -> CameraPose {
        self.current
    }

    pub fn desired_pose(&self) -> CameraPose {
        self.desired
    }

    pub fn position(&self) -> Vec3 {
        self.current.position()
    }

    pub fn target(&self) -> Vec3 {
        self.current.target
    }

    pub fn yaw(&self) -> f32 {
        self.current.yaw
    }

    pub fn polar(&self) -> f32 {
        self.current.polar
    }

    pub fn distance(&self) -> f32 {
        self.current.distance
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    pub fn set_auto_rotate(&mut self, enabled: bool) {
        if self.auto_rotate != enabled {
            debug!("Auto-rotate {}", if enabled { "on" } else { "off" });
        }
        self.auto_rotate = enabled;
    }

    pub fn toggle_auto_rotate(&mut self) {
        self.set_auto_rotate(!self.auto_rotate);
    }

    /// Rotate a fixed step to the left around the vertical axis
    pub fn rotate_left(&mut self) {
        self.rotate_by(-self.config.rotate_step_degrees.to_radians());
    }

    /// Rotate a fixed step to the right around the vertical axis
    pub fn rotate_right(&mut self) {
        self.rotate_by(self.config.rotate_step_degrees.to_radians());
    }

    /// Immediate yaw change applied to both the rendered and the goal pose
    fn rotate_by(&mut self, delta: f32) {
        self.current.yaw += delta;
        self.desired.yaw += delta;
        self.wrap_yaw();
    }

    /// Start a smoothed transition that frames `bounds` in view.
    ///
    /// Yaw and polar snap to the nearest right angle (polar then clamped),
    /// the target moves to the box center, and the distance is chosen so the
    /// padded box fits the frustum. Returns false for an empty box.
    pub fn fit_to_box(&mut self, bounds: &Aabb, aspect: f32) -> bool {
        if bounds.is_empty() {
            warn!("Cannot frame an empty bounding box");
            return false;
        }

        let mut goal = CameraPose {
            target: bounds.center(),
            yaw: round_to_step(self.desired.yaw, FRAC_PI_2),
            polar: round_to_step(self.desired.polar, FRAC_PI_2),
            distance: self.desired.distance,
        };
        let (min_polar, max_polar) = self.config.polar_range();
        goal.polar = goal.polar.clamp(min_polar, max_polar);

        let (right, up) = goal.basis();
        let back = goal.offset_direction();
        let extent = |axis: Vec3| {
            let (min, max) = bounds
                .corners()
                .iter()
                .map(|c| c.dot(axis))
                .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), d| (lo.min(d), hi.max(d)));
            max - min
        };

        let padding = self.config.fit_padding * 2.0;
        let width = extent(right) + padding;
        let height = extent(up) + padding;
        let depth = extent(back);
        goal.distance = self.fit_distance(width, height, depth, aspect);

        self.desired = self.clamped(goal);
        self.transitioning = true;
        debug!(
            "Reframing on box centered at {:?}, distance {:.3}",
            self.desired.target, self.desired.distance
        );
        true
    }

    /// Distance at which a `width` x `height` rectangle fills the vertical
    /// field of view (or the horizontal one when the box is the wider shape)
    fn fit_distance(&self, width: f32, height: f32, depth: f32, aspect: f32) -> f32 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let rect_aspect = if height > 0.0 { width / height } else { f32::INFINITY };
        let height_to_fit = if rect_aspect < aspect { height } else { width / aspect };
        height_to_fit * 0.5 / (self.config.fov_radians() * 0.5).tan() + depth * 0.5
    }

    /// Advance auto-rotate and any reframe transition. Returns whether the
    /// rendered pose changed.
    pub fn update(&mut self, dt: f32) -> bool {
        let before = self.current;

        if self.auto_rotate && !self.transitioning {
            self.rotate_by(self.config.auto_rotate_step_degrees.to_radians());
        }

        if self.transitioning && dt > 0.0 {
            let smooth_time = self.config.smooth_time;
            let c = &mut self.current;
            let g = &self.desired;
            let v = &mut self.velocity;
            c.target.x = smooth_damp(c.target.x, g.target.x, &mut v.target.x, smooth_time, dt);
            c.target.y = smooth_damp(c.target.y, g.target.y, &mut v.target.y, smooth_time, dt);
            c.target.z = smooth_damp(c.target.z, g.target.z, &mut v.target.z, smooth_time, dt);
            c.yaw = smooth_damp(c.yaw, g.yaw, &mut v.yaw, smooth_time, dt);
            c.polar = smooth_damp(c.polar, g.polar, &mut v.polar, smooth_time, dt);
            c.distance = smooth_damp(c.distance, g.distance, &mut v.distance, smooth_time, dt);

            if self.is_settled() {
                self.current = self.desired;
                self.velocity = PoseVelocity::default();
                self.transitioning = false;
                debug!("Reframe settled");
            }
        }

        self.current != before
    }

    fn is_settled(&self) -> bool {
        let c = &self.current;
        let g = &self.desired;
        (c.target - g.target).abs().max_element() < SETTLE_EPSILON
            && (c.yaw - g.yaw).abs() < SETTLE_EPSILON
            && (c.polar - g.polar).abs() < SETTLE_EPSILON
            && (c.distance - g.distance).abs() < SETTLE_EPSILON
    }

    /// Keep yaw bounded by shifting both poses by the same whole turn
    fn wrap_yaw(&mut self) {
        let turns = (self.current.yaw / TAU).round();
        if turns != 0.0 {
            self.current.yaw -= turns * TAU;
            self.desired.yaw -= turns * TAU;
        }
    }

    fn clamped(&self, mut pose: CameraPose) -> CameraPose {
        let (min_polar, max_polar) = self.config.polar_range();
        let (min_distance, max_distance) = self.config.distance_range();
        pose.polar = pose.polar.clamp(min_polar, max_polar);
        pose.distance = pose.distance.clamp(min_distance, max_distance);
        pose
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.current.target, Vec3::Y)
    }

    /// Get a projection matrix
    pub fn projection_matrix(&self, aspect_ratio: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.config.fov_radians(),
            aspect_ratio,
            self.config.near,
            self.config.far,
        )
    }

    /// World-space ray from the camera through a point in normalized device
    /// coordinates (x right, y up, both in -1..1)
    pub fn ray_from_ndc(&self, ndc: Vec2, aspect_ratio: f32) -> Option<Ray> {
        if !ndc.is_finite() || !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return None;
        }
        let inverse = (self.projection_matrix(aspect_ratio) * self.view_matrix()).inverse();
        let far = inverse.project_point3(ndc.extend(1.0));
        let origin = self.position();
        Ray::new(origin, far - origin)
    }
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(CameraConfig::default())
    }
}

fn round_to_step(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

/// Critically damped spring towards `target`; never overshoots
fn smooth_damp(current: f32, target: f32, velocity: &mut f32, smooth_time: f32, dt: f32) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * dt;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);
    let change = current - target;
    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let output = target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        *velocity = 0.0;
        return target;
    }
    output
}
