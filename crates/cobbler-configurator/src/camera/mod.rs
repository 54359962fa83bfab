//! Camera system module
//!
//! An orbit camera around a target point with damped reframing onto a
//! bounding box and optional auto-rotation.

mod config;
mod controller;

pub use config::CameraConfig;
pub use controller::{CameraPose, OrbitCamera};
