//! Cobbler Core - Core types and utilities for the Cobbler configurator
//!
//! This crate provides the foundational types used throughout the workspace:
//! - Mathematical primitives (re-exported from glam)
//! - Transform for node positioning
//! - Color with sRGB hex parsing for palette values, stored linear
//! - Frame clock for the render loop

pub mod time;
pub mod types;

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use time::{FrameClock, FrameClockConfig};
pub use types::{linear_to_srgb, srgb_to_linear, Color, ColorParseError, Transform};
