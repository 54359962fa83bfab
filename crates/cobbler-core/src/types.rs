//! Core types used throughout the Cobbler workspace

use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Local transform of a scene node: translation, rotation, and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform that only translates
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create a transform from decomposed translation / rotation / scale
    /// (the layout glTF stores node transforms in)
    pub fn from_trs(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation).normalize(),
            scale: Vec3::from_array(scale),
        }
    }

    /// Compute the local-to-parent matrix for this transform
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Translate by the given offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }

    /// Place at `eye` and rotate so -Z points at `target` (Y up)
    pub fn look_at(eye: Vec3, target: Vec3) -> Self {
        let view = Mat4::look_at_rh(eye, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            position: eye,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Interpolate position and scale linearly, rotation spherically
    pub fn lerp(a: &Transform, b: &Transform, t: f32) -> Transform {
        Transform {
            position: a.position.lerp(b.position, t),
            rotation: a.rotation.slerp(b.rotation, t),
            scale: a.scale.lerp(b.scale, t),
        }
    }
}

/// Error returned when a color string is not a valid hex color
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("empty color string")]
    Empty,

    #[error("expected 3 or 6 hex digits, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex digit in color '{0}'")]
    InvalidDigit(String),
}

/// RGBA color with floating point components (0.0 to 1.0)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);

    /// Create a color from RGB values (alpha = 1.0)
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA values
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from an sRGB hex value (0xRRGGBB), as palettes and
    /// CSS write them. Channels are stored linear, like asset base colors.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xFF) as f32 / 255.0);
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Create a color from an sRGB hex value with linear alpha (0xRRGGBBAA)
    pub fn from_hex_alpha(hex: u32) -> Self {
        let Color { r, g, b, .. } = Self::from_hex(hex >> 8);
        Self::rgba(r, g, b, (hex & 0xFF) as f32 / 255.0)
    }

    /// Parse a CSS-style hex string: `#RRGGBB`, `RRGGBB`, `#RGB` or `RGB`
    pub fn parse_hex(value: &str) -> Result<Self, ColorParseError> {
        let digits = value.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);
        if digits.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::InvalidDigit(value.to_string()));
        }

        let hex = match digits.len() {
            6 => u32::from_str_radix(digits, 16)
                .map_err(|_| ColorParseError::InvalidDigit(value.to_string()))?,
            3 => {
                // #RGB expands each nibble: #C00 -> #CC0000
                let short = u32::from_str_radix(digits, 16)
                    .map_err(|_| ColorParseError::InvalidDigit(value.to_string()))?;
                let r = (short >> 8) & 0xF;
                let g = (short >> 4) & 0xF;
                let b = short & 0xF;
                (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)
            }
            len => return Err(ColorParseError::InvalidLength(len)),
        };

        Ok(Self::from_hex(hex))
    }

    /// Format as an uppercase sRGB `#RRGGBB` string (alpha is dropped)
    pub fn to_hex_string(&self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    /// Encode the RGB channels as 8-bit sRGB
    pub fn to_rgb8(&self) -> [u8; 3] {
        let q = |v: f32| (linear_to_srgb(v.clamp(0.0, 1.0)) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Convert to an array [r, g, b]
    pub fn to_rgb(&self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to an array [r, g, b, a]
    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Same color with the RGB channels replaced, keeping this color's alpha
    pub fn with_rgb_of(&self, other: &Color) -> Color {
        Color::rgba(other.r, other.g, other.b, self.a)
    }

    /// Linear interpolation between two colors
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        Color {
            r: a.r + (b.r - a.r) * t,
            g: a.g + (b.g - a.g) * t,
            b: a.b + (b.b - a.b) * t,
            a: a.a + (b.a - a.a) * t,
        }
    }
}

/// sRGB transfer function, decoding direction
pub fn srgb_to_linear(c: f32) -> f32 {
    if c >= 1.0 {
        1.0
    } else if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB transfer function, encoding direction
pub fn linear_to_srgb(c: f32) -> f32 {
    if c >= 1.0 {
        1.0
    } else if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}
