use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Linear interpolation from `a` toward `b` by factor `t`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Spatial transform: position, Euler rotation (XYZ order, radians), scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Rotation as a quaternion, applying X then Y then Z about the local axes.
    pub fn quat(&self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        )
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.quat(), self.position)
    }

    pub fn set_uniform_scale(&mut self, s: f32) {
        self.scale = Vec3::splat(s);
    }
}

/// Linear RGB color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse a CSS-style keyword or `#rrggbb` hex string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "black" => Some(Self::BLACK),
            hex => {
                let digits = hex.strip_prefix('#')?;
                if digits.len() != 6 {
                    return None;
                }
                let value = u32::from_str_radix(digits, 16).ok()?;
                Some(Self::rgb(
                    ((value >> 16) & 0xff) as f32 / 255.0,
                    ((value >> 8) & 0xff) as f32 / 255.0,
                    (value & 0xff) as f32 / 255.0,
                ))
            }
        }
    }

    /// Move this color toward `target` by `alpha` (1.0 snaps to the target).
    pub fn lerp_towards(&mut self, target: Color, alpha: f32) {
        self.r = lerp(self.r, target.r, alpha);
        self.g = lerp(self.g, target.g, alpha);
        self.b = lerp(self.b, target.b, alpha);
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
