//! Text label attached to an object and hidden when something covers it.
//!
//! Occlusion is a single ray from the eye to the label's anchor. While
//! occluded the label fades to zero opacity and half size over
//! [`TRANSITION_SECS`]; it comes back the same way.

use glam::{Mat4, Vec3};
use std::sync::Arc;
use vitrine_common::{Aabb, Ray, TriangleMesh};

pub const TRANSITION_SECS: f32 = 0.2;
pub const HIDDEN_SCALE: f32 = 0.5;
/// Pixels per world unit at a distance factor of 1.
pub const PIXELS_PER_UNIT: f32 = 400.0;

/// Geometry that can hide a label.
#[derive(Debug, Clone)]
pub enum Occluder {
    /// A local box placed in the world.
    Box { world: Mat4, bounds: Aabb },
    /// A local triangle surface placed in the world.
    Mesh { world: Mat4, surface: Arc<TriangleMesh> },
    Sphere { center: Vec3, radius: f32 },
}

impl Occluder {
    /// Distance along `ray` to the first surface, if hit.
    pub fn hit(&self, ray: &Ray) -> Option<f32> {
        match self {
            Occluder::Box { world, bounds } => {
                if world.determinant() == 0.0 {
                    return None;
                }
                bounds.intersect(&ray.transformed(&world.inverse()))
            }
            Occluder::Mesh { world, surface } => {
                if world.determinant() == 0.0 {
                    return None;
                }
                surface.intersect(&ray.transformed(&world.inverse()))
            }
            Occluder::Sphere { center, radius } => ray.intersect_sphere(*center, *radius),
        }
    }
}

/// True if any occluder is hit strictly between `eye` and `anchor`.
pub fn is_occluded(eye: Vec3, anchor: Vec3, occluders: &[Occluder]) -> bool {
    let (ray, distance) = Ray::between(eye, anchor);
    if distance <= f32::EPSILON {
        return false;
    }
    occluders
        .iter()
        .filter_map(|o| o.hit(&ray))
        .any(|d| d < distance - 1e-4)
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelOverlay {
    pub text: String,
    /// Anchor in the parent object's local space.
    pub anchor: Vec3,
    pub distance_factor: f32,
    occluded: bool,
    opacity: f32,
    scale: f32,
}

impl LabelOverlay {
    pub fn new(text: impl Into<String>, anchor: Vec3, distance_factor: f32) -> Self {
        Self {
            text: text.into(),
            anchor,
            distance_factor,
            occluded: false,
            opacity: 1.0,
            scale: 1.0,
        }
    }

    pub fn anchor_world(&self, parent: &Mat4) -> Vec3 {
        parent.transform_point3(self.anchor)
    }

    /// The label's plane in the world: origin at the anchor, text along
    /// local +X and +Y, facing the parent's +Z.
    pub fn plane(&self, parent: &Mat4) -> Mat4 {
        *parent * Mat4::from_translation(self.anchor)
    }

    pub fn is_occluded(&self) -> bool {
        self.occluded
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// World units covered by one pixel of label text at full scale.
    pub fn world_units_per_pixel(&self) -> f32 {
        self.distance_factor / PIXELS_PER_UNIT
    }

    /// Record the occlusion state. Returns whether it changed.
    pub fn set_occluded(&mut self, occluded: bool) -> bool {
        if self.occluded == occluded {
            return false;
        }
        self.occluded = occluded;
        tracing::debug!(label = %self.text, occluded, "label occlusion changed");
        true
    }

    /// Advance the fade and shrink transitions by `dt` seconds.
    pub fn step(&mut self, dt: f32) {
        let (opacity, scale) = if self.occluded {
            (0.0, HIDDEN_SCALE)
        } else {
            (1.0, 1.0)
        };
        let progress = (dt.max(0.0) / TRANSITION_SECS).min(1.0);
        self.opacity = approach(self.opacity, opacity, progress);
        self.scale = approach(self.scale, scale, progress * (1.0 - HIDDEN_SCALE));
    }
}

fn approach(current: f32, target: f32, max_step: f32) -> f32 {
    if current < target {
        (current + max_step).min(target)
    } else {
        (current - max_step).max(target)
    }
}
