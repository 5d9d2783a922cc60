use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A half-line used for picking and occlusion queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray with a normalized direction.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `from` toward `to`, plus the distance between them.
    pub fn between(from: Vec3, to: Vec3) -> (Self, f32) {
        let delta = to - from;
        (Self::new(from, delta), delta.length())
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Transform the ray into another space.
    ///
    /// The direction is not renormalized, so a hit distance `t` found in the
    /// target space is the same `t` along the original ray.
    pub fn transformed(&self, m: &Mat4) -> Self {
        Self {
            origin: m.transform_point3(self.origin),
            direction: m.transform_vector3(self.direction),
        }
    }

    /// Nearest non-negative hit distance against a sphere.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let oc = self.origin - center;
        let a = self.direction.length_squared();
        if a == 0.0 {
            return None;
        }
        let half_b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let disc = half_b * half_b - a * c;
        if disc < 0.0 {
            return None;
        }
        let sqrt_d = disc.sqrt();
        let near = (-half_b - sqrt_d) / a;
        let far = (-half_b + sqrt_d) / a;
        if far < 0.0 {
            None
        } else {
            Some(near.max(0.0))
        }
    }

    /// Moller-Trumbore, double sided. Returns the hit distance if non-negative.
    pub fn intersect_triangle(&self, &[a, b, c]: &[Vec3; 3]) -> Option<f32> {
        let e1 = b - a;
        let e2 = c - a;
        let p = self.direction.cross(e2);
        let det = e1.dot(p);
        if det.abs() < 1e-8 {
            return None;
        }
        let inv = 1.0 / det;
        let s = self.origin - a;
        let u = s.dot(p) * inv;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(e1);
        let v = self.direction.dot(q) * inv;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(q) * inv;
        (t >= 0.0).then_some(t)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The box spanned by `[-0.5, 0.5]` on every axis.
    pub fn unit_cube() -> Self {
        Self::new(Vec3::splat(-0.5), Vec3::splat(0.5))
    }

    /// Smallest box containing every point; `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| {
            Self::new(b.min.min(p), b.max.max(p))
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Slab test. Returns the entry distance, or 0 when the origin is inside.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            if d.abs() < f32::EPSILON {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }
}

/// Triangle soup in a local space, with its bounds as a broad phase.
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleMesh {
    bounds: Aabb,
    triangles: Vec<[Vec3; 3]>,
}

impl TriangleMesh {
    /// Build from indexed positions. Without indices every three positions
    /// form a triangle. Triangles with an out-of-range index are dropped.
    /// Returns `None` when no triangle survives.
    pub fn from_indexed(positions: &[[f32; 3]], indices: &[u32]) -> Option<Self> {
        let vertex = |i: u32| positions.get(i as usize).map(|p| Vec3::from_array(*p));
        let triangles: Vec<[Vec3; 3]> = if indices.is_empty() {
            positions
                .chunks_exact(3)
                .map(|c| [c[0], c[1], c[2]].map(Vec3::from_array))
                .collect()
        } else {
            indices
                .chunks_exact(3)
                .filter_map(|c| Some([vertex(c[0])?, vertex(c[1])?, vertex(c[2])?]))
                .collect()
        };
        let bounds = Aabb::from_points(triangles.iter().flatten().copied())?;
        Some(Self { bounds, triangles })
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Nearest hit distance against any triangle, either winding.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        self.bounds.intersect(ray)?;
        self.triangles
            .iter()
            .filter_map(|tri| ray.intersect_triangle(tri))
            .min_by(f32::total_cmp)
    }
}
