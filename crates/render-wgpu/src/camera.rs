use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use std::f32::consts::PI;
use vitrine_common::Ray;

const MIN_POLAR: f32 = 1e-4;

/// Orbit camera around a target, with damped rotation and panning.
///
/// Input accumulates into pending deltas; [`OrbitCamera::update`] applies a
/// `damping` fraction of them each frame and decays the rest.
/// Camera motion is view state only; it never feeds back into the scene.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub radius: f32,
    /// Azimuth around +Y, zero looking down -Z.
    pub theta: f32,
    /// Angle from +Y.
    pub phi: f32,
    /// Vertical field of view in radians.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_theta: f32,
    pending_phi: f32,
    pending_pan: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, 25.0, 0.05)
    }
}

impl OrbitCamera {
    pub fn new(position: Vec3, target: Vec3, fov_degrees: f32, damping: f32) -> Self {
        let offset = position - target;
        let radius = offset.length().max(1e-3);
        let theta = offset.x.atan2(offset.z);
        let phi = (offset.y / radius).clamp(-1.0, 1.0).acos();
        Self {
            target,
            radius,
            theta,
            phi: phi.clamp(MIN_POLAR, PI - MIN_POLAR),
            fov: fov_degrees.to_radians(),
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
            damping,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            min_distance: 0.5,
            max_distance: 100.0,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_pan: Vec3::ZERO,
        }
    }

    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + self.radius
                * Vec3::new(
                    sin_phi * self.theta.sin(),
                    self.phi.cos(),
                    sin_phi * self.theta.cos(),
                )
    }

    /// Drag by `dx, dy` pixels; a full viewport height turns by a full circle.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.pending_theta -= 2.0 * PI * dx / h * self.rotate_speed;
        self.pending_phi -= 2.0 * PI * dy / h * self.rotate_speed;
    }

    /// Dolly by wheel `steps`; positive moves closer.
    pub fn zoom(&mut self, steps: f32) {
        let scale = 0.95_f32.powf(steps * self.zoom_speed);
        self.radius = (self.radius * scale).clamp(self.min_distance, self.max_distance);
    }

    /// Pan by `dx, dy` pixels so the point under the cursor follows it.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let target_distance = self.radius * (self.fov / 2.0).tan();
        let view = self.view_matrix();
        let right = view.row(0).xyz();
        let up = view.row(1).xyz();
        self.pending_pan +=
            -right * (2.0 * dx * target_distance / h) + up * (2.0 * dy * target_distance / h);
    }

    /// Apply one frame of damped motion. Returns true while still moving.
    pub fn update(&mut self) -> bool {
        let k = if self.damping > 0.0 { self.damping } else { 1.0 };
        self.theta += self.pending_theta * k;
        self.phi = (self.phi + self.pending_phi * k).clamp(MIN_POLAR, PI - MIN_POLAR);
        self.target += self.pending_pan * k;

        let keep = 1.0 - k;
        self.pending_theta *= keep;
        self.pending_phi *= keep;
        self.pending_pan *= keep;
        self.pending_theta.abs() > 1e-6
            || self.pending_phi.abs() > 1e-6
            || self.pending_pan.length_squared() > 1e-12
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// World-space ray through a cursor position given in physical pixels.
    pub fn ray_from_cursor(&self, cursor: Vec2, viewport: Vec2) -> Ray {
        let ndc = Vec2::new(
            2.0 * cursor.x / viewport.x.max(1.0) - 1.0,
            1.0 - 2.0 * cursor.y / viewport.y.max(1.0),
        );
        let inv = self.view_projection().inverse();
        let near = inv.project_point3(ndc.extend(0.0));
        let far = inv.project_point3(ndc.extend(1.0));
        Ray::new(near, far - near)
    }

    /// Pixel position of a world point, or `None` when it is behind the camera.
    pub fn project(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection() * point.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xy() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) / 2.0 * viewport.x,
            (1.0 - ndc.y) / 2.0 * viewport.y,
        ))
    }
}
