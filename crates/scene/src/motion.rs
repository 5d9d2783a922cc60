//! Closed-form motion for the animated objects.
//!
//! Everything here is a pure function of elapsed time, evaluated in `f64`
//! and narrowed to `f32` at the end so large phase offsets keep precision.

use glam::Vec3;
use vitrine_common::Transform;

/// Period divisor shared by the sphere's orbit and the shoes' bob.
pub const ORBIT_DIVISOR: f64 = 1.5;
/// Divisor of the sphere's slow roll about Z.
pub const ROLL_DIVISOR: f64 = 10.5;
/// Divisor of the shoes' sway about X and Y.
pub const SWAY_DIVISOR: f64 = 4.0;
/// Per-instance phase offsets are `phase * PHASE_SPAN` seconds.
pub const PHASE_SPAN: f64 = 10_000.0;

/// Sphere position and rotation at elapsed time `t`. Scale stays at 1.
pub fn sphere_transform(t: f64) -> Transform {
    let (s, c) = (t / ORBIT_DIVISOR).sin_cos();
    Transform {
        position: Vec3::new((s / 2.0) as f32, (c / 2.0) as f32, (c / 2.0 + 0.5) as f32),
        rotation: Vec3::new(
            (s / 2.0 * 5.0) as f32,
            (c / 2.0) as f32,
            ((t / ROLL_DIVISOR).tan() / 2.0) as f32,
        ),
        scale: Vec3::ONE,
    }
}

/// The time-driven part of a shoe's local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstancePose {
    pub rotation: Vec3,
    pub y: f32,
}

/// Pose of an instance with the given phase at elapsed time `t`.
pub fn instance_pose(t: f64, phase: f64) -> InstancePose {
    let t = t + phase * PHASE_SPAN;
    let (sway_s, sway_c) = (t / SWAY_DIVISOR).sin_cos();
    let (orbit_s, orbit_c) = (t / ORBIT_DIVISOR).sin_cos();
    InstancePose {
        rotation: Vec3::new((sway_c / 2.0) as f32, (sway_s / 2.0) as f32, (orbit_c / 2.0) as f32),
        y: (orbit_s / 2.0) as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn close(a: Vec3, b: Vec3) -> bool {
        a.abs_diff_eq(b, 1e-6)
    }

    #[test]
    fn sphere_at_zero() {
        let t = sphere_transform(0.0);
        assert!(close(t.position, Vec3::new(0.0, 0.5, 1.0)));
        assert!(close(t.rotation, Vec3::new(0.0, 0.5, 0.0)));
        assert_eq!(t.scale, Vec3::ONE);
    }

    #[test]
    fn sphere_at_half_turn() {
        let t = 1.5 * PI;
        let tr = sphere_transform(t);
        assert!(close(tr.position, Vec3::new(0.0, -0.5, 0.0)));
        let roll = ((t / 10.5).tan() / 2.0) as f32;
        assert!(close(tr.rotation, Vec3::new(0.0, -0.5, roll)));
    }

    #[test]
    fn sphere_is_pure() {
        for i in 0..200 {
            let t = i as f64 * 0.37;
            assert_eq!(sphere_transform(t), sphere_transform(t));
        }
    }

    #[test]
    fn pose_uses_phase_offset() {
        let a = instance_pose(2.0, 0.0);
        let b = instance_pose(2.0 + 0.25 * PHASE_SPAN, 0.0);
        let c = instance_pose(2.0, 0.25);
        assert_eq!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn pose_at_zero_phase_zero() {
        let p = instance_pose(0.0, 0.0);
        assert!(close(p.rotation, Vec3::new(0.5, 0.0, 0.5)));
        assert_eq!(p.y, 0.0);
    }

    #[test]
    fn pose_stays_bounded() {
        for i in 0..500 {
            let p = instance_pose(i as f64 * 0.1, (i % 7) as f64 / 7.0);
            assert!(p.y.abs() <= 0.5);
            assert!(p.rotation.abs().max_element() <= 0.5);
        }
    }
}
