use crate::draw::DrawList;
use glam::Vec3;
use std::fmt::Write;
use vitrine_scene::CameraRig;

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
            fov_degrees: 25.0,
        }
    }
}

impl From<&CameraRig> for RenderView {
    fn from(rig: &CameraRig) -> Self {
        Self {
            eye: rig.position,
            target: rig.target,
            fov_degrees: rig.fov_degrees,
        }
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a captured draw list and a view, then produces output.
/// It never mutates the scene.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &DrawList, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a frame, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &DrawList, view: &RenderView) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(out, "=== Frame (t={:.3}) ===", frame.elapsed);
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z,
            view.fov_degrees
        );
        let _ = writeln!(
            out,
            "Lights: ambient={} points={}",
            frame.lighting.ambient,
            frame.lighting.points.len()
        );

        if let Some(text) = &frame.fallback {
            let _ = writeln!(out, "Suspended: {text}");
            return out;
        }
        if let Some(env) = &frame.environment {
            let _ = writeln!(out, "Environment: {}", env.preset);
        }
        if let Some(cube) = &frame.cube {
            let (s, _, p) = cube.world.to_scale_rotation_translation();
            let _ = writeln!(
                out,
                "Box: pos=({:.2}, {:.2}, {:.2}) scale={:.2}",
                p.x, p.y, p.z, s.x
            );
        }
        if let Some(sphere) = &frame.sphere {
            let p = sphere.world.w_axis;
            let _ = writeln!(out, "Sphere: pos=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        }
        let _ = writeln!(out, "Shoes: {} drawn", frame.shoes.len());
        for shoe in &frame.shoes {
            let (s, _, p) = shoe.world.to_scale_rotation_translation();
            let marker = if frame.hovered.contains(&shoe.index) { " *" } else { "" };
            let _ = writeln!(
                out,
                "  [{:02}] pos=({:.2}, {:.2}, {:.2}) scale={:.3} color=({:.2}, {:.2}, {:.2}){}",
                shoe.index, p.x, p.y, p.z, s.x, shoe.color.r, shoe.color.g, shoe.color.b, marker
            );
        }
        match &frame.label {
            Some(label) => {
                let _ = writeln!(out, "Label: {:?} opacity={:.2}", label.text, label.opacity);
            }
            None => {
                let _ = writeln!(out, "Label: hidden");
            }
        }
        out
    }
}
