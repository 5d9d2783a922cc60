use glam::{Mat4, Vec2, Vec3};
use vitrine_common::Color;
use vitrine_scene::{DrawnInstance, Environment, Lighting, Stage};

/// One mesh placement. Unit meshes carry their size in `world`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub world: Mat4,
    pub color: Color,
}

/// Label text laid flat in its parent's local XY plane.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDraw {
    pub text: String,
    /// Parent matrix times the anchor offset. Text runs along +X, up is +Y.
    pub plane: Mat4,
    pub opacity: f32,
    /// Transition scale times world units per pixel, before the plane's own scale.
    pub world_units_per_pixel: f32,
}

impl LabelDraw {
    pub fn anchor(&self) -> Vec3 {
        self.plane.transform_point3(Vec3::ZERO)
    }

    /// World-space facing direction of the text.
    pub fn normal(&self) -> Vec3 {
        self.plane.transform_vector3(Vec3::Z).normalize_or_zero()
    }

    /// Map a text-layout offset from the label center (pixels, +Y down) into
    /// the world.
    pub fn pixel_to_world(&self, offset: Vec2) -> Vec3 {
        let local = Vec3::new(offset.x, -offset.y, 0.0) * self.world_units_per_pixel;
        self.plane.transform_point3(local)
    }
}

/// Everything a backend needs for one frame, captured from a stage.
///
/// While the scene is suspended only the lights, background and the
/// fallback text are present.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawList {
    pub elapsed: f64,
    pub background: Color,
    pub lighting: Lighting,
    pub environment: Option<Environment>,
    pub fallback: Option<String>,
    pub cube: Option<DrawItem>,
    pub sphere: Option<DrawItem>,
    pub shoes: Vec<DrawnInstance>,
    /// Hovered pool indices.
    pub hovered: Vec<usize>,
    pub label: Option<LabelDraw>,
}

impl DrawList {
    pub fn capture(stage: &Stage) -> Self {
        let scene = stage.scene();
        let elapsed = stage.clock().elapsed().unwrap_or(0.0);
        let mut list = Self {
            elapsed,
            background: scene.background,
            lighting: scene.lighting.clone(),
            environment: None,
            fallback: stage.fallback_text(),
            cube: None,
            sphere: None,
            shoes: Vec::new(),
            hovered: Vec::new(),
            label: None,
        };
        if list.fallback.is_some() {
            return list;
        }

        list.environment = Some(scene.environment.clone());
        list.cube = Some(DrawItem {
            world: scene.cube.matrix(),
            color: scene.cube.color,
        });
        list.sphere = Some(DrawItem {
            world: scene.sphere.matrix() * Mat4::from_scale(Vec3::splat(scene.sphere.radius)),
            color: Color::WHITE,
        });
        list.shoes = scene.shoes.batch.drawn().collect();
        list.hovered = scene.shoes.batch.hovered().collect();

        let label = &scene.cube.label;
        if label.opacity() > 0.0 {
            list.label = Some(LabelDraw {
                text: label.text.clone(),
                plane: label.plane(&scene.cube.matrix()),
                opacity: label.opacity(),
                world_units_per_pixel: label.world_units_per_pixel() * label.scale(),
            });
        }
        tracing::trace!(shoes = list.shoes.len(), hovered = list.hovered.len(), "draw list captured");
        list
    }

    pub fn is_suspended(&self) -> bool {
        self.fallback.is_some()
    }
}
