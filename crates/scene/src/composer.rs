//! Assembles the fixed scene graph and registers its per-frame updaters.
//!
//! # Invariants
//! - The set of top-level objects is fixed once composed.
//! - Updaters are registered exactly once, when the scene is mounted.
//! - Asset-dependent objects are neither drawn nor pickable before mount.

use crate::batch::InstanceBatch;
use crate::config::SceneConfig;
use crate::motion::sphere_transform;
use crate::overlay::{LabelOverlay, Occluder, is_occluded};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use vitrine_assets::{AssetId, AssetLoader, AssetRequest, SuspenseBoundary};
use vitrine_common::{Aabb, Color, Transform, TriangleMesh};
use vitrine_input::Pickable;
use vitrine_kernel::{SceneRng, Scheduler};

/// Per-scene inputs to composition: the configuration and the seeded
/// generator that replaces module-level random state.
#[derive(Debug, Clone)]
pub struct SceneContext {
    pub config: SceneConfig,
    pub rng: SceneRng,
}

impl SceneContext {
    pub fn new(config: SceneConfig) -> Self {
        let rng = SceneRng::with_seed(config.resolve_seed());
        Self { config, rng }
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Color,
    pub intensity: f32,
}

/// Image-based backdrop approximated by a sky/ground hemisphere.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub preset: String,
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

impl Environment {
    /// The "city" look; any other name falls back to a neutral grey.
    pub fn preset(name: &str) -> Self {
        let (sky, ground, intensity) = match name {
            "city" => (Color::rgb(0.78, 0.82, 0.90), Color::rgb(0.32, 0.29, 0.27), 0.6),
            _ => (Color::rgb(0.6, 0.6, 0.6), Color::rgb(0.3, 0.3, 0.3), 0.5),
        };
        Self {
            preset: name.to_string(),
            sky,
            ground,
            intensity,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub points: Vec<PointLight>,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.5,
            points: vec![
                PointLight {
                    position: Vec3::new(10.0, 10.0, 5.0),
                    color: Color::WHITE,
                    intensity: 1.0,
                },
                PointLight {
                    position: Vec3::new(-10.0, -10.0, -10.0),
                    color: Color::WHITE,
                    intensity: 1.0,
                },
            ],
        }
    }
}

/// Initial camera placement and orbit behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub fov_degrees: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub damping: f32,
}

/// Cube carrying the text label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledBox {
    pub transform: Transform,
    pub color: Color,
    pub label: LabelOverlay,
}

impl LabeledBox {
    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TexturedSphere {
    pub transform: Transform,
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub texture: AssetId,
}

impl TexturedSphere {
    pub fn matrix(&self) -> Mat4 {
        self.transform.matrix()
    }
}

#[derive(Debug, Clone)]
pub struct ShoeField {
    pub batch: InstanceBatch,
    pub model: AssetId,
    /// Triangles of the shared geometry, known once the model loads.
    pub surface: Option<Arc<TriangleMesh>>,
}

/// The whole demo scene.
#[derive(Debug, Clone)]
pub struct Scene {
    pub background: Color,
    pub lighting: Lighting,
    pub environment: Environment,
    pub camera: CameraRig,
    pub boundary: SuspenseBoundary,
    pub cube: LabeledBox,
    pub sphere: TexturedSphere,
    pub shoes: ShoeField,
    /// Camera position used for label occlusion, set by the view each frame.
    pub eye: Vec3,
    mounted: bool,
}

/// Build the scene and request the assets it depends on.
pub fn compose(ctx: &mut SceneContext, loader: &mut AssetLoader) -> Scene {
    let config = &ctx.config;
    let model = loader.request(AssetRequest::model(
        config.model_path.clone(),
        config.model_node.clone(),
        config.model_material.clone(),
    ));
    let texture = loader.request(AssetRequest::texture(config.texture_path.clone()));

    let batch = InstanceBatch::generate(config.pool_size, config.range, config.spread, &mut ctx.rng);

    let mut cube_transform = Transform::default();
    cube_transform.set_uniform_scale(0.3 * 2.0);

    let scene = Scene {
        background: config.background_color(),
        lighting: Lighting::default(),
        environment: Environment::preset("city"),
        camera: CameraRig {
            fov_degrees: config.camera.fov_degrees,
            position: config.camera.position,
            target: config.camera.target,
            damping: config.camera.damping,
        },
        boundary: SuspenseBoundary::new("scene", [model, texture]),
        cube: LabeledBox {
            transform: cube_transform,
            color: Color::WHITE,
            label: LabelOverlay::new(config.label_text.clone(), Vec3::new(0.0, 0.0, 0.51), 1.5),
        },
        sphere: TexturedSphere {
            transform: Transform::from_position(Vec3::new(0.0, 0.0, 1.0)),
            radius: 0.2,
            width_segments: 30,
            height_segments: 30,
            texture,
        },
        shoes: ShoeField {
            batch,
            model,
            surface: None,
        },
        eye: config.camera.position,
        mounted: false,
    };
    tracing::info!(
        seed = ctx.rng.seed(),
        pool = scene.shoes.batch.len(),
        range = scene.shoes.batch.range(),
        "scene composed"
    );
    scene
}

impl Scene {
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Register every updater: the sphere, one per pool member, then the label.
    ///
    /// Mounting twice is a no-op.
    pub fn mount(&mut self, scheduler: &mut Scheduler<Scene>) {
        if self.mounted {
            return;
        }
        scheduler.register("sphere", |frame, scene: &mut Scene| {
            scene.sphere.transform = sphere_transform(frame.elapsed);
        });
        for index in 0..self.shoes.batch.len() {
            scheduler.register(format!("shoe[{index}]"), move |frame, scene: &mut Scene| {
                scene.shoes.batch.update(index, frame.elapsed);
            });
        }
        scheduler.register("label", |frame, scene: &mut Scene| {
            let anchor = scene.cube.label.anchor_world(&scene.cube.matrix());
            let hidden = is_occluded(scene.eye, anchor, &scene.occluders());
            scene.cube.label.set_occluded(hidden);
            scene.cube.label.step(frame.delta);
        });
        self.mounted = true;
        tracing::info!(updaters = scheduler.len(), "scene mounted");
    }

    /// Hover targets: the drawn shoes, once mounted and the model surface is known.
    pub fn pickables(&self) -> Vec<Pickable> {
        match (self.mounted, &self.shoes.surface) {
            (true, Some(surface)) => self.shoes.batch.pickables(surface),
            _ => Vec::new(),
        }
    }

    /// Everything that can hide the label: box, sphere, drawn shoes.
    pub fn occluders(&self) -> Vec<Occluder> {
        let mut out = vec![
            Occluder::Box {
                world: self.cube.matrix(),
                bounds: Aabb::unit_cube(),
            },
            Occluder::Sphere {
                center: self.sphere.transform.position,
                radius: self.sphere.radius * self.sphere.transform.scale.max_element(),
            },
        ];
        if let Some(surface) = &self.shoes.surface {
            out.extend(self.shoes.batch.drawn().map(|d| Occluder::Mesh {
                world: d.world,
                surface: Arc::clone(surface),
            }));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_kernel::FrameClock;

    fn scene_with_seed(seed: u64) -> Scene {
        let mut ctx = SceneContext::new(SceneConfig {
            seed: Some(seed),
            ..SceneConfig::default()
        });
        let mut loader = AssetLoader::new("does-not-exist");
        compose(&mut ctx, &mut loader)
    }

    #[test]
    fn composes_the_demo_graph() {
        let scene = scene_with_seed(1);
        assert_eq!(scene.lighting.ambient, 0.5);
        assert_eq!(scene.lighting.points.len(), 2);
        assert_eq!(scene.lighting.points[1].position, Vec3::new(-10.0, -10.0, -10.0));
        assert_eq!(scene.environment.preset, "city");
        assert_eq!(scene.camera.fov_degrees, 25.0);
        assert_eq!(scene.cube.transform.scale, Vec3::splat(0.6));
        assert_eq!(scene.cube.label.text, "NANI??!!");
        assert_eq!(scene.sphere.transform.position, Vec3::new(0.0, 0.0, 1.0));
        assert_eq!(scene.sphere.radius, 0.2);
        assert_eq!(scene.shoes.batch.len(), 50);
        assert_eq!(scene.shoes.batch.range(), 5);
        assert_eq!(scene.boundary.required().len(), 2);
        assert!(!scene.is_mounted());
    }

    #[test]
    fn same_seed_same_layout() {
        assert_eq!(
            scene_with_seed(4).shoes.batch.records(),
            scene_with_seed(4).shoes.batch.records()
        );
    }

    #[test]
    fn mount_registers_updaters_once() {
        let mut scene = scene_with_seed(2);
        let mut scheduler = Scheduler::new();
        scene.mount(&mut scheduler);
        scene.mount(&mut scheduler);
        assert_eq!(scheduler.len(), 1 + 50 + 1);
        let labels: Vec<&str> = scheduler.labels().collect();
        assert_eq!(labels[0], "sphere");
        assert_eq!(labels[1], "shoe[0]");
        assert_eq!(labels[51], "label");
    }

    #[test]
    fn updaters_drive_the_scene() {
        let mut scene = scene_with_seed(3);
        let mut scheduler = Scheduler::new();
        scene.mount(&mut scheduler);
        let mut clock = FrameClock::started();
        for _ in 0..10 {
            let frame = clock.advance(0.1).unwrap();
            scheduler.run(&frame, &mut scene);
        }
        let expected = sphere_transform(clock.elapsed().unwrap());
        assert_eq!(scene.sphere.transform, expected);
        for state in scene.shoes.batch.states() {
            assert!(state.local.scale.z < 1.0);
        }
        assert_eq!(scene.shoes.batch.len(), 50);
    }

    #[test]
    fn nothing_is_pickable_before_mount() {
        let mut scene = scene_with_seed(5);
        scene.shoes.surface = Some(crate::batch::cube_surface());
        assert!(scene.pickables().is_empty());
        scene.mount(&mut Scheduler::new());
        assert_eq!(scene.pickables().len(), 5);
    }

    #[test]
    fn label_hides_when_viewed_from_behind() {
        let mut scene = scene_with_seed(6);
        let mut scheduler = Scheduler::new();
        scene.mount(&mut scheduler);
        scene.eye = Vec3::new(0.0, 0.0, -5.0);
        let mut clock = FrameClock::started();
        for _ in 0..20 {
            let frame = clock.advance(0.05).unwrap();
            scheduler.run(&frame, &mut scene);
        }
        assert!(scene.cube.label.is_occluded());
        assert_eq!(scene.cube.label.opacity(), 0.0);
    }

    #[test]
    fn unknown_environment_preset_falls_back() {
        let env = Environment::preset("nowhere");
        assert_eq!(env.preset, "nowhere");
        assert!(env.intensity > 0.0);
    }
}
