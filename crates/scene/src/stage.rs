use crate::composer::{Scene, SceneContext, compose};
use std::sync::Arc;
use vitrine_assets::{AssetLoader, LoadProgress, ModelData, TextureData};
use vitrine_common::Ray;
use vitrine_input::{PointerEvent, PointerRouter};
use vitrine_kernel::{Frame, FrameClock, Scheduler};

/// Drives one scene: asset polling, suspense resolution, the frame clock,
/// the update scheduler and pointer routing.
///
/// Everything here runs on the render-loop thread.
pub struct Stage {
    clock: FrameClock,
    scheduler: Scheduler<Scene>,
    loader: AssetLoader,
    router: PointerRouter,
    scene: Scene,
    seed: u64,
}

impl Stage {
    /// Compose the scene and start loading its assets. The clock stays
    /// suspended until [`Stage::start`].
    pub fn new(mut ctx: SceneContext) -> Self {
        let mut loader = AssetLoader::new(ctx.config.asset_root.clone());
        let scene = compose(&mut ctx, &mut loader);
        Self {
            clock: FrameClock::new(),
            scheduler: Scheduler::new(),
            loader,
            router: PointerRouter::new(),
            scene,
            seed: ctx.seed(),
        }
    }

    /// Start the frame clock; called when the render loop begins.
    pub fn start(&mut self) {
        self.clock.start();
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn loader(&self) -> &AssetLoader {
        &self.loader
    }

    pub fn loader_mut(&mut self) -> &mut AssetLoader {
        &mut self.loader
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &Scheduler<Scene> {
        &self.scheduler
    }

    pub fn progress(&self) -> &LoadProgress {
        self.loader.progress()
    }

    pub fn is_resolved(&self) -> bool {
        self.scene.boundary.is_resolved()
    }

    /// Loader text while suspended, `None` after resolution.
    pub fn fallback_text(&self) -> Option<String> {
        self.scene.boundary.fallback_text(&self.loader)
    }

    pub fn model(&self) -> Option<Arc<ModelData>> {
        self.loader.model(self.scene.shoes.model)
    }

    pub fn texture(&self) -> Option<Arc<TextureData>> {
        self.loader.texture(self.scene.sphere.texture)
    }

    /// Collect finished loads and mount the scene when its boundary resolves.
    /// Returns true on the call that mounts.
    pub fn poll_assets(&mut self) -> bool {
        self.loader.poll();
        if !self.scene.boundary.poll(&self.loader) {
            return false;
        }
        self.scene.shoes.surface = self.model().and_then(|m| m.mesh.surface()).map(Arc::new);
        match &self.scene.shoes.surface {
            Some(surface) => tracing::debug!(triangles = surface.len(), "shoe pick surface built"),
            None => tracing::warn!("shoe model has no geometry; instances will not be pickable"),
        }
        self.scene.mount(&mut self.scheduler);
        true
    }

    /// One display refresh: poll assets, advance the clock by `dt` and run
    /// every registered updater. Returns `None` while the clock is suspended.
    pub fn tick(&mut self, dt: f32) -> Option<Frame> {
        self.poll_assets();
        let frame = self.clock.advance(dt)?;
        self.scheduler.run(&frame, &mut self.scene);
        Some(frame)
    }

    /// Route a pointer ray (`None` when the pointer left the surface) and
    /// apply the resulting hover changes.
    pub fn pointer(&mut self, ray: Option<&Ray>) -> Vec<PointerEvent> {
        let targets = self.scene.pickables();
        let events = self.router.route(ray, &targets);
        self.scene.shoes.batch.apply_pointer_events(&events);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use glam::Vec3;
    use std::path::Path;
    use std::time::{Duration, Instant};

    const BOX_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{
    "byteLength": 44,
    "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAABAAIAAAA="
  }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36, "target": 34962 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6, "target": 34963 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0, 0, 0], "max": [1, 1, 0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ],
  "materials": [{ "name": "phong1SG" }],
  "meshes": [{ "name": "ShoeMesh", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
  "nodes": [{ "name": "Shoe", "mesh": 0 }],
  "scenes": [{ "nodes": [0] }],
  "scene": 0
}"#;

    fn write_assets(dir: &Path) {
        std::fs::write(dir.join("shoe.gltf"), BOX_GLTF).unwrap();
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 255]));
        img.save(dir.join("ball.png")).unwrap();
    }

    fn stage(root: &Path) -> Stage {
        Stage::new(SceneContext::new(SceneConfig {
            seed: Some(42),
            asset_root: root.to_path_buf(),
            model_path: "/shoe.gltf".into(),
            texture_path: "ball.png".into(),
            ..SceneConfig::default()
        }))
    }

    fn tick_until_resolved(stage: &mut Stage) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while !stage.is_resolved() && Instant::now() < deadline {
            stage.tick(1.0 / 60.0);
            std::thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn suspended_clock_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut stage = stage(dir.path());
        assert!(stage.tick(0.016).is_none());
        assert_eq!(stage.scheduler().runs(), 0);
    }

    #[test]
    fn resolves_and_mounts_when_assets_load() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut stage = stage(dir.path());
        stage.start();
        assert!(stage.fallback_text().is_some());

        tick_until_resolved(&mut stage);
        assert!(stage.is_resolved());
        assert!(stage.scene().is_mounted());
        assert_eq!(stage.scheduler().len(), 52);
        assert!(stage.fallback_text().is_none());
        assert_eq!(stage.progress().percent(), 100.0);
        assert!(stage.model().is_some());
        assert!(stage.texture().is_some());

        // The clock ran during suspense, so elapsed time predates mount.
        let frame = stage.tick(0.5).unwrap();
        assert!(frame.elapsed >= 0.5);
        assert_eq!(stage.scene().shoes.batch.len(), 50);
    }

    #[test]
    fn failed_asset_stays_suspended() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shoe.gltf"), BOX_GLTF).unwrap();
        let mut stage = stage(dir.path());
        stage.start();
        assert!(stage.loader_mut().wait(Duration::from_secs(10)));
        for _ in 0..5 {
            stage.tick(0.1);
        }
        assert!(!stage.is_resolved());
        assert_eq!(stage.fallback_text().as_deref(), Some("50 % loaded"));
        assert!(stage.scheduler().is_empty());
        assert_eq!(stage.progress().errors.len(), 1);
    }

    #[test]
    fn pointer_hovers_nearest_drawn_shoe() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut stage = stage(dir.path());
        stage.start();
        tick_until_resolved(&mut stage);
        stage.tick(0.016);
        // The fixture triangle is flat; give it some depth to aim at.
        stage.scene_mut().shoes.surface = Some(crate::batch::cube_surface());

        let world = stage.scene().shoes.batch.world_matrix(0).unwrap();
        let center = world.transform_point3(Vec3::ZERO);
        let eye = center + Vec3::new(0.0, 0.0, 30.0);
        let events = stage.pointer(Some(&Ray::new(eye, center - eye)));
        assert_eq!(events.len(), 1);
        let PointerEvent::Enter(hovered) = events[0] else {
            panic!("expected enter, got {events:?}");
        };
        assert!(hovered < 5);
        assert_eq!(stage.scene().shoes.batch.hovered().collect::<Vec<_>>(), vec![hovered]);

        let events = stage.pointer(None);
        assert_eq!(events, vec![PointerEvent::Leave(hovered)]);
        assert_eq!(stage.scene().shoes.batch.hovered().count(), 0);
    }

    #[test]
    fn no_hover_before_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let mut stage = stage(dir.path());
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(stage.pointer(Some(&ray)).is_empty());
    }
}
