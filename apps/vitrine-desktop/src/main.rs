use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};
use vitrine_render::{DrawList, LabelDraw};
use vitrine_render_wgpu::{OrbitCamera, WgpuRenderer};
use vitrine_scene::{SceneConfig, SceneContext, Stage};

/// CSS pixel size of the label's heading text.
const LABEL_FONT_PX: f32 = 18.72;
const FALLBACK_FONT_PX: f32 = 16.0;

#[derive(Parser)]
#[command(name = "vitrine-desktop", about = "Vitrine demo scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset directory (overrides the config)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Layout seed (overrides the config)
    #[arg(long)]
    seed: Option<u64>,
}

impl Cli {
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading scene config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(dir) = &self.assets {
            config.asset_root = dir.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Scene, camera and pointer state.
struct AppState {
    stage: Stage,
    camera: OrbitCamera,
    /// Cursor in physical pixels, `None` outside the window.
    cursor: Option<Vec2>,
    viewport: Vec2,
    drag: Option<MouseButton>,
    last_frame: Instant,
    assets_uploaded: bool,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        let stage = Stage::new(SceneContext::new(config));
        let rig = stage.scene().camera;
        Self {
            camera: OrbitCamera::new(rig.position, rig.target, rig.fov_degrees, rig.damping),
            stage,
            cursor: None,
            viewport: Vec2::new(1280.0, 720.0),
            drag: None,
            last_frame: Instant::now(),
            assets_uploaded: false,
        }
    }

    /// Advance to `now`. The full wall-clock gap is fed to the scene so
    /// elapsed time tracks seconds since the loop started, stalls included.
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.camera.update();
        self.stage.scene_mut().eye = self.camera.eye();
        self.stage.tick(dt);
    }

    fn route_pointer(&mut self) {
        let ray = self
            .cursor
            .map(|c| self.camera.ray_from_cursor(c, self.viewport));
        self.stage.pointer(ray.as_ref());
    }

    fn cursor_moved(&mut self, position: Vec2) {
        if let Some(previous) = self.cursor {
            let delta = position - previous;
            match self.drag {
                Some(MouseButton::Left) => self.camera.rotate(delta.x, delta.y, self.viewport.y),
                Some(MouseButton::Right) => self.camera.pan(delta.x, delta.y, self.viewport.y),
                _ => {}
            }
        }
        self.cursor = Some(position);
        self.route_pointer();
    }

    fn cursor_left(&mut self) {
        self.cursor = None;
        self.drag = None;
        self.route_pointer();
    }

    /// Loader text and the box label, painted over the 3D view.
    fn draw_overlay(&self, ctx: &EguiContext, frame: &DrawList) {
        let painter = ctx.layer_painter(egui::LayerId::new(
            egui::Order::Foreground,
            egui::Id::new("scene_overlay"),
        ));

        if let Some(text) = &frame.fallback {
            painter.text(
                ctx.screen_rect().center(),
                egui::Align2::CENTER_CENTER,
                text,
                egui::FontId::proportional(FALLBACK_FONT_PX),
                egui::Color32::BLACK,
            );
        }

        if let Some(label) = &frame.label {
            self.draw_label(ctx, &painter, label);
        }
    }

    /// Lay the text out flat around its center, tessellate it, then carry
    /// every vertex through the label plane and the camera so the text lies
    /// on the box face.
    fn draw_label(&self, ctx: &EguiContext, painter: &egui::Painter, label: &LabelDraw) {
        let alpha = (label.opacity.clamp(0.0, 1.0) * 255.0) as u8;
        let galley = painter.layout_no_wrap(
            label.text.clone(),
            egui::FontId::proportional(LABEL_FONT_PX),
            egui::Color32::from_black_alpha(alpha),
        );
        let origin = egui::Pos2::ZERO - galley.size() / 2.0;
        let flat = egui::epaint::ClippedShape {
            clip_rect: egui::Rect::EVERYTHING,
            shape: egui::Shape::galley(origin, galley, egui::Color32::PLACEHOLDER),
        };

        let ppp = ctx.pixels_per_point();
        for primitive in ctx.tessellate(vec![flat], ppp) {
            let egui::epaint::Primitive::Mesh(mut mesh) = primitive.primitive else {
                continue;
            };
            for vertex in &mut mesh.vertices {
                let world = label.pixel_to_world(Vec2::new(vertex.pos.x, vertex.pos.y));
                // Any corner behind the camera drops the whole label.
                let Some(pixel) = self.camera.project(world, self.viewport) else {
                    return;
                };
                vertex.pos = egui::pos2(pixel.x / ppp, pixel.y / ppp);
            }
            painter.add(egui::Shape::mesh(mesh));
        }
    }
}

/// Window and GPU resources, created on resume.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Vitrine")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;
        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("vitrine_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, &queue, format, config.width, config.height);
        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            ?format,
            "GPU initialized"
        );
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct App {
    state: AppState,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
}

impl App {
    fn new(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            egui_ctx: EguiContext::default(),
            gpu: None,
        }
    }

    fn redraw(&mut self) {
        self.state.advance(Instant::now());

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        if !self.state.assets_uploaded && self.state.stage.is_resolved() {
            let sphere = &self.state.stage.scene().sphere;
            gpu.renderer
                .set_sphere_segments(&gpu.device, sphere.width_segments, sphere.height_segments);
            if let Some(model) = self.state.stage.model() {
                gpu.renderer.set_model(&gpu.device, &model);
            }
            if let Some(texture) = self.state.stage.texture() {
                gpu.renderer
                    .set_sphere_texture(&gpu.device, &gpu.queue, &texture);
            }
            self.state.assets_uploaded = true;
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let frame = DrawList::capture(&self.state.stage);
        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.camera, &frame);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            state.draw_overlay(ctx, &frame);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };
        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                let size = gpu.window.inner_size();
                self.state.viewport = Vec2::new(size.width as f32, size.height as f32);
                self.state.camera.set_viewport(size.width, size.height);
                self.gpu = Some(gpu);
                self.state.stage.start();
                self.state.last_frame = Instant::now();
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                self.state.viewport =
                    Vec2::new(new_size.width.max(1) as f32, new_size.height.max(1) as f32);
                self.state
                    .camera
                    .set_viewport(new_size.width, new_size.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.cursor_left();
            }
            WindowEvent::MouseInput {
                button: button @ (MouseButton::Left | MouseButton::Right),
                state,
                ..
            } => {
                self.state.drag = (state == ElementState::Pressed).then_some(button);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(steps);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.scene_config()?;
    tracing::info!(assets = %config.asset_root.display(), "vitrine-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;
    Ok(())
}
