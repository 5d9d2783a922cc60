use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vitrine_common::Ray;
use vitrine_render::{DebugTextRenderer, DrawList, RenderView, Renderer};
use vitrine_scene::{SceneConfig, SceneContext, Stage, instance_pose, sphere_transform};

#[derive(Parser)]
#[command(name = "vitrine-cli", about = "Headless tool for the vitrine demo scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Scene config JSON file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective scene config
    Info,
    /// Print the sphere transform (and optionally one shoe pose) at a time
    Sample {
        /// Elapsed seconds
        #[arg(short, long, default_value = "0")]
        time: f64,
        /// Phase of a shoe instance in [0, 1)
        #[arg(long)]
        phase: Option<f64>,
    },
    /// Run the scene without a window and print the final frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666667")]
        dt: f32,
        /// Layout seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// Aim the pointer at this drawn shoe after loading
        #[arg(long)]
        hover: Option<usize>,
        /// Asset directory
        #[arg(long)]
        assets: Option<PathBuf>,
        /// Seconds to wait for assets before running
        #[arg(long, default_value = "10")]
        load_timeout: u64,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<SceneConfig> {
    match path {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("loading scene config {}", path.display())),
        None => Ok(SceneConfig::default()),
    }
}

fn fmt_vec(v: Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Info => {
            println!("vitrine-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("{}", config.to_json()?);
        }
        Commands::Sample { time, phase } => {
            let t = sphere_transform(time);
            println!("t={time}");
            println!("sphere position={}", fmt_vec(t.position));
            println!("sphere rotation={}", fmt_vec(t.rotation));
            if let Some(phase) = phase {
                let pose = instance_pose(time, phase);
                println!("shoe phase={phase} y={:.4} rotation={}", pose.y, fmt_vec(pose.rotation));
            }
        }
        Commands::Simulate {
            frames,
            dt,
            seed,
            hover,
            assets,
            load_timeout,
        } => {
            if seed.is_some() {
                config.seed = seed;
            }
            if let Some(dir) = assets {
                config.asset_root = dir;
            }
            config.validate()?;

            let mut stage = Stage::new(SceneContext::new(config));
            stage.start();
            if !stage.loader_mut().wait(Duration::from_secs(load_timeout)) {
                tracing::warn!(timeout = load_timeout, "assets still loading");
            }
            stage.poll_assets();

            if let Some(index) = hover {
                aim_pointer(&mut stage, index);
            }
            for _ in 0..frames {
                stage.tick(dt);
            }

            println!("seed={}", stage.seed());
            for (path, reason) in &stage.progress().errors {
                println!("failed: {path}: {reason}");
            }
            let view = RenderView::from(&stage.scene().camera);
            let frame = DrawList::capture(&stage);
            print!("{}", DebugTextRenderer::new().render(&frame, &view));
        }
    }

    Ok(())
}

/// Cast a pointer ray from the camera through the center of a drawn shoe.
fn aim_pointer(stage: &mut Stage, index: usize) {
    // Poses are only defined after one frame.
    stage.tick(0.0);
    let scene = stage.scene();
    let (Some(world), Some(surface)) = (scene.shoes.batch.world_matrix(index), &scene.shoes.surface)
    else {
        tracing::warn!(index, "cannot hover: scene not loaded or index out of range");
        return;
    };
    let eye = scene.camera.position;
    let target = world.transform_point3(surface.bounds().center());
    let events = stage.pointer(Some(&Ray::new(eye, target - eye)));
    tracing::info!(?events, "pointer aimed at shoe {index}");
}
