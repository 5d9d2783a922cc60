//! The demo scene: a labeled box, an orbiting textured sphere and a field of
//! instanced shoes that grow and turn red under the pointer.
//!
//! Composition is explicit: a [`SceneContext`] carries the configuration and
//! the seeded generator, [`compose`] builds the graph and requests assets, and
//! the [`Stage`] mounts the per-frame updaters once the assets resolve.
//!
//! # Invariants
//! - Motion is a pure function of elapsed time plus per-instance constants.
//! - Smoothing factors apply per frame, not per second.
//! - The instance pool never changes size.

mod batch;
mod composer;
mod config;
mod hover;
mod motion;
mod overlay;
mod stage;

pub use batch::{DrawnInstance, InstanceBatch, InstanceRecord, InstanceState};
pub use composer::{
    CameraRig, Environment, LabeledBox, Lighting, PointLight, Scene, SceneContext, ShoeField,
    TexturedSphere, compose,
};
pub use config::{CameraConfig, ConfigError, SceneConfig};
pub use hover::{HOVER_SCALE, HoverTracker, REST_SCALE};
pub use motion::{InstancePose, instance_pose, sphere_transform};
pub use overlay::{LabelOverlay, Occluder, is_occluded};
pub use stage::Stage;
