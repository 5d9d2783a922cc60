//! wgpu render backend for the demo scene.
//!
//! Draws the box, the textured sphere and the drawn shoe instances with one
//! lit pipeline. The camera orbits the origin with damped controls.
//!
//! # Invariants
//! - The renderer never mutates the scene; it draws a captured draw list.
//! - Camera motion is view state and never feeds back into the scene.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::WgpuRenderer;
