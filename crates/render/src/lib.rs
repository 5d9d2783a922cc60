//! Renderer-agnostic side of drawing the scene.
//!
//! # Invariants
//! - Renderers never mutate the scene; they read a captured [`DrawList`].
//! - A suspended scene draws nothing but its lights and the fallback text.

mod draw;
mod mesh;
mod renderer;

pub use draw::{DrawItem, DrawList, LabelDraw};
pub use mesh::{cube_mesh, uv_sphere};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
