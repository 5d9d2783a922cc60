//! Shared types for the vitrine workspace.
//!
//! Everything here is plain data plus pure math; nothing owns scene state.

mod ray;
mod types;

pub use ray::{Aabb, Ray, TriangleMesh};
pub use types::{Color, Transform, lerp};
