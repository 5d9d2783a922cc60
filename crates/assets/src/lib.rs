//! Asset loading for the scene: the shoe model and the sphere texture.
//!
//! Requests are identified by path. Each one is read and decoded on a worker
//! thread; the render loop drains finished work once per frame with
//! [`AssetLoader::poll`]. A [`SuspenseBoundary`] stays suspended until every
//! asset it depends on has loaded. Failed loads are logged and recorded in the
//! progress report, and leave their boundaries suspended.

mod decode;
mod loader;
mod suspense;

pub use decode::{decode_model, decode_texture};
pub use loader::{AssetLoader, LoadProgress, resolve_path};
pub use suspense::SuspenseBoundary;

use sha2::{Digest, Sha256};
use std::path::PathBuf;
use std::sync::Arc;
use vitrine_common::TriangleMesh;

/// Stable handle for a requested asset, derived from its request path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetId(pub u64);

impl AssetId {
    pub fn for_path(path: &str) -> Self {
        let digest = Sha256::digest(path.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        AssetId(u64::from_le_bytes(bytes))
    }
}

/// What to decode a requested file as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetKind {
    /// A glTF/GLB file; geometry comes from the named node, the material by name.
    Model { node: String, material: String },
    /// A PNG or JPEG image.
    Texture,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    pub path: String,
    pub kind: AssetKind,
}

impl AssetRequest {
    pub fn model(path: impl Into<String>, node: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: AssetKind::Model {
                node: node.into(),
                material: material.into(),
            },
        }
    }

    pub fn texture(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: AssetKind::Texture,
        }
    }

    pub fn id(&self) -> AssetId {
        AssetId::for_path(&self.path)
    }
}

/// Indexed triangle geometry.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Local-space triangles for picking, `None` for empty geometry.
    pub fn surface(&self) -> Option<TriangleMesh> {
        TriangleMesh::from_indexed(&self.positions, &self.indices)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Geometry and material selected from a model file.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub mesh: MeshData,
    pub material: MaterialData,
}

/// Decoded RGBA8 image.
#[derive(Debug, Clone)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone)]
pub enum Asset {
    Model(Arc<ModelData>),
    Texture(Arc<TextureData>),
}

/// Errors from reading or decoding an asset.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("glTF decode error: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("image decode error: {0}")]
    Image(#[from] image::ImageError),
    #[error("node {0:?} not found in model")]
    NodeNotFound(String),
    #[error("node {0:?} has no mesh")]
    MissingMesh(String),
    #[error("mesh {0:?} has no positions")]
    MissingPositions(String),
    #[error("could not start loader thread: {0}")]
    Spawn(std::io::Error),
}
