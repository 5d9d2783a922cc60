use crate::{AssetError, MaterialData, MeshData, ModelData, TextureData};
use glam::Vec3;

/// Decode a glTF/GLB file and select one node's geometry and a named material.
///
/// All primitives of the node's mesh are merged into one indexed mesh. When no
/// material carries `material_name`, the first primitive's material is used.
/// Missing normals are rebuilt from the triangles; missing UVs are zero.
pub fn decode_model(bytes: &[u8], node_name: &str, material_name: &str) -> Result<ModelData, AssetError> {
    let _span = tracing::debug_span!("decode_model", node = node_name).entered();
    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let node = document
        .nodes()
        .find(|n| n.name() == Some(node_name))
        .ok_or_else(|| AssetError::NodeNotFound(node_name.to_string()))?;
    let mesh = node
        .mesh()
        .ok_or_else(|| AssetError::MissingMesh(node_name.to_string()))?;
    let mesh_name = mesh.name().unwrap_or(node_name).to_string();

    let mut out = MeshData {
        name: mesh_name.clone(),
        ..MeshData::default()
    };
    let mut fallback_material = None;
    let mut rebuild_normals = false;

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingPositions(mesh_name.clone()))?
            .collect();
        let count = positions.len();
        let base = out.positions.len() as u32;

        match reader.read_normals() {
            Some(normals) => out.normals.extend(normals),
            None => {
                rebuild_normals = true;
                out.normals.extend(std::iter::repeat_n([0.0, 0.0, 0.0], count));
            }
        }
        match reader.read_tex_coords(0) {
            Some(uvs) => out.uvs.extend(uvs.into_f32()),
            None => out.uvs.extend(std::iter::repeat_n([0.0, 0.0], count)),
        }
        match reader.read_indices() {
            Some(indices) => out.indices.extend(indices.into_u32().map(|i| base + i)),
            None => out.indices.extend(base..base + count as u32),
        }
        out.positions.extend(positions);

        if fallback_material.is_none() {
            fallback_material = Some(material_data(&primitive.material()));
        }
    }

    if rebuild_normals {
        out.normals = vertex_normals(&out.positions, &out.indices);
    }

    let material = document
        .materials()
        .find(|m| m.name() == Some(material_name))
        .map(|m| material_data(&m))
        .or(fallback_material)
        .unwrap_or_default();

    tracing::debug!(
        vertices = out.positions.len(),
        indices = out.indices.len(),
        material = %material.name,
        "model decoded"
    );
    Ok(ModelData {
        mesh: out,
        material,
    })
}

fn material_data(material: &gltf::Material<'_>) -> MaterialData {
    MaterialData {
        name: material.name().unwrap_or("unnamed").to_string(),
        base_color: material.pbr_metallic_roughness().base_color_factor(),
    }
}

/// Area-weighted smooth normals.
fn vertex_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from_array(positions[a]);
        let pb = Vec3::from_array(positions[b]);
        let pc = Vec3::from_array(positions[c]);
        let n = (pb - pa).cross(pc - pa);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

/// Decode a PNG or JPEG into RGBA8.
pub fn decode_texture(bytes: &[u8]) -> Result<TextureData, AssetError> {
    let _span = tracing::debug_span!("decode_texture").entered();
    let image = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(TextureData {
        width,
        height,
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// One triangle under a node named "Shoe", with two materials.
    pub const SHOE_GLTF: &str = r#"{
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
  "materials": [
    { "name": "other" },
    { "name": "phong1SG", "pbrMetallicRoughness": { "baseColorFactor": [0.5, 0.25, 1.0, 1.0] } }
  ],
  "meshes": [{ "name": "ShoeMesh", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] }],
  "nodes": [{ "name": "Shoe", "mesh": 0 }, { "name": "Empty" }],
  "scenes": [{ "nodes": [0, 1] }],
  "scene": 0
}"#;

    /// A 2x2 PNG encoded in memory.
    pub fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png)
            .expect("encode png");
        out.into_inner()
    }
}
