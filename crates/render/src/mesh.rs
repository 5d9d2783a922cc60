use std::f32::consts::PI;
use vitrine_assets::MeshData;

/// Unit cube centered on the origin, four vertices per face.
pub fn cube_mesh() -> MeshData {
    let p = 0.5_f32;
    // (normal, tangent u, tangent v) per face
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];

    let mut mesh = MeshData {
        name: "cube".into(),
        ..MeshData::default()
    };
    for (n, u, v) in faces {
        let base = mesh.positions.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            mesh.positions.push(std::array::from_fn(|i| {
                (n[i] + su * u[i] + sv * v[i]) * p
            }));
            mesh.normals.push(n);
            mesh.uvs.push([(su + 1.0) / 2.0, (1.0 - sv) / 2.0]);
        }
        mesh.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    mesh
}

/// Latitude/longitude sphere. `u` wraps around Y, `v` runs pole to pole.
pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.max(3);
    let h = height_segments.max(2);
    let mut mesh = MeshData {
        name: "sphere".into(),
        ..MeshData::default()
    };

    for iy in 0..=h {
        let v = iy as f32 / h as f32;
        let theta = v * PI;
        for ix in 0..=w {
            let u = ix as f32 / w as f32;
            let phi = u * 2.0 * PI;
            let normal = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
            mesh.positions.push(normal.map(|c| c * radius));
            mesh.normals.push(normal);
            mesh.uvs.push([u, 1.0 - v]);
        }
    }

    let row = w + 1;
    for iy in 0..h {
        for ix in 0..w {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                mesh.indices.extend([a, b, d]);
            }
            if iy != h - 1 {
                mesh.indices.extend([b, c, d]);
            }
        }
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn cube_has_six_quads() {
        let m = cube_mesh();
        assert_eq!(m.vertex_count(), 24);
        assert_eq!(m.indices.len(), 36);
        let surface = m.surface().unwrap();
        assert_eq!(surface.len(), 12);
        let b = surface.bounds();
        assert_eq!(b.min, Vec3::splat(-0.5));
        assert_eq!(b.max, Vec3::splat(0.5));
    }

    #[test]
    fn cube_faces_wind_outward() {
        let m = cube_mesh();
        for tri in m.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| Vec3::from_array(m.positions[tri[i] as usize]));
            let n = Vec3::from_array(m.normals[tri[0] as usize]);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
        }
    }

    #[test]
    fn sphere_counts_and_radius() {
        let m = uv_sphere(0.2, 30, 30);
        assert_eq!(m.vertex_count(), 31 * 31);
        // Pole rows contribute one triangle per segment, the rest two.
        assert_eq!(m.indices.len(), (30 * 2 * 28 + 30 * 2) * 3);
        for p in &m.positions {
            assert!((Vec3::from_array(*p).length() - 0.2).abs() < 1e-5);
        }
        assert!(m.indices.iter().all(|&i| (i as usize) < m.vertex_count()));
    }

    #[test]
    fn sphere_uvs_span_unit_square() {
        let m = uv_sphere(1.0, 8, 4);
        assert_eq!(m.uvs.first(), Some(&[0.0, 1.0]));
        assert_eq!(m.uvs.last(), Some(&[1.0, 0.0]));
    }
}
