//! # Render Buffers
//!
//! Indexed `f32` buffers for GPU preview.
//!
//! Polygons are fan-triangulated in output space (residual transform
//! applied). Coincident positions are welded through a quantized key so that
//! neighbouring faces share vertices, and each vertex normal is the
//! area-weighted average of the faces around it.

use std::collections::HashMap;

use glam::DVec3;

use crate::mesh::{Mesh, WeldKey};

/// Mesh buffers suitable for WebGL/WebGPU.
///
/// # Examples
///
/// ```
/// use boxgen_mesh::builder::build_box;
/// use boxgen_mesh::export::RenderBuffers;
/// use boxgen_mesh::params::BoxParams;
///
/// let params = BoxParams::default().resolve().unwrap();
/// let buffers = RenderBuffers::from_mesh(&build_box(&params).unwrap());
/// assert_eq!(buffers.positions.len(), buffers.normals.len());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderBuffers {
    /// Flat `[x, y, z, ...]` positions.
    pub positions: Vec<f32>,
    /// Flat unit normals, one per position.
    pub normals: Vec<f32>,
    /// Three indices per triangle.
    pub indices: Vec<u32>,
}

impl RenderBuffers {
    /// Builds welded buffers with smooth normals.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let mut lookup: HashMap<WeldKey, u32> = HashMap::new();
        let mut points: Vec<DVec3> = Vec::new();
        let mut indices = Vec::with_capacity(mesh.triangle_count() * 3);

        for triangle in mesh.triangulate() {
            for vertex in triangle.vertices {
                let index = *lookup.entry(WeldKey::of(vertex)).or_insert_with(|| {
                    points.push(vertex);
                    (points.len() - 1) as u32
                });
                indices.push(index);
            }
        }

        // Unnormalized cross products weight each face by its area
        let mut accumulated = vec![DVec3::ZERO; points.len()];
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| points[i as usize]);
            let weighted = (b - a).cross(c - a);
            for &i in tri {
                accumulated[i as usize] += weighted;
            }
        }

        let positions = points
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect();
        let normals = accumulated
            .iter()
            .flat_map(|n| {
                let n = n.normalize_or_zero();
                [n.x as f32, n.y as f32, n.z as f32]
            })
            .collect();

        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Number of welded vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Polygon;
    use glam::DMat4;

    fn unit_cube() -> Mesh {
        let p = |x: f64, y: f64, z: f64| DVec3::new(x, y, z);
        Mesh::from_polygons(vec![
            Polygon::new(vec![p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.)]),
            Polygon::new(vec![p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)]),
            Polygon::new(vec![p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)]),
            Polygon::new(vec![p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.), p(1., 1., 0.)]),
            Polygon::new(vec![p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.), p(0., 1., 0.)]),
            Polygon::new(vec![p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.)]),
        ])
    }

    #[test]
    fn test_cube_welds_to_eight_vertices() {
        let buffers = RenderBuffers::from_mesh(&unit_cube());
        assert_eq!(buffers.vertex_count(), 8);
        assert_eq!(buffers.triangle_count(), 12);
        assert!(buffers.indices.iter().all(|&i| (i as usize) < buffers.vertex_count()));
    }

    #[test]
    fn test_corner_normal_points_outward() {
        let buffers = RenderBuffers::from_mesh(&unit_cube());
        for (p, n) in buffers
            .positions
            .chunks_exact(3)
            .zip(buffers.normals.chunks_exact(3))
        {
            let outward = glam::Vec3::new(p[0] - 0.5, p[1] - 0.5, p[2] - 0.5);
            let normal = glam::Vec3::new(n[0], n[1], n[2]);
            assert!((normal.length() - 1.0).abs() < 1e-5);
            assert!(normal.dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_residual_transform_applied() {
        let mesh = unit_cube().with_residual_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, -2.0)));
        let buffers = RenderBuffers::from_mesh(&mesh);
        let max_z = buffers
            .positions
            .chunks_exact(3)
            .map(|p| p[2])
            .fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max_z, -1.0);
    }

    #[test]
    fn test_empty_mesh() {
        let buffers = RenderBuffers::from_mesh(&Mesh::new());
        assert_eq!(buffers, RenderBuffers::default());
    }

    #[test]
    fn test_near_points_weld() {
        let p = |x: f64| DVec3::new(x, 0.0, 0.0);
        let mesh = Mesh::from_polygons(vec![
            Polygon::new(vec![p(0.0), DVec3::Y, DVec3::Z]),
            Polygon::new(vec![p(1e-8), DVec3::Z, DVec3::Y]),
        ]);
        assert_eq!(RenderBuffers::from_mesh(&mesh).vertex_count(), 3);
    }
}
