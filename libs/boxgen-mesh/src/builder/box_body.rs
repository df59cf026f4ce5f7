//! # Box Body Builder
//!
//! Builds the hollow box with optional dividers and chamfered vertical edges
//! directly from the breakpoint grid, without boolean operations.
//!
//! ## Algorithm
//!
//! 1. Breakpoints per axis: outer edges, inner wall, chamfer inset and the
//!    two faces of every divider.
//! 2. Each cell is a rim cell (outside the inner rectangle), a divider cell
//!    (inside a divider band) or a cavity cell.
//! 3. Rim and divider cells rise to the full height, cavity cells stop at the
//!    floor (Z = wall thickness).
//! 4. The heightfield emitter produces the outer shell (one bottom, one wall
//!    per side, diagonal strips at chamfers), the rim and divider tops, the
//!    cavity floors and every inner wall face.
//!
//! The box frame has its outer bottom centre at the origin and Z up.

use glam::DVec2;
use tracing::info;

use super::GridFeatures;
use crate::error::MeshResult;
use crate::heightfield::{Exterior, Heightfield};
use crate::mesh::Mesh;
use crate::params::ResolvedParams;

/// Classification of a box grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxCell {
    /// Outer wall, between the outer and inner footprint.
    Rim,
    /// Inside a divider band.
    Divider,
    /// Open compartment with only the floor below it.
    Cavity,
}

impl GridFeatures {
    /// Features of the box body.
    pub fn for_box(params: &ResolvedParams) -> Self {
        Self {
            chamfer: params.chamfer,
            dividers_x: params.dividers_x.clone(),
            dividers_y: params.dividers_y.clone(),
            band_half_width: params.wall / 2.0,
            hinge_clearance: false,
        }
    }
}

/// Classifies a cell by its centre.
pub fn classify(params: &ResolvedParams, features: &GridFeatures, center: DVec2) -> BoxCell {
    let inner_x = params.half_width() - params.wall;
    let inner_y = params.half_depth() - params.wall;
    if center.x.abs() > inner_x || center.y.abs() > inner_y {
        BoxCell::Rim
    } else if features.in_band(center.x, center.y) {
        BoxCell::Divider
    } else {
        BoxCell::Cavity
    }
}

/// Builds the closed box body mesh.
///
/// # Example
///
/// ```rust
/// use boxgen_mesh::builder::build_box;
/// use boxgen_mesh::params::BoxParams;
///
/// let params = BoxParams::default().resolve().unwrap();
/// let mesh = build_box(&params).unwrap();
/// assert_eq!(mesh.polygon_count(), 18);
/// assert!(mesh.edge_report().is_closed());
/// ```
pub fn build_box(params: &ResolvedParams) -> MeshResult<Mesh> {
    let features = GridFeatures::for_box(params);
    let inner = (
        params.half_width() - params.wall,
        params.half_depth() - params.wall,
    );
    let grid = features.grid(
        params.half_width(),
        params.half_depth(),
        &[(params.wall, params.wall)],
        inner,
    )?;

    let field = Heightfield::new(&grid, 0.0, |cell| {
        match classify(params, &features, cell.center) {
            BoxCell::Cavity => params.wall,
            BoxCell::Rim | BoxCell::Divider => params.height,
        }
    });
    let mesh = field.build(Exterior::Shell)?;

    info!(
        columns = grid.columns(),
        rows = grid.rows(),
        polygons = mesh.polygon_count(),
        "box body built"
    );
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::BoxParams;
    use approx::assert_relative_eq;
    use glam::DVec3;

    fn resolve(params: BoxParams) -> ResolvedParams {
        params.resolve().unwrap()
    }

    fn bottom_area(mesh: &Mesh) -> f64 {
        mesh.polygons()
            .iter()
            .filter(|p| p.normal().z < -0.99 && p.vertices()[0].z == 0.0)
            .map(|p| p.area())
            .sum()
    }

    #[test]
    fn test_plain_box_face_count() {
        let mesh = build_box(&resolve(BoxParams::default())).unwrap();
        // 1 bottom + 4 outer walls + 8 rim tops + 1 floor + 4 inner walls
        assert_eq!(mesh.polygon_count(), 18);
        assert!(mesh.edge_report().is_closed());
    }

    #[test]
    fn test_plain_box_bounds() {
        let mesh = build_box(&resolve(BoxParams::default())).unwrap();
        let bounds = mesh.bounding_box().unwrap();
        assert_eq!(bounds.min, DVec3::new(-40.0, -30.0, 0.0));
        assert_eq!(bounds.max, DVec3::new(40.0, 30.0, 40.0));
    }

    #[test]
    fn test_floor_sits_at_wall_thickness() {
        let mesh = build_box(&resolve(BoxParams::default())).unwrap();
        let floors: Vec<_> = mesh
            .polygons()
            .iter()
            .filter(|p| p.normal().z > 0.99 && p.vertices()[0].z == 2.0)
            .collect();
        assert_eq!(floors.len(), 1);
        assert_relative_eq!(floors[0].area(), 76.0 * 56.0);
    }

    #[test]
    fn test_divider_band_at_center() {
        let params = resolve(BoxParams {
            divisions_x: vec![50.0],
            ..BoxParams::default()
        });
        let features = GridFeatures::for_box(&params);
        let grid = features.grid(40.0, 30.0, &[(2.0, 2.0)], (38.0, 28.0)).unwrap();
        assert!(grid.xs().contains(&-1.0));
        assert!(grid.xs().contains(&1.0));
        assert_eq!(
            classify(&params, &features, DVec2::new(0.0, 0.0)),
            BoxCell::Divider
        );
        assert_eq!(
            classify(&params, &features, DVec2::new(1.5, 0.0)),
            BoxCell::Cavity
        );

        let mesh = build_box(&params).unwrap();
        assert!(mesh.edge_report().is_closed());
    }

    #[test]
    fn test_crossing_dividers_closed() {
        let params = resolve(BoxParams {
            divisions_x: vec![33.0, 66.0],
            divisions_z: vec![50.0],
            ..BoxParams::default()
        });
        let mesh = build_box(&params).unwrap();
        assert!(mesh.edge_report().is_closed());
        let floors = mesh
            .polygons()
            .iter()
            .filter(|p| p.normal().z > 0.99 && p.vertices()[0].z == 2.0)
            .count();
        assert_eq!(floors, 6);
    }

    #[test]
    fn test_chamfer_footprint_area() {
        let params = resolve(BoxParams {
            chamfer_size: 1.5,
            ..BoxParams::default()
        });
        let mesh = build_box(&params).unwrap();
        assert!(mesh.edge_report().is_closed());
        assert_relative_eq!(bottom_area(&mesh), 80.0 * 60.0 - 4.0 * 1.5 * 1.5 / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_chamfer_equal_to_wall_closed() {
        let params = resolve(BoxParams {
            chamfer_size: 2.0,
            divisions_z: vec![1.0],
            ..BoxParams::default()
        });
        let mesh = build_box(&params).unwrap();
        assert!(mesh.edge_report().is_closed());
        assert_relative_eq!(bottom_area(&mesh), 4800.0 - 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_duplicate_divisions_add_no_degenerate_faces() {
        let single = build_box(&resolve(BoxParams {
            divisions_x: vec![50.0],
            ..BoxParams::default()
        }))
        .unwrap();
        let doubled = build_box(&resolve(BoxParams {
            divisions_x: vec![50.0, 50.0],
            ..BoxParams::default()
        }))
        .unwrap();
        assert_eq!(single, doubled);
        assert!(doubled.polygons().iter().all(|p| p.area() > 0.0));
    }

    #[test]
    fn test_division_order_irrelevant() {
        let a = build_box(&resolve(BoxParams {
            divisions_x: vec![25.0, 75.0],
            ..BoxParams::default()
        }))
        .unwrap();
        let b = build_box(&resolve(BoxParams {
            divisions_x: vec![75.0, 25.0],
            ..BoxParams::default()
        }))
        .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_no_degenerate_triangles() {
        let params = resolve(BoxParams {
            divisions_x: vec![20.0, 60.0],
            divisions_z: vec![40.0],
            chamfer_size: 1.0,
            ..BoxParams::default()
        });
        let mesh = build_box(&params).unwrap();
        for triangle in mesh.triangulate() {
            assert!(triangle.normal.length() > 0.5);
        }
    }
}
