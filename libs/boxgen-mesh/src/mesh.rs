//! # Mesh Data Structure
//!
//! Polygon-soup mesh shared by every generator, plus the triangle and
//! bounding-box types used at the export boundary.
//!
//! A [`Mesh`] is a list of planar convex [`Polygon`]s wound counter-clockwise
//! when seen from outside. Meshes produced by the CSG path additionally carry
//! a residual affine transform; every consumer goes through
//! [`Mesh::triangulate`], [`Mesh::bounding_box`] or [`Mesh::baked`], which
//! apply it, so no caller positions geometry by hand.

use std::collections::HashMap;

use config::constants::WELD_QUANTUM;
use glam::{DMat4, DVec3};

use crate::error::{MeshError, MeshResult};

// =============================================================================
// POLYGON
// =============================================================================

/// A planar convex polygon with at least three vertices.
///
/// Vertices may include collinear points along an edge so the polygon shares
/// exact edges with finer neighbours. Generators order such polygons so that
/// the fan from the first vertex never produces a zero-area triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<DVec3>,
}

impl Polygon {
    /// Creates a polygon from its vertices in counter-clockwise order.
    pub fn new(vertices: Vec<DVec3>) -> Self {
        debug_assert!(vertices.len() >= 3, "polygon needs at least 3 vertices");
        Self { vertices }
    }

    /// Polygon vertices.
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always false; a polygon has at least three vertices.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Area-weighted normal computed with Newell's method.
    ///
    /// Robust against collinear leading vertices; its length is twice the area.
    pub fn newell_normal(&self) -> DVec3 {
        let mut normal = DVec3::ZERO;
        for (i, current) in self.vertices.iter().enumerate() {
            let next = self.vertices[(i + 1) % self.vertices.len()];
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
        }
        normal
    }

    /// Unit normal, or zero for a degenerate polygon.
    pub fn normal(&self) -> DVec3 {
        self.newell_normal().normalize_or_zero()
    }

    /// Polygon area.
    pub fn area(&self) -> f64 {
        self.newell_normal().length() / 2.0
    }

    /// Returns the polygon with reversed winding.
    pub fn reversed(&self) -> Polygon {
        let mut vertices = self.vertices.clone();
        vertices.reverse();
        Polygon { vertices }
    }

    /// Returns the polygon transformed by `matrix`.
    ///
    /// Winding is reversed for mirroring transforms so normals stay outward.
    pub fn transformed(&self, matrix: &DMat4) -> Polygon {
        let mut vertices: Vec<DVec3> = self
            .vertices
            .iter()
            .map(|v| matrix.transform_point3(*v))
            .collect();
        if matrix.determinant() < 0.0 {
            vertices.reverse();
        }
        Polygon { vertices }
    }

    /// Fan triangulation from the first vertex: `n - 2` triangles.
    pub fn fan(&self) -> impl Iterator<Item = [DVec3; 3]> + '_ {
        let apex = self.vertices[0];
        self.vertices[1..]
            .windows(2)
            .map(move |pair| [apex, pair[0], pair[1]])
    }
}

// =============================================================================
// MESH
// =============================================================================

/// A polygon soup with an optional residual transform.
///
/// # Example
///
/// ```rust
/// use boxgen_mesh::mesh::{Mesh, Polygon};
/// use glam::DVec3;
///
/// let mut mesh = Mesh::new();
/// mesh.push(Polygon::new(vec![
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
/// ]));
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    polygons: Vec<Polygon>,
    transform: Option<DMat4>,
}

impl Mesh {
    /// Creates an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with pre-allocated capacity.
    pub fn with_capacity(polygon_count: usize) -> Self {
        Self {
            polygons: Vec::with_capacity(polygon_count),
            transform: None,
        }
    }

    /// Creates a mesh from polygons.
    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self {
            polygons,
            transform: None,
        }
    }

    /// Number of polygons.
    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
    }

    /// Number of triangles after fan triangulation.
    pub fn triangle_count(&self) -> usize {
        self.polygons.iter().map(|p| p.len() - 2).sum()
    }

    /// Returns true if the mesh has no polygons.
    pub fn is_empty(&self) -> bool {
        self.polygons.is_empty()
    }

    /// Appends a polygon.
    pub fn push(&mut self, polygon: Polygon) {
        self.polygons.push(polygon);
    }

    /// Appends a polygon built from raw vertices.
    pub fn add_polygon(&mut self, vertices: Vec<DVec3>) {
        self.polygons.push(Polygon::new(vertices));
    }

    /// Polygons in local coordinates (before the residual transform).
    pub fn polygons(&self) -> &[Polygon] {
        &self.polygons
    }

    /// Consumes the mesh, returning its local polygons.
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.polygons
    }

    /// Residual transform still to be applied by consumers.
    pub fn residual_transform(&self) -> Option<&DMat4> {
        self.transform.as_ref()
    }

    /// Attaches a residual transform, composed after any existing one.
    pub fn with_residual_transform(mut self, matrix: DMat4) -> Self {
        self.transform = Some(match self.transform {
            Some(existing) => matrix * existing,
            None => matrix,
        });
        self
    }

    /// Applies `matrix` to every vertex immediately.
    pub fn transform(&mut self, matrix: &DMat4) {
        self.bake_in_place();
        for polygon in &mut self.polygons {
            *polygon = polygon.transformed(matrix);
        }
    }

    /// Translates every vertex immediately.
    pub fn translate(&mut self, offset: DVec3) {
        self.transform(&DMat4::from_translation(offset));
    }

    /// Returns a copy with the residual transform applied to the vertices.
    pub fn baked(&self) -> Mesh {
        let mut mesh = self.clone();
        mesh.bake_in_place();
        mesh
    }

    fn bake_in_place(&mut self) {
        if let Some(matrix) = self.transform.take() {
            for polygon in &mut self.polygons {
                *polygon = polygon.transformed(&matrix);
            }
        }
    }

    /// Appends all polygons of `other`, resolving both residual transforms.
    pub fn merge(&mut self, other: &Mesh) {
        self.bake_in_place();
        match other.transform {
            Some(ref matrix) => self
                .polygons
                .extend(other.polygons.iter().map(|p| p.transformed(matrix))),
            None => self.polygons.extend(other.polygons.iter().cloned()),
        }
    }

    /// Output-space polygons, with the residual transform applied.
    pub fn output_polygons(&self) -> Vec<Polygon> {
        match self.transform {
            Some(ref matrix) => self.polygons.iter().map(|p| p.transformed(matrix)).collect(),
            None => self.polygons.clone(),
        }
    }

    /// Fan-triangulates every polygon in output space.
    pub fn triangulate(&self) -> Vec<Triangle> {
        let mut triangles = Vec::with_capacity(self.triangle_count());
        for polygon in self.output_polygons() {
            triangles.extend(polygon.fan().map(|[a, b, c]| Triangle::new(a, b, c)));
        }
        triangles
    }

    /// Enclosed volume, by the divergence theorem over the triangulated
    /// surface. Only meaningful for closed, outward-wound meshes.
    pub fn volume(&self) -> f64 {
        self.triangulate()
            .iter()
            .map(|t| t.vertices[0].dot(t.vertices[1].cross(t.vertices[2])) / 6.0)
            .sum()
    }

    /// Axis-aligned bounds in output space, or `None` for an empty mesh.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.output_polygons().iter().flat_map(|p| p.vertices().iter().copied()))
    }

    /// Checks structural sanity: polygon sizes and finite coordinates.
    pub fn validate(&self) -> MeshResult<()> {
        for (index, polygon) in self.polygons.iter().enumerate() {
            if polygon.len() < 3 {
                return Err(MeshError::degenerate(format!(
                    "polygon {index} has {} vertices",
                    polygon.len()
                )));
            }
            if polygon.vertices().iter().any(|v| !v.is_finite()) {
                return Err(MeshError::degenerate(format!(
                    "polygon {index} has a non-finite vertex"
                )));
            }
        }
        Ok(())
    }

    /// Counts unmatched and over-shared edges in output space.
    ///
    /// A closed, consistently wound mesh has every directed edge `a → b`
    /// matched by exactly one `b → a`.
    pub fn edge_report(&self) -> EdgeReport {
        let mut directed: HashMap<(WeldKey, WeldKey), u32> = HashMap::new();
        for polygon in self.output_polygons() {
            let vertices = polygon.vertices();
            for (i, a) in vertices.iter().enumerate() {
                let b = vertices[(i + 1) % vertices.len()];
                let (ka, kb) = (WeldKey::of(*a), WeldKey::of(b));
                if ka != kb {
                    *directed.entry((ka, kb)).or_insert(0) += 1;
                }
            }
        }

        let mut report = EdgeReport::default();
        for (&(a, b), &forward) in &directed {
            if a > b && directed.contains_key(&(b, a)) {
                continue;
            }
            let backward = directed.get(&(b, a)).copied().unwrap_or(0);
            report.edges += 1;
            if forward != backward {
                report.boundary_edges += 1;
            }
            if forward + backward > 2 {
                report.non_manifold_edges += 1;
            }
        }
        report
    }
}

/// Result of [`Mesh::edge_report`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeReport {
    /// Distinct undirected edges.
    pub edges: usize,
    /// Edges whose two directions are not used equally often.
    pub boundary_edges: usize,
    /// Edges used by more than two polygons.
    pub non_manifold_edges: usize,
}

impl EdgeReport {
    /// True when every edge is shared by exactly two oppositely wound polygons.
    pub fn is_closed(&self) -> bool {
        self.boundary_edges == 0 && self.non_manifold_edges == 0
    }
}

/// Position quantized to [`WELD_QUANTUM`] for hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct WeldKey([i64; 3]);

impl WeldKey {
    pub(crate) fn of(v: DVec3) -> Self {
        let q = |c: f64| (c / WELD_QUANTUM).round() as i64;
        Self([q(v.x), q(v.y), q(v.z)])
    }
}

// =============================================================================
// TRIANGLE
// =============================================================================

/// A triangle with a flat unit normal, used at the export boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: DVec3,
    pub vertices: [DVec3; 3],
}

impl Triangle {
    /// Creates a triangle, deriving its normal from the winding.
    pub fn new(a: DVec3, b: DVec3, c: DVec3) -> Self {
        Self {
            normal: face_normal(a, b, c),
            vertices: [a, b, c],
        }
    }
}

/// Normalized `(b - a) × (c - a)`, or the zero vector for a degenerate triangle.
pub fn face_normal(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (b - a).cross(c - a).normalize_or_zero()
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner (x, y, z)
    pub min: DVec3,
    /// Maximum corner (x, y, z)
    pub max: DVec3,
}

impl BoundingBox {
    /// Creates a new bounding box from min/max corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Bounds of a point set, or `None` if it is empty.
    pub fn from_points(points: impl IntoIterator<Item = DVec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// True if the boxes share volume or touch within `tolerance`.
    ///
    /// Touching boxes count as overlapping: concatenating touching solids
    /// would leave coincident internal faces.
    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.min.x <= other.max.x + tolerance
            && self.max.x >= other.min.x - tolerance
            && self.min.y <= other.max.y + tolerance
            && self.max.y >= other.min.y - tolerance
            && self.min.z <= other.max.z + tolerance
            && self.max.z >= other.min.z - tolerance
    }

    /// Expands this bounding box to include another.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Edge lengths along each axis.
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Centre point.
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) / 2.0
    }
}

// =============================================================================
// TESTS
// =============================================================================
