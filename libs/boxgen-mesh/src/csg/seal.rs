//! # Seam Sealing
//!
//! A BSP boolean splits a polygon without splitting its neighbour across
//! the shared edge, so the neighbour's edge passes straight through the new
//! vertex (a T-junction) and the result has open edges.
//!
//! Sealing runs once on the realized polygons:
//!
//! 1. Weld vertices closer than [`SEAL_TOLERANCE`] onto one representative,
//!    bucketed on a uniform grid so each lookup scans 27 cells.
//! 2. For every polygon edge, insert the welded vertices lying strictly
//!    inside it, ordered along the edge.
//! 3. Polygons that gained vertices are fanned around their centroid so no
//!    output triangle is degenerate; untouched polygons pass through as-is.
//!
//! Loops that collapse below three vertices or to zero area are dropped:
//! their edges run out and back along one line and cancel.

use std::collections::HashMap;

use config::constants::SEAL_TOLERANCE;
use glam::DVec3;
use tracing::debug;

use super::polygon::CsgPolygon;
use crate::mesh::{BoundingBox, Polygon};

/// Grid cells an edge may cover before the search scans every vertex.
const MAX_EDGE_CELLS: i64 = 4096;

type Cell = (i64, i64, i64);

/// Welded vertex positions bucketed on a uniform grid.
struct VertexGrid {
    cell: f64,
    tolerance: f64,
    points: Vec<DVec3>,
    buckets: HashMap<Cell, Vec<usize>>,
}

impl VertexGrid {
    /// Sizes cells so a cell holds about one vertex on average, never
    /// smaller than the weld neighbourhood.
    fn new(bounds: &BoundingBox, vertex_count: usize, tolerance: f64) -> Self {
        let diagonal = bounds.size().length();
        let cell = (diagonal / (vertex_count.max(1) as f64).cbrt()).max(16.0 * tolerance);
        Self {
            cell,
            tolerance,
            points: Vec::with_capacity(vertex_count),
            buckets: HashMap::new(),
        }
    }

    fn cell_of(&self, p: DVec3) -> Cell {
        let c = (p / self.cell).floor();
        (c.x as i64, c.y as i64, c.z as i64)
    }

    /// Index of the stored point within tolerance of `p`, storing `p` if
    /// there is none.
    fn weld(&mut self, p: DVec3) -> usize {
        let (cx, cy, cz) = self.cell_of(p);
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.buckets.get(&(cx + dx, cy + dy, cz + dz)) else {
                        continue;
                    };
                    if let Some(&index) = bucket
                        .iter()
                        .find(|&&i| self.points[i].distance(p) <= self.tolerance)
                    {
                        return index;
                    }
                }
            }
        }
        let index = self.points.len();
        self.points.push(p);
        self.buckets.entry((cx, cy, cz)).or_default().push(index);
        index
    }

    /// Stored points on the open segment `a → b`, ordered from `a`.
    fn inside_edge(&self, a: usize, b: usize) -> Vec<usize> {
        let (start, end) = (self.points[a], self.points[b]);
        let direction = end - start;
        let length_sq = direction.length_squared();
        let length = length_sq.sqrt();

        let mut hits: Vec<(f64, usize)> = Vec::new();
        let mut consider = |i: usize| {
            if i == a || i == b {
                return;
            }
            let p = self.points[i];
            let t = (p - start).dot(direction) / length_sq;
            if t * length <= self.tolerance || (1.0 - t) * length <= self.tolerance {
                return;
            }
            if p.distance(start + direction * t) <= self.tolerance {
                hits.push((t, i));
            }
        };

        let pad = DVec3::splat(self.tolerance);
        let lo = self.cell_of(start.min(end) - pad);
        let hi = self.cell_of(start.max(end) + pad);
        let cells = (hi.0 - lo.0 + 1) * (hi.1 - lo.1 + 1) * (hi.2 - lo.2 + 1);
        if cells > MAX_EDGE_CELLS {
            (0..self.points.len()).for_each(&mut consider);
        } else {
            for x in lo.0..=hi.0 {
                for y in lo.1..=hi.1 {
                    for z in lo.2..=hi.2 {
                        if let Some(bucket) = self.buckets.get(&(x, y, z)) {
                            bucket.iter().for_each(|&i| consider(i));
                        }
                    }
                }
            }
        }

        hits.sort_by(|l, r| l.0.total_cmp(&r.0));
        hits.into_iter().map(|(_, i)| i).collect()
    }
}

/// Welds `polygons` and splits their edges at T-junctions.
///
/// Expects finite coordinates.
pub(super) fn seal(polygons: Vec<CsgPolygon>) -> Vec<Polygon> {
    let Some(bounds) = BoundingBox::from_points(polygons.iter().flat_map(|p| p.vertices().iter().copied()))
    else {
        return Vec::new();
    };
    let vertex_count = polygons.iter().map(|p| p.vertices().len()).sum();
    let mut grid = VertexGrid::new(&bounds, vertex_count, SEAL_TOLERANCE);

    let loops: Vec<Vec<usize>> = polygons
        .iter()
        .filter_map(|polygon| {
            let mut ids: Vec<usize> = Vec::with_capacity(polygon.vertices().len());
            for vertex in polygon.vertices() {
                let id = grid.weld(*vertex);
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            while ids.len() > 1 && ids.first() == ids.last() {
                ids.pop();
            }
            (ids.len() >= 3).then_some(ids)
        })
        .collect();

    let min_area = SEAL_TOLERANCE * SEAL_TOLERANCE;
    let mut sealed = Vec::with_capacity(loops.len());
    let (mut fanned, mut dropped) = (0usize, polygons.len() - loops.len());
    for ids in &loops {
        let mut ring = Vec::with_capacity(ids.len());
        for (k, &a) in ids.iter().enumerate() {
            ring.push(a);
            ring.extend(grid.inside_edge(a, ids[(k + 1) % ids.len()]));
        }

        let polygon = Polygon::new(ring.iter().map(|&i| grid.points[i]).collect());
        if polygon.area() <= min_area {
            dropped += 1;
        } else if ring.len() == ids.len() {
            sealed.push(polygon);
        } else {
            fanned += 1;
            sealed.extend(centroid_fan(polygon.vertices()));
        }
    }

    debug!(
        vertices = grid.points.len(),
        fanned,
        dropped,
        polygons = sealed.len(),
        "csg seams sealed"
    );
    sealed
}

/// Triangles joining each edge of a convex loop to its vertex centroid.
fn centroid_fan(corners: &[DVec3]) -> impl Iterator<Item = Polygon> + '_ {
    let centroid = corners.iter().fold(DVec3::ZERO, |sum, v| sum + *v) / corners.len() as f64;
    (0..corners.len()).map(move |k| Polygon::new(vec![centroid, corners[k], corners[(k + 1) % corners.len()]]))
}
