//! # Heightfield Emitter
//!
//! Turns a [`Grid`] with one top height per cell into a closed polygon mesh.
//! Both the box body and the plain lid are heightfields over a flat base:
//! the box rises from Z = 0 to either the floor or the rim, the lid from the
//! cap bottom to either the cap top or the lip.
//!
//! ## Faces
//!
//! - a top face per cell at its height
//! - a vertical step face on every edge between cells of different heights,
//!   facing the lower cell
//! - the exterior: either one bottom polygon plus one wall per straight side
//!   ([`Exterior::Shell`]), or a bottom face and wall strip per cell
//!   ([`Exterior::PerCell`])
//!
//! ## Watertightness
//!
//! A vertical face is split at every cell height meeting either of its end
//! vertices, so two faces touching along a vertical line always share
//! identical edge segments. A face carrying extra points on both vertical
//! sides is cut along its diagonal so fan triangulation from each piece's
//! first vertex never yields a zero-area triangle.

use std::collections::HashMap;

use glam::{DVec2, DVec3};
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::grid::{Cell, Grid, VertexId};
use crate::mesh::{Mesh, Polygon};

/// How the outside of the heightfield is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exterior {
    /// One bottom polygon and one wall polygon per straight side.
    ///
    /// Requires every boundary cell to share one height; otherwise the
    /// emitter falls back to [`Exterior::PerCell`].
    Shell,
    /// A bottom face per cell and a wall strip per boundary edge.
    PerCell,
}

/// A grid with a base plane and one top height per cell.
pub struct Heightfield<'a> {
    grid: &'a Grid,
    cells: Vec<Cell>,
    heights: Vec<f64>,
    base: f64,
    owners: HashMap<(VertexId, VertexId), usize>,
    levels: HashMap<VertexId, Vec<f64>>,
}

impl<'a> Heightfield<'a> {
    /// Evaluates `height_of` for every cell. Heights must lie above `base`.
    pub fn new(grid: &'a Grid, base: f64, height_of: impl Fn(&Cell) -> f64) -> Self {
        let cells = grid.cells();
        let heights: Vec<f64> = cells.iter().map(&height_of).collect();

        let mut owners = HashMap::new();
        let mut levels: HashMap<VertexId, Vec<f64>> = HashMap::new();
        for (index, cell) in cells.iter().enumerate() {
            for edge in cell.edges() {
                owners.insert(edge, index);
            }
            for vertex in &cell.outline {
                levels.entry(*vertex).or_default().push(heights[index]);
            }
        }
        for list in levels.values_mut() {
            list.sort_by(f64::total_cmp);
            list.dedup();
        }

        Self {
            grid,
            cells,
            heights,
            base,
            owners,
            levels,
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell heights, parallel to [`Heightfield::cells`].
    pub fn heights(&self) -> &[f64] {
        &self.heights
    }

    /// Emits the closed mesh.
    ///
    /// # Errors
    ///
    /// Returns a degenerate-geometry error if a cell does not rise above the
    /// base or the boundary loop cannot be traced.
    pub fn build(&self, exterior: Exterior) -> MeshResult<Mesh> {
        if let Some(index) = self.heights.iter().position(|h| *h <= self.base) {
            return Err(MeshError::degenerate(format!(
                "cell {index} top {} does not rise above base {}",
                self.heights[index], self.base
            )));
        }

        let shell_height = match exterior {
            Exterior::Shell => {
                let uniform = self.uniform_boundary_height();
                if uniform.is_none() {
                    debug!("boundary heights differ; emitting per-cell exterior");
                }
                uniform
            }
            Exterior::PerCell => None,
        };

        let mut mesh = Mesh::with_capacity(self.cells.len() * 3);
        for (index, cell) in self.cells.iter().enumerate() {
            let height = self.heights[index];
            mesh.add_polygon(cell.outline.iter().map(|v| self.at(*v, height)).collect());

            if shell_height.is_none() {
                mesh.add_polygon(
                    cell.outline
                        .iter()
                        .rev()
                        .map(|v| self.at(*v, self.base))
                        .collect(),
                );
            }

            for (from, to) in cell.edges() {
                match self.owners.get(&(to, from)) {
                    None if shell_height.is_none() => {
                        self.vertical_face(&mut mesh, from, to, self.base, height)
                    }
                    None => {}
                    Some(&neighbour) => {
                        let lower = self.heights[neighbour];
                        if height > lower {
                            self.vertical_face(&mut mesh, from, to, lower, height);
                        }
                    }
                }
            }
        }

        if let Some(height) = shell_height {
            self.emit_shell(&mut mesh, height)?;
        }

        debug!(
            cells = self.cells.len(),
            polygons = mesh.polygon_count(),
            shell = shell_height.is_some(),
            "heightfield emitted"
        );
        Ok(mesh)
    }

    fn at(&self, vertex: VertexId, z: f64) -> DVec3 {
        let DVec2 { x, y } = self.grid.point(vertex);
        DVec3::new(x, y, z)
    }

    fn boundary_edges(&self) -> Vec<(usize, VertexId, VertexId)> {
        let mut edges = Vec::new();
        for (index, cell) in self.cells.iter().enumerate() {
            for (from, to) in cell.edges() {
                if !self.owners.contains_key(&(to, from)) {
                    edges.push((index, from, to));
                }
            }
        }
        edges
    }

    /// The shared boundary height, if every boundary cell and every boundary
    /// vertex sees only that height.
    fn uniform_boundary_height(&self) -> Option<f64> {
        let edges = self.boundary_edges();
        let height = self.heights[edges.first()?.0];
        let uniform = edges.iter().all(|(index, from, to)| {
            self.heights[*index] == height
                && self.levels[from].as_slice() == [height]
                && self.levels[to].as_slice() == [height]
        });
        uniform.then_some(height)
    }

    /// Heights met at `vertex` strictly between `lo` and `hi`, ascending.
    fn levels_between(&self, vertex: VertexId, lo: f64, hi: f64) -> Vec<f64> {
        self.levels
            .get(&vertex)
            .map(|levels| levels.iter().copied().filter(|l| *l > lo && *l < hi).collect())
            .unwrap_or_default()
    }

    /// Emits the vertical face above edge `from → to` between `lo` and `hi`.
    ///
    /// The solid lies to the left of the edge, so the face normal points to
    /// its right.
    fn vertical_face(&self, mesh: &mut Mesh, from: VertexId, to: VertexId, lo: f64, hi: f64) {
        let left = self.levels_between(from, lo, hi);
        let right = self.levels_between(to, lo, hi);

        let up = |vertex: VertexId, levels: &[f64]| -> Vec<DVec3> {
            levels.iter().map(|z| self.at(vertex, *z)).collect()
        };
        let down = |vertex: VertexId, levels: &[f64]| -> Vec<DVec3> {
            levels.iter().rev().map(|z| self.at(vertex, *z)).collect()
        };

        match (left.is_empty(), right.is_empty()) {
            (true, _) => {
                let mut points = vec![self.at(from, lo), self.at(to, lo)];
                points.extend(up(to, &right));
                points.extend([self.at(to, hi), self.at(from, hi)]);
                mesh.push(Polygon::new(points));
            }
            (false, true) => {
                let mut points = vec![self.at(to, lo), self.at(to, hi), self.at(from, hi)];
                points.extend(down(from, &left));
                points.push(self.at(from, lo));
                mesh.push(Polygon::new(points));
            }
            (false, false) => {
                let mut lower = vec![self.at(from, lo), self.at(to, lo)];
                lower.extend(up(to, &right));
                lower.push(self.at(to, hi));
                mesh.push(Polygon::new(lower));

                let mut upper = vec![self.at(to, hi), self.at(from, hi)];
                upper.extend(down(from, &left));
                upper.push(self.at(from, lo));
                mesh.push(Polygon::new(upper));
            }
        }
    }

    /// Emits the merged bottom polygon and one wall per straight side.
    fn emit_shell(&self, mesh: &mut Mesh, height: f64) -> MeshResult<()> {
        let edges = self.boundary_edges();
        let next: HashMap<VertexId, VertexId> =
            edges.iter().map(|(_, from, to)| (*from, *to)).collect();

        let start = edges[0].1;
        let mut ring = vec![start];
        let mut current = start;
        loop {
            current = *next.get(&current).ok_or_else(|| {
                MeshError::degenerate(format!("boundary loop broken at vertex {current:?}"))
            })?;
            if current == start {
                break;
            }
            if ring.len() > edges.len() {
                return Err(MeshError::degenerate("boundary loop does not close"));
            }
            ring.push(current);
        }
        if ring.len() != edges.len() {
            return Err(MeshError::degenerate(
                "boundary has more than one loop; cannot emit a shell",
            ));
        }

        let n = ring.len();
        let first_corner = (0..n)
            .find(|k| is_corner(&ring, *k))
            .ok_or_else(|| MeshError::degenerate("boundary loop has no corners"))?;
        ring.rotate_left(first_corner);
        let corners: Vec<usize> = (0..n).filter(|k| is_corner(&ring, *k)).collect();

        let mut bottom = Vec::with_capacity(corners.len());
        for (c, &start_index) in corners.iter().enumerate() {
            let end_index = corners.get(c + 1).copied().unwrap_or(n);
            let (side_start, side_end) = (ring[start_index], ring[end_index % n]);

            let mut wall = vec![
                self.at(side_start, self.base),
                self.at(side_end, self.base),
                self.at(side_end, height),
            ];
            wall.extend(
                ring[start_index + 1..end_index]
                    .iter()
                    .rev()
                    .map(|v| self.at(*v, height)),
            );
            wall.push(self.at(side_start, height));
            mesh.add_polygon(wall);

            bottom.push(self.at(side_start, self.base));
        }
        bottom.reverse();
        mesh.add_polygon(bottom);
        Ok(())
    }
}

/// Grid-index direction of an edge, as signs per axis.
fn direction(a: VertexId, b: VertexId) -> (isize, isize) {
    (
        (b.0 as isize - a.0 as isize).signum(),
        (b.1 as isize - a.1 as isize).signum(),
    )
}

/// True if the boundary turns at ring position `k`.
fn is_corner(ring: &[VertexId], k: usize) -> bool {
    let n = ring.len();
    let prev = ring[(k + n - 1) % n];
    let next = ring[(k + 1) % n];
    direction(prev, ring[k]) != direction(ring[k], next)
}
