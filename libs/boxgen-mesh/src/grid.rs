//! # Breakpoint Grid
//!
//! Rectilinear cell grid over a rectangular footprint, shared by the box and
//! lid builders.
//!
//! Breakpoints are collected per axis from every feature edge (outer wall,
//! inner wall, lip, divider bands, chamfer insets), sorted and merged within
//! [`GEOMETRY_EPSILON`]. Cells are addressed by `(column, row)` and their
//! outlines by grid vertex indices, so neighbouring cells share vertices
//! exactly. With a chamfer, the four corner cells (each exactly one chamfer
//! leg square) become triangles cut along the diagonal.

use config::constants::{approx_equal, approx_zero, GEOMETRY_EPSILON};
use glam::DVec2;

use crate::error::{MeshError, MeshResult};

/// Grid vertex index `(column, row)`.
pub type VertexId = (usize, usize);

// =============================================================================
// BREAKPOINTS
// =============================================================================

/// Collects breakpoints along one axis of a closed interval.
///
/// # Example
///
/// ```rust
/// use boxgen_mesh::grid::Breakpoints;
///
/// let mut axis = Breakpoints::new(-40.0, 40.0);
/// axis.add(-38.0).add(38.0).add(38.0004).add(55.0);
/// assert_eq!(axis.build(), vec![-40.0, -38.0, 38.0, 40.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Breakpoints {
    lo: f64,
    hi: f64,
    interior: Vec<f64>,
}

impl Breakpoints {
    /// Starts an axis spanning `[lo, hi]`; both ends are always breakpoints.
    pub fn new(lo: f64, hi: f64) -> Self {
        Self {
            lo,
            hi,
            interior: Vec::new(),
        }
    }

    /// Adds a breakpoint. Values outside the interval are ignored.
    pub fn add(&mut self, value: f64) -> &mut Self {
        self.interior.push(value);
        self
    }

    /// Adds a breakpoint at `inset` from each end of the interval.
    pub fn add_inset(&mut self, inset: f64) -> &mut Self {
        let (lo, hi) = (self.lo, self.hi);
        self.add(lo + inset).add(hi - inset)
    }

    /// Sorted, merged breakpoints including both ends.
    pub fn build(mut self) -> Vec<f64> {
        self.interior.sort_by(f64::total_cmp);
        let mut points = vec![self.lo];
        for value in self.interior {
            let last = points[points.len() - 1];
            if value - last > GEOMETRY_EPSILON && self.hi - value > GEOMETRY_EPSILON {
                points.push(value);
            }
        }
        points.push(self.hi);
        points
    }
}

// =============================================================================
// CELLS
// =============================================================================

/// One grid cell with its counter-clockwise outline.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub column: usize,
    pub row: usize,
    /// Outline as grid vertices, counter-clockwise seen from +Z.
    pub outline: Vec<VertexId>,
    /// Centre of the cell rectangle, used for classification.
    pub center: DVec2,
}

impl Cell {
    /// Directed outline edges `(from, to)`; the cell lies to their left.
    pub fn edges(&self) -> impl Iterator<Item = (VertexId, VertexId)> + '_ {
        let n = self.outline.len();
        (0..n).map(move |i| (self.outline[i], self.outline[(i + 1) % n]))
    }

    /// True for a chamfered corner cell.
    pub fn is_triangle(&self) -> bool {
        self.outline.len() == 3
    }
}

// =============================================================================
// GRID
// =============================================================================

/// A breakpoint grid with optional chamfered corners.
#[derive(Debug, Clone)]
pub struct Grid {
    xs: Vec<f64>,
    ys: Vec<f64>,
    chamfer: f64,
}

impl Grid {
    /// Creates a grid from sorted breakpoints.
    ///
    /// # Errors
    ///
    /// Returns a degenerate-geometry error if an axis has fewer than three
    /// breakpoints while chamfered, fewer than two otherwise, or if a corner
    /// cell does not match the chamfer leg.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>, chamfer: f64) -> MeshResult<Self> {
        let chamfered = !approx_zero(chamfer);
        let min_points = if chamfered { 3 } else { 2 };
        if xs.len() < min_points || ys.len() < min_points {
            return Err(MeshError::degenerate(format!(
                "grid needs {min_points} breakpoints per axis, got {}x{}",
                xs.len(),
                ys.len()
            )));
        }

        if chamfered {
            let legs = [
                xs[1] - xs[0],
                xs[xs.len() - 1] - xs[xs.len() - 2],
                ys[1] - ys[0],
                ys[ys.len() - 1] - ys[ys.len() - 2],
            ];
            if legs.iter().any(|leg| !approx_equal(*leg, chamfer)) {
                return Err(MeshError::degenerate(format!(
                    "corner cells {legs:?} do not match chamfer {chamfer}"
                )));
            }
        }

        Ok(Self {
            xs,
            ys,
            chamfer: if chamfered { chamfer } else { 0.0 },
        })
    }

    /// Number of cell columns.
    pub fn columns(&self) -> usize {
        self.xs.len() - 1
    }

    /// Number of cell rows.
    pub fn rows(&self) -> usize {
        self.ys.len() - 1
    }

    /// X breakpoints.
    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    /// Y breakpoints.
    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    /// Chamfer leg, zero when corners are square.
    pub fn chamfer(&self) -> f64 {
        self.chamfer
    }

    /// Position of a grid vertex.
    pub fn point(&self, (column, row): VertexId) -> DVec2 {
        DVec2::new(self.xs[column], self.ys[row])
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> Vec<Cell> {
        let (nx, ny) = (self.columns(), self.rows());
        let mut cells = Vec::with_capacity(nx * ny);
        for row in 0..ny {
            for column in 0..nx {
                let center = DVec2::new(
                    (self.xs[column] + self.xs[column + 1]) / 2.0,
                    (self.ys[row] + self.ys[row + 1]) / 2.0,
                );
                cells.push(Cell {
                    column,
                    row,
                    outline: self.outline(column, row),
                    center,
                });
            }
        }
        cells
    }

    fn outline(&self, i: usize, j: usize) -> Vec<VertexId> {
        let (last_i, last_j) = (self.columns() - 1, self.rows() - 1);
        if self.chamfer > 0.0 {
            // Keep the half of the corner cell away from the outer corner
            match (i, j) {
                (0, 0) => return vec![(1, 0), (1, 1), (0, 1)],
                (i, 0) if i == last_i => return vec![(i, 0), (i + 1, 1), (i, 1)],
                (0, j) if j == last_j => return vec![(0, j), (1, j), (1, j + 1)],
                (i, j) if i == last_i && j == last_j => {
                    return vec![(i, j), (i + 1, j), (i, j + 1)]
                }
                _ => {}
            }
        }
        vec![(i, j), (i + 1, j), (i + 1, j + 1), (i, j + 1)]
    }
}
