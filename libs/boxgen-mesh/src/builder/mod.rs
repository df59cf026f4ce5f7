//! # Direct Builders
//!
//! Grid-based construction of the box body and the plain lid, plus the CSG
//! lid used when text is present.
//!
//! Box and lid are built by one parameterized machinery: a [`GridFeatures`]
//! set (chamfer, divider bands, hinge clearance) turns into per-axis
//! breakpoints, and each part only decides the height of every cell before
//! handing the grid to the [`Heightfield`](crate::heightfield::Heightfield)
//! emitter.

pub mod box_body;
pub mod lid;
pub mod lid_csg;

pub use box_body::build_box;
pub use lid::{build_lid, build_plain_lid, LidFrame};

use config::constants::approx_zero;

use crate::error::MeshResult;
use crate::grid::{Breakpoints, Grid};

/// Features that split the footprint into cells.
///
/// Coordinates are in the frame of the part being built; the lid mirrors X
/// before filling this in.
#[derive(Debug, Clone, PartialEq)]
pub struct GridFeatures {
    /// Chamfer leg on the four vertical outer edges (0 for square corners).
    pub chamfer: f64,
    /// Divider centrelines along X.
    pub dividers_x: Vec<f64>,
    /// Divider centrelines along Y.
    pub dividers_y: Vec<f64>,
    /// Half width of the band around each divider centreline.
    pub band_half_width: f64,
    /// Adds a Y = 0 breakpoint so the back half can be treated separately.
    pub hinge_clearance: bool,
}

impl GridFeatures {
    /// True if `(x, y)` lies inside any divider band.
    pub fn in_band(&self, x: f64, y: f64) -> bool {
        let hw = self.band_half_width;
        self.dividers_x.iter().any(|d| (x - d).abs() < hw)
            || self.dividers_y.iter().any(|d| (y - d).abs() < hw)
    }

    /// Builds the grid for a `2 * half_x` by `2 * half_y` footprint.
    ///
    /// `insets` are distances from the outer edge (wall, lip) shared by both
    /// axes as `(x_inset, y_inset)` pairs. Divider bands are clipped to
    /// `band_limit` on each axis so they never reach into the chamfer.
    pub fn grid(
        &self,
        half_x: f64,
        half_y: f64,
        insets: &[(f64, f64)],
        band_limit: (f64, f64),
    ) -> MeshResult<Grid> {
        let xs = self.axis(half_x, insets.iter().map(|i| i.0), &self.dividers_x, band_limit.0, false);
        let ys = self.axis(
            half_y,
            insets.iter().map(|i| i.1),
            &self.dividers_y,
            band_limit.1,
            self.hinge_clearance,
        );
        Grid::new(xs, ys, self.chamfer)
    }

    fn axis(
        &self,
        half: f64,
        insets: impl Iterator<Item = f64>,
        dividers: &[f64],
        band_limit: f64,
        split_at_zero: bool,
    ) -> Vec<f64> {
        let mut axis = Breakpoints::new(-half, half);
        for inset in insets {
            axis.add_inset(inset);
        }
        if !approx_zero(self.chamfer) {
            axis.add_inset(self.chamfer);
        }
        for d in dividers {
            axis.add((d - self.band_half_width).max(-band_limit));
            axis.add((d + self.band_half_width).min(band_limit));
        }
        if split_at_zero {
            axis.add(0.0);
        }
        axis.build()
    }
}
