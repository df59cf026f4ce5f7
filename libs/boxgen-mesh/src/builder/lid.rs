//! # Lid Builder
//!
//! Builds the lid in its print frame: cap top at Z = 0, lip rising to the lip
//! height, cap bottom (the outer face once assembled) at Z = -wall.
//!
//! Lids without text are a heightfield over the same breakpoint grid as the
//! box: the cap is the base slab, lip cells rise to the lip height and wing,
//! hollow, notch and hinge-clearance cells stay at the cap top. Lids with
//! text go through the CSG path in [`lid_csg`](super::lid_csg).

use config::constants::GEOMETRY_EPSILON;
use glam::{DMat4, DVec2, DVec3};
use tracing::{debug, info, warn};

use super::{lid_csg, GridFeatures};
use crate::error::MeshResult;
use crate::heightfield::{Exterior, Heightfield};
use crate::mesh::Mesh;
use crate::params::{LidSpec, ResolvedParams};
use crate::text::TextRasterizer;

// =============================================================================
// FRAMES
// =============================================================================

/// Mapping between the lid print frame and the box frame.
///
/// Assembling turns the lid 180° about Y and lifts it by the box height:
/// `(x, y, z) → (-x, y, H - z)`. The map is its own inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LidFrame {
    pub box_height: f64,
}

impl LidFrame {
    pub fn new(box_height: f64) -> Self {
        Self { box_height }
    }

    /// Print frame to box frame.
    pub fn to_box(&self) -> DMat4 {
        DMat4::from_translation(DVec3::new(0.0, 0.0, self.box_height))
            * DMat4::from_scale(DVec3::new(-1.0, 1.0, -1.0))
    }

    /// Box frame to print frame.
    pub fn to_print(&self) -> DMat4 {
        self.to_box()
    }

    /// Maps a box-frame X coordinate into the print frame.
    pub fn mirror_x(x: f64) -> f64 {
        -x
    }
}

// =============================================================================
// LIP OUTLINE
// =============================================================================

/// Half extents of the lip, in the lid frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LipOutline {
    /// Outer half extents: inner box half extents minus the tolerance.
    pub outer: DVec2,
    /// Hollow half extents: outer minus one wall, floored at zero.
    pub inner: DVec2,
    /// Half width of the slot cut for each divider.
    pub notch_half_width: f64,
    pub height: f64,
}

impl LipOutline {
    pub fn new(params: &ResolvedParams, lid: &LidSpec) -> Self {
        let wall = params.wall;
        let outer = DVec2::new(
            params.half_width() - wall - lid.tolerance,
            params.half_depth() - wall - lid.tolerance,
        )
        .max(DVec2::ZERO);
        Self {
            outer,
            inner: (outer - DVec2::splat(wall)).max(DVec2::ZERO),
            notch_half_width: wall / 2.0 + lid.tolerance,
            height: lid.lip_height,
        }
    }

    /// False when the lid is a flat plate.
    pub fn exists(&self) -> bool {
        self.height > GEOMETRY_EPSILON && self.outer.min_element() > GEOMETRY_EPSILON
    }

    /// True if the lip encloses a hollow.
    pub fn is_hollow(&self) -> bool {
        self.inner.min_element() > GEOMETRY_EPSILON
    }
}

impl GridFeatures {
    /// Features of the lid, with box X positions mirrored into the lid frame.
    pub fn for_lid(params: &ResolvedParams, lip: &LipOutline) -> Self {
        if !lip.exists() {
            return Self {
                chamfer: params.chamfer,
                dividers_x: Vec::new(),
                dividers_y: Vec::new(),
                band_half_width: 0.0,
                hinge_clearance: false,
            };
        }
        let mut dividers_x: Vec<f64> = params.dividers_x.iter().map(|d| LidFrame::mirror_x(*d)).collect();
        dividers_x.sort_by(f64::total_cmp);
        Self {
            chamfer: params.chamfer,
            dividers_x,
            dividers_y: params.dividers_y.clone(),
            band_half_width: lip.notch_half_width,
            hinge_clearance: params.hinge.is_some(),
        }
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

/// Builds the lid without text directly from the breakpoint grid.
///
/// # Example
///
/// ```rust
/// use boxgen_mesh::builder::build_plain_lid;
/// use boxgen_mesh::params::BoxParams;
///
/// let params = BoxParams::default().resolve().unwrap();
/// let lid = params.lid.as_ref().unwrap();
/// let mesh = build_plain_lid(&params, lid).unwrap();
/// assert!(mesh.edge_report().is_closed());
/// ```
pub fn build_plain_lid(params: &ResolvedParams, lid: &LidSpec) -> MeshResult<Mesh> {
    let lip = LipOutline::new(params, lid);
    let features = GridFeatures::for_lid(params, &lip);
    let (hw, hd) = (params.half_width(), params.half_depth());

    let mut insets = Vec::with_capacity(2);
    if lip.exists() {
        insets.push((hw - lip.outer.x, hd - lip.outer.y));
        if lip.is_hollow() {
            insets.push((hw - lip.inner.x, hd - lip.inner.y));
        }
    }
    let grid = features.grid(hw, hd, &insets, (lip.outer.x, lip.outer.y))?;
    let hinged = features.hinge_clearance;

    let field = Heightfield::new(&grid, -params.wall, |cell| {
        let c = cell.center;
        let in_lip = lip.exists() && c.x.abs() < lip.outer.x && c.y.abs() < lip.outer.y;
        let hollow = c.x.abs() < lip.inner.x && c.y.abs() < lip.inner.y;
        let notched = features.in_band(c.x, c.y);
        let cleared = hinged && c.y > 0.0;
        if in_lip && !hollow && !notched && !cleared {
            lip.height
        } else {
            0.0
        }
    });
    let mesh = field.build(Exterior::PerCell)?;

    debug!(
        columns = grid.columns(),
        rows = grid.rows(),
        lip = lip.exists(),
        "plain lid grid"
    );
    Ok(mesh)
}

/// Builds the lid, or `None` if the parameters have no lid.
///
/// Text that renders to ink selects the CSG path; otherwise the lid is
/// built directly.
pub fn build_lid(params: &ResolvedParams, rasterizer: &TextRasterizer) -> MeshResult<Option<Mesh>> {
    let Some(lid) = params.lid.as_ref() else {
        return Ok(None);
    };

    if let Some(text) = lid.text.as_ref() {
        match lid_csg::text_solid(params, text, rasterizer)? {
            Some(solid) => {
                let mesh = lid_csg::build_text_lid(params, lid, solid, text.style)?;
                info!(
                    strategy = "csg",
                    polygons = mesh.polygon_count(),
                    "lid built"
                );
                return Ok(Some(mesh));
            }
            None => warn!(text = %text.text, "lid text rendered no ink; building plain lid"),
        }
    }

    let mesh = build_plain_lid(params, lid)?;
    info!(
        strategy = "direct",
        polygons = mesh.polygon_count(),
        "lid built"
    );
    Ok(Some(mesh))
}
