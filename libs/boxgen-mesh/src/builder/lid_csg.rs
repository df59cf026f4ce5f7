//! # CSG Lid Builder
//!
//! Lid construction by boolean operations, used when the lid carries text.
//!
//! The tree is built with the cap bottom at Z = 0 (cap top at the wall
//! thickness, lip above it) and carries one residual translation by
//! `-wall` so the realized mesh lands in the same print frame as the
//! direct lid. Every cutter overshoots the faces it opens by
//! [`CUTTER_OVERSHOOT`] so no cut leaves a coplanar sliver.

use config::constants::CUTTER_OVERSHOOT;
use glam::{DMat4, DVec2, DVec3};
use tracing::debug;

use super::lid::{LidFrame, LipOutline};
use crate::csg::{CsgNode, CsgTree, Primitive};
use crate::error::MeshResult;
use crate::mesh::Mesh;
use crate::params::{LidSpec, ResolvedParams, TextSpec, TextStyle};
use crate::text::{TextRasterizer, TextRequest};

fn block(min: DVec3, max: DVec3) -> CsgNode {
    CsgNode::leaf(Primitive::block(min, max))
}

/// Rasterizes lid text in the cap-bottom-at-zero frame, mirrored along X.
///
/// Engraved text spans from just below the outer face to the engraving
/// depth; embossed text stands below the outer face and reaches just into
/// the cap.
pub fn text_solid(
    params: &ResolvedParams,
    text: &TextSpec,
    rasterizer: &TextRasterizer,
) -> MeshResult<Option<CsgNode>> {
    let (z_min, z_max) = match text.style {
        TextStyle::Engraved => (-CUTTER_OVERSHOOT, text.depth),
        TextStyle::Embossed => (-text.depth, CUTTER_OVERSHOOT),
    };
    let request = TextRequest::new(&text.text, params.width, params.depth, text.size, z_min, z_max)
        .mirrored(true);
    rasterizer.rasterize(&request)
}

/// The lid as a boolean solid, optionally combined with text.
pub fn lid_tree(params: &ResolvedParams, lid: &LidSpec, text: Option<(CsgNode, TextStyle)>) -> CsgTree {
    let o = CUTTER_OVERSHOOT;
    let wall = params.wall;
    let (hw, hd) = (params.half_width(), params.half_depth());
    let lip = LipOutline::new(params, lid);
    let top = if lip.exists() { wall + lip.height } else { wall };

    let mut cutters = Vec::new();
    if lip.exists() {
        let above_cap = |min: DVec2, max: DVec2| block(min.extend(wall), max.extend(top + o));
        let outside = DVec2::new(hw + o, hd + o);

        // Everything above the cap outside the lip
        cutters.push(CsgNode::subtract(
            above_cap(-outside, outside),
            block((-lip.outer).extend(wall - o), lip.outer.extend(top + 2.0 * o)),
        ));
        if lip.is_hollow() {
            cutters.push(above_cap(-lip.inner, lip.inner));
        }
        if params.hinge.is_some() {
            cutters.push(above_cap(DVec2::new(-outside.x, 0.0), outside));
        }

        let n = lip.notch_half_width;
        for d in params.dividers_x.iter().map(|d| LidFrame::mirror_x(*d)) {
            cutters.push(above_cap(DVec2::new(d - n, -outside.y), DVec2::new(d + n, outside.y)));
        }
        for d in &params.dividers_y {
            cutters.push(above_cap(DVec2::new(-outside.x, d - n), DVec2::new(outside.x, d + n)));
        }
    }
    if params.chamfer > 0.0 {
        cutters.extend(corner_prisms(hw, hd, params.chamfer, top));
    }

    let body = block(DVec3::new(-hw, -hd, 0.0), DVec3::new(hw, hd, top)).subtract_all(cutters);
    let root = match text {
        Some((solid, TextStyle::Engraved)) => CsgNode::subtract(body, solid),
        Some((solid, TextStyle::Embossed)) => CsgNode::union(body, solid),
        None => body,
    };

    debug!(leaves = root.leaf_count(), depth = root.depth(), "lid csg tree");
    CsgTree::new(root).with_transform(DMat4::from_translation(DVec3::new(0.0, 0.0, -wall)))
}

/// Triangular prisms removing the four vertical corners.
///
/// Each hypotenuse lies on the chamfer line; the other two sides sit outside
/// the lid by the cutter overshoot.
fn corner_prisms(hw: f64, hd: f64, chamfer: f64, top: f64) -> Vec<CsgNode> {
    let o = CUTTER_OVERSHOOT;
    let corner = [
        DVec2::new(hw - chamfer - o, hd + o),
        DVec2::new(hw + o, hd - chamfer - o),
        DVec2::new(hw + o, hd + o),
    ];
    [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)]
        .into_iter()
        .map(|(sx, sy)| {
            let sign = DVec2::new(sx, sy);
            let mut outline: Vec<DVec2> = corner.iter().map(|p| *p * sign).collect();
            if sx * sy < 0.0 {
                outline.reverse();
            }
            CsgNode::leaf(Primitive::Extrusion {
                outline,
                z_min: -o,
                z_max: top + o,
            })
        })
        .collect()
}

/// Builds the lid with text through the CSG engine.
pub fn build_text_lid(
    params: &ResolvedParams,
    lid: &LidSpec,
    text: CsgNode,
    style: TextStyle,
) -> MeshResult<Mesh> {
    lid_tree(params, lid, Some((text, style))).realize()
}
