//! # Hinge Generator
//!
//! Barrel hinges along the back edge. Each hinge position has two box
//! knuckles flanking one lid knuckle, all threaded on one pin.
//!
//! A knuckle is an arm fused to a barrel with the bore removed:
//! `(arm ∪ barrel) − bore`. The barrel is shifted along its axis by `R/2`
//! relative to the arm and the arm reaches the barrel axis, so the two fuse
//! over a solid joint. A knuckle's X footprint is its width plus that shift.
//!
//! The shared axis runs along X at `y = D/2 + R + clearance`,
//! `z = H + wall - R`: the barrels stand off the back wall by the lid fit
//! tolerance and the top of the box barrels is flush with the outer face of
//! the closed lid.
//!
//! Box knuckles and pins are emitted in the box frame; lid knuckles are
//! built assembled and mapped into the lid print frame.

use config::constants::{
    hinge_offsets, CUTTER_OVERSHOOT, DEFAULT_SEGMENTS, GEOMETRY_EPSILON, HINGE_KNUCKLE_GAP,
    HINGE_KNUCKLE_WIDTH_FACTOR, HINGE_PIN_OVERHANG,
};
use glam::{DVec2, DVec3};
use tracing::debug;

use crate::builder::LidFrame;
use crate::csg::{Axis, CsgNode, CsgTree, Primitive};
use crate::error::{MeshError, MeshResult};
use crate::export::PartKind;
use crate::mesh::Mesh;
use crate::params::{HingeSpec, ResolvedParams};

/// Hinge centres along X for `count` hinges on a box `width` wide.
pub fn hinge_centers(count: u32, width: f64) -> Vec<f64> {
    hinge_offsets(count).iter().map(|f| f * width).collect()
}

/// Resolved hinge dimensions in the box frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HingeLayout {
    /// Pin axis position in the YZ plane.
    pub axis: DVec2,
    pub barrel_radius: f64,
    pub bore_radius: f64,
    pub pin_radius: f64,
    /// Barrel length along X.
    pub knuckle_width: f64,
    /// Axial offset of each barrel from its arm.
    pub barrel_shift: f64,
    /// Centre of each hinge position along X.
    pub centers: Vec<f64>,
    box_height: f64,
    wall: f64,
    back: f64,
}

impl HingeLayout {
    /// Lays out the hinges described by `params`.
    ///
    /// Knuckles are 1.5 barrel diameters wide, shrunk so the three knuckle
    /// footprints of each hinge and their gaps stay clear of the box ends
    /// and of the neighbouring hinge.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::DegenerateGeometry`] if no knuckle width fits.
    pub fn new(params: &ResolvedParams, hinge: &HingeSpec) -> MeshResult<Self> {
        let r = hinge.barrel_radius;
        let centers = hinge_centers(hinge.count, params.width);
        let half_span = centers
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let to_end = params.half_width() - c.abs();
                let to_next = centers.get(i + 1).map_or(f64::INFINITY, |next| (next - c) / 2.0);
                to_end.min(to_next)
            })
            .fold(f64::INFINITY, f64::min);
        let barrel_shift = r / 2.0;
        let knuckle_width = (HINGE_KNUCKLE_WIDTH_FACTOR * 2.0 * r)
            .min((2.0 * half_span - 4.0 * HINGE_KNUCKLE_GAP) / 3.0 - barrel_shift);
        if knuckle_width <= GEOMETRY_EPSILON {
            return Err(MeshError::degenerate(format!(
                "{} hinges do not fit on a box {} wide",
                hinge.count, params.width
            )));
        }

        Ok(Self {
            axis: DVec2::new(
                params.half_depth() + r + hinge.clearance,
                params.height + params.wall - r,
            ),
            barrel_radius: r,
            bore_radius: hinge.bore_radius,
            pin_radius: hinge.pin_radius,
            knuckle_width,
            barrel_shift,
            centers,
            box_height: params.height,
            wall: params.wall,
            back: params.half_depth(),
        })
    }

    /// X extent of one knuckle: barrel length plus the barrel shift.
    pub fn footprint(&self) -> f64 {
        self.knuckle_width + self.barrel_shift
    }

    /// X extents of the two box knuckles of the hinge centred at `center`.
    pub fn box_knuckle_spans(&self, center: f64) -> [(f64, f64); 2] {
        let (f, gap) = (self.footprint(), HINGE_KNUCKLE_GAP);
        [
            (center - 1.5 * f - gap, center - 0.5 * f - gap),
            (center + 0.5 * f + gap, center + 1.5 * f + gap),
        ]
    }

    /// X extent of the lid knuckle of the hinge centred at `center`.
    pub fn lid_knuckle_span(&self, center: f64) -> (f64, f64) {
        (center - 0.5 * self.footprint(), center + 0.5 * self.footprint())
    }

    /// Pin length: all three footprints, both gaps and an overhang at each
    /// end.
    pub fn pin_length(&self) -> f64 {
        3.0 * self.footprint() + 2.0 * HINGE_KNUCKLE_GAP + 2.0 * HINGE_PIN_OVERHANG
    }

    fn cylinder(&self, center_x: f64, radius: f64, length: f64) -> CsgNode {
        CsgNode::leaf(Primitive::Cylinder {
            axis: Axis::X,
            center: DVec3::new(center_x, self.axis.x, self.axis.y),
            radius,
            length,
            segments: DEFAULT_SEGMENTS,
        })
    }

    /// `(arm ∪ barrel) − bore` over `span`, arm between `z_lo` and `z_hi`.
    ///
    /// The arm starts at `x0`, the barrel ends at `x1`; the bore runs
    /// through the whole footprint.
    fn knuckle(&self, (x0, x1): (f64, f64), z_lo: f64, z_hi: f64) -> CsgNode {
        let arm = CsgNode::leaf(Primitive::block(
            DVec3::new(x0, self.back - self.wall, z_lo),
            DVec3::new(x1 - self.barrel_shift, self.axis.x, z_hi),
        ));
        let barrel = self.cylinder(
            (x0 + self.barrel_shift + x1) / 2.0,
            self.barrel_radius,
            x1 - x0 - self.barrel_shift,
        );
        CsgNode::subtract(
            CsgNode::union(arm, barrel),
            self.cylinder((x0 + x1) / 2.0, self.bore_radius, x1 - x0 + 2.0 * CUTTER_OVERSHOOT),
        )
    }

    /// A box knuckle: the arm hangs from the wall top down to the barrel's
    /// lowest point.
    pub fn box_knuckle(&self, span: (f64, f64)) -> CsgNode {
        self.knuckle(span, self.axis.y - self.barrel_radius, self.box_height)
    }

    /// A lid knuckle in assembled pose: the arm spans the cap thickness.
    pub fn lid_knuckle(&self, span: (f64, f64)) -> CsgNode {
        self.knuckle(span, self.box_height, self.box_height + self.wall)
    }

    /// The pin of the hinge centred at `center`.
    pub fn pin(&self, center: f64) -> CsgNode {
        self.cylinder(center, self.pin_radius, self.pin_length())
    }
}

/// Hinge geometry for one box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HingeSet {
    /// Box knuckles, box frame.
    pub box_knuckles: Vec<Mesh>,
    /// Lid knuckles, lid print frame.
    pub lid_knuckles: Vec<Mesh>,
    /// One pin per hinge position, box frame.
    pub pins: Vec<Mesh>,
}

impl HingeSet {
    /// All box knuckles as one mesh.
    pub fn box_mesh(&self) -> Mesh {
        merge_all(&self.box_knuckles)
    }

    /// All lid knuckles as one mesh.
    pub fn lid_mesh(&self) -> Mesh {
        merge_all(&self.lid_knuckles)
    }

    /// All pins as one mesh.
    pub fn pin_mesh(&self) -> Mesh {
        merge_all(&self.pins)
    }
}

fn merge_all(meshes: &[Mesh]) -> Mesh {
    meshes.iter().fold(Mesh::new(), |mut all, mesh| {
        all.merge(mesh);
        all
    })
}

/// Which hinge pieces to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HingePieces {
    pub box_knuckles: bool,
    pub lid_knuckles: bool,
    pub pins: bool,
}

impl HingePieces {
    pub const ALL: Self = Self {
        box_knuckles: true,
        lid_knuckles: true,
        pins: true,
    };

    /// The pieces exported together with `kind`.
    pub fn for_part(kind: PartKind) -> Self {
        Self {
            box_knuckles: kind == PartKind::Box,
            lid_knuckles: kind == PartKind::Lid,
            pins: kind == PartKind::HingePin,
        }
    }
}

/// Builds knuckles and pins, or `None` when the record has no hinge.
///
/// # Errors
///
/// Returns an error if the knuckles do not fit or a boolean fails.
pub fn build_hinges(params: &ResolvedParams) -> MeshResult<Option<HingeSet>> {
    build_hinge_pieces(params, HingePieces::ALL)
}

/// Builds the selected hinge pieces; the others stay empty.
///
/// # Errors
///
/// See [`build_hinges`].
pub fn build_hinge_pieces(params: &ResolvedParams, pieces: HingePieces) -> MeshResult<Option<HingeSet>> {
    let Some(hinge) = params.hinge.as_ref() else {
        return Ok(None);
    };
    let layout = HingeLayout::new(params, hinge)?;
    let to_print = LidFrame::new(params.height).to_print();

    let mut set = HingeSet::default();
    for &center in &layout.centers {
        if pieces.box_knuckles {
            for span in layout.box_knuckle_spans(center) {
                set.box_knuckles
                    .push(CsgTree::new(layout.box_knuckle(span)).realize()?);
            }
        }
        if pieces.lid_knuckles {
            let lid = CsgTree::new(layout.lid_knuckle(layout.lid_knuckle_span(center)))
                .with_transform(to_print)
                .realize()?;
            set.lid_knuckles.push(lid);
        }
        if pieces.pins {
            set.pins.push(CsgTree::new(layout.pin(center)).realize()?);
        }
    }

    debug!(
        ?pieces,
        hinges = layout.centers.len(),
        knuckle_width = layout.knuckle_width,
        axis_y = layout.axis.x,
        axis_z = layout.axis.y,
        "hinges built"
    );
    Ok(Some(set))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::BoundingBox;
    use crate::params::BoxParams;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn hinged(params: BoxParams) -> ResolvedParams {
        BoxParams {
            include_hinge: true,
            ..params
        }
        .resolve()
        .unwrap()
    }

    fn layout(params: &ResolvedParams) -> HingeLayout {
        HingeLayout::new(params, params.hinge.as_ref().unwrap()).unwrap()
    }

    fn polygon_area(radius: f64) -> f64 {
        let n = DEFAULT_SEGMENTS as f64;
        n / 2.0 * radius * radius * (TAU / n).sin()
    }

    /// Bounds of `mesh` after mapping it through `matrix`.
    fn mapped_bounds(mesh: &Mesh, matrix: glam::DMat4) -> BoundingBox {
        let points = mesh
            .output_polygons()
            .into_iter()
            .flat_map(|p| p.vertices().to_vec())
            .map(|v| matrix.transform_point3(v));
        BoundingBox::from_points(points).unwrap()
    }

    // =========================================================================
    // LAYOUT TESTS
    // =========================================================================

    #[test]
    fn test_hinge_centers() {
        assert_eq!(hinge_centers(1, 80.0), vec![0.0]);
        assert_eq!(hinge_centers(2, 100.0), vec![-30.0, 30.0]);
        assert_eq!(hinge_centers(3, 100.0), vec![-25.0, 0.0, 25.0]);
    }

    #[test]
    fn test_axis_position() {
        let params = hinged(BoxParams::default());
        let layout = layout(&params);
        // Diameter 6 on a 2 mm wall, standing 0.3 mm off the back wall
        assert!(layout.axis.abs_diff_eq(DVec2::new(33.3, 39.0), 1e-12));
        assert_eq!(layout.barrel_radius, 3.0);
        assert_eq!(layout.barrel_shift, 1.5);
    }

    #[test]
    fn test_knuckle_width_default_and_shrunk() {
        let single = hinged(BoxParams {
            hinge_count: 1,
            ..BoxParams::default()
        });
        assert_relative_eq!(layout(&single).knuckle_width, 9.0);

        // Two hinges at ±24 leave 16 mm on either side of each centre
        let params = hinged(BoxParams::default());
        let kw = layout(&params).knuckle_width;
        assert_relative_eq!(kw, (32.0 - 4.0 * HINGE_KNUCKLE_GAP) / 3.0 - 1.5, epsilon = 1e-12);

        let narrow = hinged(BoxParams {
            width: 30.0,
            hinge_count: 3,
            ..BoxParams::default()
        });
        // Three hinges 7.5 apart leave 3.75 on either side of each centre
        let kw = layout(&narrow).knuckle_width;
        assert_relative_eq!(kw, (7.5 - 4.0 * HINGE_KNUCKLE_GAP) / 3.0 - 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_knuckles_do_not_overlap() {
        let params = hinged(BoxParams {
            hinge_count: 3,
            ..BoxParams::default()
        });
        let layout = layout(&params);
        for &c in &layout.centers {
            let [left, right] = layout.box_knuckle_spans(c);
            let middle = layout.lid_knuckle_span(c);
            assert_relative_eq!(middle.0 - left.1, HINGE_KNUCKLE_GAP, epsilon = 1e-12);
            assert_relative_eq!(right.0 - middle.1, HINGE_KNUCKLE_GAP, epsilon = 1e-12);
            assert!(left.0 >= -params.half_width());
            assert!(right.1 <= params.half_width());
        }
    }

    #[test]
    fn test_hinge_too_narrow_rejected() {
        let params = hinged(BoxParams {
            width: 4.5,
            wall_thickness: 2.0,
            hinge_count: 3,
            ..BoxParams::default()
        });
        assert!(matches!(
            HingeLayout::new(&params, params.hinge.as_ref().unwrap()),
            Err(MeshError::DegenerateGeometry { .. })
        ));
    }

    // =========================================================================
    // GEOMETRY TESTS
    // =========================================================================

    #[test]
    fn test_no_hinge_without_request() {
        let params = BoxParams::default().resolve().unwrap();
        assert!(build_hinges(&params).unwrap().is_none());
    }

    #[test]
    fn test_selected_pieces_only() {
        let params = hinged(BoxParams {
            hinge_count: 2,
            ..BoxParams::default()
        });
        let set = build_hinge_pieces(&params, HingePieces::for_part(PartKind::HingePin))
            .unwrap()
            .unwrap();
        assert!(set.box_knuckles.is_empty());
        assert!(set.lid_knuckles.is_empty());
        assert_eq!(set.pins, build_hinges(&params).unwrap().unwrap().pins);

        let set = build_hinge_pieces(&params, HingePieces::for_part(PartKind::Lid))
            .unwrap()
            .unwrap();
        assert_eq!(set.lid_knuckles.len(), 2);
        assert!(set.pins.is_empty());
    }

    #[test]
    fn test_hinge_set_counts() {
        let params = hinged(BoxParams {
            hinge_count: 3,
            ..BoxParams::default()
        });
        let set = build_hinges(&params).unwrap().unwrap();
        assert_eq!(set.box_knuckles.len(), 6);
        assert_eq!(set.lid_knuckles.len(), 3);
        assert_eq!(set.pins.len(), 3);
    }

    #[test]
    fn test_box_knuckle_bounds() {
        let params = hinged(BoxParams::default());
        let set = build_hinges(&params).unwrap().unwrap();
        let layout = layout(&params);
        let bounds = set.box_knuckles[0].bounding_box().unwrap();
        // Arm starts at the inner face of the back wall
        assert_relative_eq!(bounds.min.y, 28.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.y, 36.3, epsilon = 1e-9);
        // Arm at one end of the footprint, shifted barrel at the other
        let [span, _] = layout.box_knuckle_spans(layout.centers[0]);
        assert_relative_eq!(bounds.min.x, span.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.x, span.1, epsilon = 1e-9);
        assert_relative_eq!(span.1 - span.0, layout.knuckle_width + 1.5, epsilon = 1e-12);
        // Barrel top flush with the closed lid
        assert_relative_eq!(bounds.max.z, 42.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.min.z, 36.0, epsilon = 1e-9);
    }

    #[test]
    fn test_knuckle_volume_has_bore() {
        let params = hinged(BoxParams::default());
        let layout = layout(&params);
        let set = build_hinges(&params).unwrap().unwrap();
        let kw = layout.knuckle_width;
        let volume = set.box_knuckles[0].volume();
        let barrel = polygon_area(layout.barrel_radius) * kw;
        let bore = polygon_area(layout.bore_radius) * kw;
        assert!(volume > barrel - bore);
        assert!(volume < barrel - bore + 8.0 * 6.0 * layout.footprint());
    }

    #[test]
    fn test_lid_knuckle_in_print_frame() {
        let params = hinged(BoxParams::default());
        let set = build_hinges(&params).unwrap().unwrap();
        let bounds = set.lid_knuckles[0].bounding_box().unwrap();
        // Never below the cap bottom, never on the -Y side
        assert_relative_eq!(bounds.min.z, -2.0, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.z, 4.0, epsilon = 1e-9);
        assert!(bounds.min.y > 0.0);
    }

    #[test]
    fn test_lid_knuckle_aligns_with_box_knuckles() {
        let params = hinged(BoxParams::default());
        let layout = layout(&params);
        let set = build_hinges(&params).unwrap().unwrap();

        let to_box = LidFrame::new(params.height).to_box();
        let lid = mapped_bounds(&set.lid_knuckles[0], to_box);
        let boxed = set.box_knuckles[0].bounding_box().unwrap();

        let lid_axis = DVec2::new(lid.max.y - layout.barrel_radius, lid.max.z - layout.barrel_radius);
        let box_axis = DVec2::new(boxed.max.y - layout.barrel_radius, boxed.max.z - layout.barrel_radius);
        assert!(lid_axis.abs_diff_eq(box_axis, 1e-9));
        assert!(lid_axis.abs_diff_eq(layout.axis, 1e-9));

        // Mapped back, the lid knuckle sits between its two box knuckles
        let [left, right] = layout.box_knuckle_spans(layout.centers[0]);
        assert!(lid.min.x > left.1);
        assert!(lid.max.x < right.0);
    }

    #[test]
    fn test_pin_spans_all_knuckles() {
        let params = hinged(BoxParams::default());
        let layout = layout(&params);
        let set = build_hinges(&params).unwrap().unwrap();
        let pin = &set.pins[1];
        let bounds = pin.bounding_box().unwrap();
        let [left, right] = layout.box_knuckle_spans(layout.centers[1]);
        assert_relative_eq!(bounds.min.x, left.0 - HINGE_PIN_OVERHANG, epsilon = 1e-9);
        assert_relative_eq!(bounds.max.x, right.1 + HINGE_PIN_OVERHANG, epsilon = 1e-9);
        assert_relative_eq!(
            pin.volume(),
            polygon_area(layout.pin_radius) * layout.pin_length(),
            epsilon = 1e-9
        );
        assert!(layout.pin_radius < layout.bore_radius);
    }

    #[test]
    fn test_merged_meshes() {
        let params = hinged(BoxParams::default());
        let set = build_hinges(&params).unwrap().unwrap();
        let polygons: usize = set.pins.iter().map(Mesh::polygon_count).sum();
        assert_eq!(set.pin_mesh().polygon_count(), polygons);
        assert!(set.lid_mesh().residual_transform().is_none());
        assert_eq!(
            set.box_mesh().polygon_count(),
            set.box_knuckles.iter().map(Mesh::polygon_count).sum::<usize>()
        );
    }

    #[test]
    fn test_every_knuckle_and_pin_is_closed() {
        for count in 1..=3 {
            let params = hinged(BoxParams {
                hinge_count: count,
                ..BoxParams::default()
            });
            let set = build_hinges(&params).unwrap().unwrap();
            let meshes = set.box_knuckles.iter().chain(&set.lid_knuckles).chain(&set.pins);
            for (index, mesh) in meshes.enumerate() {
                let report = mesh.edge_report();
                assert!(report.is_closed(), "count {count}, mesh {index}: {report:?}");
            }
        }
    }

    #[test]
    fn test_barrels_clear_the_back_wall() {
        let params = hinged(BoxParams::default());
        let set = build_hinges(&params).unwrap().unwrap();
        let back = params.half_depth();
        let to_box = LidFrame::new(params.height).to_box();

        // Below the wall top only the barrels reach past the back wall
        let below_top = |mesh: &Mesh, matrix: glam::DMat4| -> Vec<DVec3> {
            mesh.output_polygons()
                .into_iter()
                .flat_map(|p| p.vertices().to_vec())
                .map(|v| matrix.transform_point3(v))
                .filter(|v| v.z < params.height - 1e-9 && v.y > back - 1e-9)
                .collect()
        };
        let lid = below_top(&set.lid_knuckles[0], to_box);
        assert!(!lid.is_empty());
        assert!(lid.iter().all(|v| v.y >= back + 0.3 - 1e-9));
    }
}
