//! # CSG Primitives
//!
//! Leaf solids of a CSG tree: axis-aligned blocks, cylinders along a
//! principal axis and prisms extruded from a convex outline along Z.
//!
//! Every primitive is realized as a prism: an outline in a local `(u, v)`
//! plane swept along a local `w` axis, then mapped to world axes by a cyclic
//! permutation (a proper rotation, so winding stays outward).

use std::f64::consts::TAU;

use config::constants::{GEOMETRY_EPSILON, MIN_SEGMENTS};
use glam::{DVec2, DVec3};

use super::polygon::CsgPolygon;
use crate::error::{MeshError, MeshResult};
use crate::mesh::BoundingBox;

/// Principal axis of a cylinder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Maps local `(u, v, w)` with `w` along this axis to world coordinates.
    fn to_world(self, local: DVec3) -> DVec3 {
        match self {
            Axis::Z => local,
            Axis::X => DVec3::new(local.z, local.x, local.y),
            Axis::Y => DVec3::new(local.y, local.z, local.x),
        }
    }
}

/// A leaf solid.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned box between two corners.
    Block { min: DVec3, max: DVec3 },
    /// Regular polygonal cylinder centred on `center`.
    Cylinder {
        axis: Axis,
        center: DVec3,
        radius: f64,
        length: f64,
        segments: u32,
    },
    /// Convex counter-clockwise outline swept from `z_min` to `z_max`.
    Extrusion {
        outline: Vec<DVec2>,
        z_min: f64,
        z_max: f64,
    },
}

impl Primitive {
    /// Creates a block from two opposite corners in any order.
    pub fn block(a: DVec3, b: DVec3) -> Self {
        Primitive::Block {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Axis-aligned bounds.
    ///
    /// Cylinders report the bounds of the circumscribing round cylinder.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            Primitive::Block { min, max } => BoundingBox::new(*min, *max),
            Primitive::Cylinder {
                axis,
                center,
                radius,
                length,
                ..
            } => {
                let half = axis.to_world(DVec3::new(*radius, *radius, length / 2.0));
                BoundingBox::new(*center - half, *center + half)
            }
            Primitive::Extrusion {
                outline,
                z_min,
                z_max,
            } => {
                let (lo, hi) = outline.iter().fold(
                    (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
                    |(lo, hi), p| (lo.min(*p), hi.max(*p)),
                );
                BoundingBox::new(lo.extend(*z_min), hi.extend(*z_max))
            }
        }
    }

    /// Outward-facing polygons of the solid.
    ///
    /// # Errors
    ///
    /// Returns a degenerate-geometry error for empty extents, a radius or
    /// length that is not positive, fewer than three segments, or an outline
    /// that is not convex and counter-clockwise.
    pub fn polygons(&self) -> MeshResult<Vec<CsgPolygon>> {
        match self {
            Primitive::Block { min, max } => {
                let size = *max - *min;
                if size.min_element() <= 0.0 {
                    return Err(MeshError::degenerate(format!(
                        "block from {min} to {max} has no volume"
                    )));
                }
                let outline = [
                    DVec2::new(min.x, min.y),
                    DVec2::new(max.x, min.y),
                    DVec2::new(max.x, max.y),
                    DVec2::new(min.x, max.y),
                ];
                Ok(prism(&outline, min.z, max.z, |p| p))
            }
            Primitive::Cylinder {
                axis,
                center,
                radius,
                length,
                segments,
            } => {
                if *radius <= 0.0 || *length <= 0.0 {
                    return Err(MeshError::degenerate(format!(
                        "cylinder radius {radius} and length {length} must be positive"
                    )));
                }
                if *segments < MIN_SEGMENTS {
                    return Err(MeshError::degenerate(format!(
                        "cylinder needs at least {MIN_SEGMENTS} segments, got {segments}"
                    )));
                }
                let outline: Vec<DVec2> = (0..*segments)
                    .map(|k| {
                        let theta = TAU * k as f64 / *segments as f64;
                        DVec2::new(radius * theta.cos(), radius * theta.sin())
                    })
                    .collect();
                let half = length / 2.0;
                Ok(prism(&outline, -half, half, |p| *center + axis.to_world(p)))
            }
            Primitive::Extrusion {
                outline,
                z_min,
                z_max,
            } => {
                if z_max <= z_min {
                    return Err(MeshError::degenerate(format!(
                        "extrusion from z={z_min} to z={z_max} has no height"
                    )));
                }
                check_convex_ccw(outline)?;
                Ok(prism(outline, *z_min, *z_max, |p| p))
            }
        }
    }
}

/// Bottom, top and one side quad per outline edge.
fn prism(outline: &[DVec2], lo: f64, hi: f64, map: impl Fn(DVec3) -> DVec3) -> Vec<CsgPolygon> {
    let at = |p: DVec2, z: f64| map(p.extend(z));
    let n = outline.len();
    let mut faces: Vec<Vec<DVec3>> = Vec::with_capacity(n + 2);

    faces.push(outline.iter().rev().map(|p| at(*p, lo)).collect());
    faces.push(outline.iter().map(|p| at(*p, hi)).collect());
    for i in 0..n {
        let (a, b) = (outline[i], outline[(i + 1) % n]);
        faces.push(vec![at(a, lo), at(b, lo), at(b, hi), at(a, hi)]);
    }

    faces.into_iter().filter_map(CsgPolygon::new).collect()
}

fn check_convex_ccw(outline: &[DVec2]) -> MeshResult<()> {
    let n = outline.len();
    if n < 3 {
        return Err(MeshError::degenerate(format!(
            "extrusion outline needs 3 points, got {n}"
        )));
    }
    let mut area = 0.0;
    for i in 0..n {
        let (a, b, c) = (outline[i], outline[(i + 1) % n], outline[(i + 2) % n]);
        area += a.perp_dot(b);
        if (b - a).perp_dot(c - b) < -GEOMETRY_EPSILON {
            return Err(MeshError::degenerate("extrusion outline is not convex"));
        }
    }
    if area <= 0.0 {
        return Err(MeshError::degenerate(
            "extrusion outline must be counter-clockwise",
        ));
    }
    Ok(())
}
