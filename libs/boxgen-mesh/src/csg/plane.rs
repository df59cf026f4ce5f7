//! # Plane for BSP Operations
//!
//! Oriented plane with point classification.

use config::constants::PLANE_EPSILON;
use glam::DVec3;

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Side of a plane a point lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Within [`PLANE_EPSILON`] of the plane.
    Coplanar,
    /// Positive side.
    Front,
    /// Negative side.
    Back,
}

// =============================================================================
// PLANE
// =============================================================================

/// A plane `normal · p = w` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: DVec3,
    pub w: f64,
}

impl Plane {
    /// Plane of a vertex loop, using Newell's method for the normal.
    ///
    /// Returns `None` for loops with (near) zero area.
    pub fn from_vertices(vertices: &[DVec3]) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let mut normal = DVec3::ZERO;
        let mut centroid = DVec3::ZERO;
        for (i, current) in vertices.iter().enumerate() {
            let next = vertices[(i + 1) % vertices.len()];
            normal.x += (current.y - next.y) * (current.z + next.z);
            normal.y += (current.z - next.z) * (current.x + next.x);
            normal.z += (current.x - next.x) * (current.y + next.y);
            centroid += *current;
        }
        if normal.length() < PLANE_EPSILON {
            return None;
        }
        let normal = normal.normalize();
        let centroid = centroid / vertices.len() as f64;
        Some(Self {
            normal,
            w: normal.dot(centroid),
        })
    }

    /// The same plane facing the other way.
    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Signed distance; positive in front.
    pub fn signed_distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.w
    }

    /// Classifies a point against the plane.
    pub fn side_of(&self, point: DVec3) -> Side {
        let distance = self.signed_distance(point);
        if distance > PLANE_EPSILON {
            Side::Front
        } else if distance < -PLANE_EPSILON {
            Side::Back
        } else {
            Side::Coplanar
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_from_vertices() {
        let plane = Plane::from_vertices(&[
            DVec3::new(0.0, 0.0, 2.0),
            DVec3::new(1.0, 0.0, 2.0),
            DVec3::new(0.0, 1.0, 2.0),
        ])
        .unwrap();
        assert_eq!(plane.normal, DVec3::Z);
        assert!((plane.w - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_plane_ignores_collinear_leading_vertices() {
        let plane = Plane::from_vertices(&[
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(2.0, 0.0, 0.0),
            DVec3::new(2.0, 1.0, 0.0),
        ])
        .unwrap();
        assert_eq!(plane.normal, DVec3::Z);
    }

    #[test]
    fn test_plane_degenerate() {
        assert!(Plane::from_vertices(&[DVec3::ZERO, DVec3::X, DVec3::X * 2.0]).is_none());
    }

    #[test]
    fn test_plane_side_of() {
        let plane = Plane {
            normal: DVec3::Z,
            w: 0.0,
        };
        assert_eq!(plane.side_of(DVec3::Z), Side::Front);
        assert_eq!(plane.side_of(-DVec3::Z), Side::Back);
        assert_eq!(plane.side_of(DVec3::new(3.0, 4.0, 1e-7)), Side::Coplanar);
        assert_eq!(plane.flipped().side_of(DVec3::Z), Side::Back);
    }
}
