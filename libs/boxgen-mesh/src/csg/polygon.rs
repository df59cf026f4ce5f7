//! # Polygon for BSP Operations
//!
//! Convex polygon carrying its supporting plane, with splitting support.
//! Pieces produced by a split keep the parent plane, so long chains of
//! splits never accumulate normal drift.

use glam::DVec3;

use super::plane::{Plane, Side};

/// A convex polygon with its plane.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgPolygon {
    vertices: Vec<DVec3>,
    plane: Plane,
}

/// Where a polygon ends up relative to a splitting plane.
#[derive(Debug, Clone, PartialEq)]
pub enum Placement {
    /// In the plane, facing the same way.
    CoplanarFront(CsgPolygon),
    /// In the plane, facing the other way.
    CoplanarBack(CsgPolygon),
    Front(CsgPolygon),
    Back(CsgPolygon),
    /// Cut in two; either piece may vanish when it has fewer than three
    /// vertices.
    Spanning {
        front: Option<CsgPolygon>,
        back: Option<CsgPolygon>,
    },
}

impl CsgPolygon {
    /// Creates a polygon, or `None` if the vertices span no area.
    pub fn new(vertices: Vec<DVec3>) -> Option<Self> {
        let plane = Plane::from_vertices(&vertices)?;
        Some(Self { vertices, plane })
    }

    /// Vertices in counter-clockwise order seen from the front.
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Supporting plane.
    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    /// Reverses winding and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }

    /// Classifies the polygon against `plane`, splitting it if it spans.
    pub fn split(self, plane: &Plane) -> Placement {
        let sides: Vec<Side> = self.vertices.iter().map(|v| plane.side_of(*v)).collect();
        let front = sides.contains(&Side::Front);
        let back = sides.contains(&Side::Back);

        match (front, back) {
            (false, false) => {
                if self.plane.normal.dot(plane.normal) > 0.0 {
                    Placement::CoplanarFront(self)
                } else {
                    Placement::CoplanarBack(self)
                }
            }
            (true, false) => Placement::Front(self),
            (false, true) => Placement::Back(self),
            (true, true) => {
                let n = self.vertices.len();
                let mut front_vertices = Vec::with_capacity(n + 1);
                let mut back_vertices = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (vi, vj) = (self.vertices[i], self.vertices[j]);
                    let (si, sj) = (sides[i], sides[j]);

                    if si != Side::Back {
                        front_vertices.push(vi);
                    }
                    if si != Side::Front {
                        back_vertices.push(vi);
                    }
                    if matches!((si, sj), (Side::Front, Side::Back) | (Side::Back, Side::Front)) {
                        let di = plane.signed_distance(vi);
                        let dj = plane.signed_distance(vj);
                        let crossing = vi.lerp(vj, di / (di - dj));
                        front_vertices.push(crossing);
                        back_vertices.push(crossing);
                    }
                }
                Placement::Spanning {
                    front: self.piece(front_vertices),
                    back: self.piece(back_vertices),
                }
            }
        }
    }

    fn piece(&self, vertices: Vec<DVec3>) -> Option<CsgPolygon> {
        (vertices.len() >= 3).then(|| CsgPolygon {
            vertices,
            plane: self.plane,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(z: f64) -> CsgPolygon {
        CsgPolygon::new(vec![
            DVec3::new(0.0, 0.0, z),
            DVec3::new(1.0, 0.0, z),
            DVec3::new(0.0, 1.0, z),
        ])
        .unwrap()
    }

    fn z_plane() -> Plane {
        Plane {
            normal: DVec3::Z,
            w: 0.0,
        }
    }

    #[test]
    fn test_polygon_flip() {
        let mut poly = triangle(0.0);
        poly.flip();
        assert_eq!(poly.plane().normal, -DVec3::Z);
        assert_eq!(poly.vertices()[0], DVec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_polygon_front_back() {
        assert!(matches!(triangle(1.0).split(&z_plane()), Placement::Front(_)));
        assert!(matches!(triangle(-1.0).split(&z_plane()), Placement::Back(_)));
    }

    #[test]
    fn test_polygon_coplanar_orientation() {
        assert!(matches!(triangle(0.0).split(&z_plane()), Placement::CoplanarFront(_)));
        let mut flipped = triangle(0.0);
        flipped.flip();
        assert!(matches!(flipped.split(&z_plane()), Placement::CoplanarBack(_)));
    }

    #[test]
    fn test_polygon_split_spanning() {
        let poly = CsgPolygon::new(vec![
            DVec3::new(0.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, -1.0),
            DVec3::new(1.0, 0.0, 1.0),
            DVec3::new(0.0, 0.0, 1.0),
        ])
        .unwrap();
        let original = *poly.plane();
        match poly.split(&z_plane()) {
            Placement::Spanning {
                front: Some(front),
                back: Some(back),
            } => {
                assert_eq!(front.vertices().len(), 4);
                assert_eq!(back.vertices().len(), 4);
                assert_eq!(*front.plane(), original);
                assert!(front.vertices().iter().all(|v| v.z >= 0.0));
                assert!(back.vertices().iter().all(|v| v.z <= 0.0));
            }
            other => panic!("expected a two-piece split, got {other:?}"),
        }
    }

    #[test]
    fn test_polygon_rejects_degenerate() {
        assert!(CsgPolygon::new(vec![DVec3::ZERO, DVec3::X, DVec3::X]).is_none());
    }
}
