//! # BSP Tree
//!
//! Binary space partitioning tree for CSG boolean operations, following the
//! csg.js algorithm by Evan Wallace.
//!
//! ## Layout
//!
//! Nodes live in one arena (`Vec<BspNode>`) and refer to their children by
//! index. Every node in the arena is reachable from the root, so whole-tree
//! passes (`clip_to`, `invert`, `into_polygons`) are plain loops over the
//! arena and only `build` and `clip_polygons` need an explicit work stack.
//! Nothing recurses, which keeps deep trees safe on the small WASM stack.
//!
//! ## Operations
//!
//! - `build`: insert polygons, splitting them by the node planes
//! - `clip_polygons`: remove the parts of polygons inside this solid
//! - `clip_to`: clip this tree's polygons against another tree
//! - `invert`: turn the solid inside out

use super::plane::Plane;
use super::polygon::{CsgPolygon, Placement};

#[derive(Debug, Clone, Default)]
struct BspNode {
    plane: Option<Plane>,
    /// Polygons lying in `plane`.
    polygons: Vec<CsgPolygon>,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree over convex polygons.
///
/// # Example
///
/// ```rust,ignore
/// let mut tree = BspTree::new(block_polygons);
/// tree.invert();
/// let outside = tree.clip_polygons(other_polygons);
/// ```
#[derive(Debug, Clone)]
pub struct BspTree {
    nodes: Vec<BspNode>,
}

impl BspTree {
    /// Builds a tree from polygons.
    pub fn new(polygons: Vec<CsgPolygon>) -> Self {
        let mut tree = Self {
            nodes: vec![BspNode::default()],
        };
        tree.build(polygons);
        tree
    }

    /// Inserts polygons into the existing tree.
    ///
    /// The first polygon reaching an empty node provides its plane; coplanar
    /// polygons of either orientation are stored at that node.
    pub fn build(&mut self, polygons: Vec<CsgPolygon>) {
        let mut stack = vec![(0usize, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            let Some(first) = polygons.first() else {
                continue;
            };
            let plane = *self.nodes[index].plane.get_or_insert(*first.plane());

            let estimated = polygons.len() / 2 + 1;
            let mut front = Vec::with_capacity(estimated);
            let mut back = Vec::with_capacity(estimated);
            for polygon in polygons {
                match polygon.split(&plane) {
                    Placement::CoplanarFront(p) | Placement::CoplanarBack(p) => {
                        self.nodes[index].polygons.push(p)
                    }
                    Placement::Front(p) => front.push(p),
                    Placement::Back(p) => back.push(p),
                    Placement::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }

            if !front.is_empty() {
                let child = self.child(index, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(index, false);
                stack.push((child, back));
            }
        }
    }

    /// Index of the front or back child, creating it if missing.
    fn child(&mut self, index: usize, front: bool) -> usize {
        let existing = if front {
            self.nodes[index].front
        } else {
            self.nodes[index].back
        };
        if let Some(child) = existing {
            return child;
        }

        let child = self.nodes.len();
        self.nodes.push(BspNode::default());
        if front {
            self.nodes[index].front = Some(child);
        } else {
            self.nodes[index].back = Some(child);
        }
        child
    }

    /// Returns the parts of `polygons` outside this tree's solid.
    pub fn clip_polygons(&self, polygons: Vec<CsgPolygon>) -> Vec<CsgPolygon> {
        let mut result = Vec::with_capacity(polygons.len());
        let mut stack = vec![(0usize, polygons)];

        while let Some((index, polygons)) = stack.pop() {
            let node = &self.nodes[index];
            let Some(plane) = node.plane else {
                result.extend(polygons);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                match polygon.split(&plane) {
                    Placement::CoplanarFront(p) | Placement::Front(p) => front.push(p),
                    Placement::CoplanarBack(p) | Placement::Back(p) => back.push(p),
                    Placement::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }

            match node.front {
                Some(child) => stack.push((child, front)),
                None => result.extend(front),
            }
            // Behind a leaf plane is inside the solid
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }

        result
    }

    /// Removes the parts of this tree's polygons inside `other`.
    pub fn clip_to(&mut self, other: &BspTree) {
        for node in &mut self.nodes {
            if !node.polygons.is_empty() {
                node.polygons = other.clip_polygons(std::mem::take(&mut node.polygons));
            }
        }
    }

    /// Turns the solid inside out.
    pub fn invert(&mut self) {
        for node in &mut self.nodes {
            for polygon in &mut node.polygons {
                polygon.flip();
            }
            node.plane = node.plane.map(|p| p.flipped());
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    /// Consumes the tree, returning its polygons in arena order.
    pub fn into_polygons(self) -> Vec<CsgPolygon> {
        self.nodes.into_iter().flat_map(|node| node.polygons).collect()
    }
}
