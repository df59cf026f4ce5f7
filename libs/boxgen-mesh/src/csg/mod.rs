//! # Boolean Operations (CSG)
//!
//! Constructive solid geometry over a small primitive set, realized with BSP
//! trees. Only the lid-with-text path and the hinge knuckles use it; the box
//! and plain lid are built directly.
//!
//! ## Algorithm
//!
//! Based on the csg.js algorithm by Evan Wallace:
//! - Union: A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A); B.invert(); A.build(B)
//! - Subtract: A.invert(); A.clipTo(B); B.clipTo(A); B.invert(); B.clipTo(A);
//!   B.invert(); A.build(B); A.invert()
//!
//! Operands whose bounding boxes do not touch skip the BSP work entirely:
//! a union concatenates them and a subtraction returns the left operand.
//!
//! The realized polygons are then sealed (see [`seal`]): BSP splits leave
//! T-junctions, and welding plus edge splitting closes them again.
//!
//! ## Example
//!
//! ```rust
//! use boxgen_mesh::csg::{CsgNode, CsgTree, Primitive};
//! use glam::DVec3;
//!
//! let plate = CsgNode::leaf(Primitive::block(DVec3::ZERO, DVec3::new(10.0, 10.0, 2.0)));
//! let hole = CsgNode::leaf(Primitive::block(
//!     DVec3::new(4.0, 4.0, -1.0),
//!     DVec3::new(6.0, 6.0, 3.0),
//! ));
//! let mesh = CsgTree::new(CsgNode::subtract(plate, hole)).realize().unwrap();
//! assert!(!mesh.is_empty());
//! ```

mod bsp;
mod plane;
mod polygon;
mod primitives;
mod seal;


pub use primitives::{Axis, Primitive};

use glam::DMat4;
use tracing::debug;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{BoundingBox, Mesh};
use bsp::BspTree;
use polygon::CsgPolygon;

// =============================================================================
// TREE
// =============================================================================

/// Boolean operation of a binary node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CsgOp {
    /// A ∪ B
    Union,
    /// A − B
    Subtract,
}

impl CsgOp {
    /// Returns the operation name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            CsgOp::Union => "union",
            CsgOp::Subtract => "subtract",
        }
    }
}

/// A node of a boolean solid.
#[derive(Debug, Clone, PartialEq)]
pub enum CsgNode {
    Leaf(Primitive),
    Binary {
        op: CsgOp,
        left: Box<CsgNode>,
        right: Box<CsgNode>,
    },
}

impl CsgNode {
    /// Wraps a primitive.
    pub fn leaf(primitive: Primitive) -> Self {
        CsgNode::Leaf(primitive)
    }

    /// `left ∪ right`.
    pub fn union(left: CsgNode, right: CsgNode) -> Self {
        CsgNode::Binary {
            op: CsgOp::Union,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// `left − right`.
    pub fn subtract(left: CsgNode, right: CsgNode) -> Self {
        CsgNode::Binary {
            op: CsgOp::Subtract,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Subtracts every cutter in turn, left to right.
    pub fn subtract_all(self, cutters: impl IntoIterator<Item = CsgNode>) -> Self {
        cutters.into_iter().fold(self, CsgNode::subtract)
    }

    /// Conservative bounds: a subtraction keeps its left operand's box.
    pub fn bounds(&self) -> BoundingBox {
        match self {
            CsgNode::Leaf(primitive) => primitive.bounds(),
            CsgNode::Binary {
                op: CsgOp::Union,
                left,
                right,
            } => left.bounds().union(&right.bounds()),
            CsgNode::Binary {
                op: CsgOp::Subtract,
                left,
                ..
            } => left.bounds(),
        }
    }

    /// Number of primitives in the tree.
    pub fn leaf_count(&self) -> usize {
        match self {
            CsgNode::Leaf(_) => 1,
            CsgNode::Binary { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Number of binary levels above the deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            CsgNode::Leaf(_) => 0,
            CsgNode::Binary { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

/// Unions solids pairwise in rounds (1+2, 3+4, ...) until one remains.
///
/// `n` solids give a tree of depth ⌈log2 n⌉ instead of a chain of `n - 1`
/// unions, so each BSP merge sees operands of similar size.
pub fn balanced_union(nodes: Vec<CsgNode>) -> Option<CsgNode> {
    let mut level = nodes;
    while level.len() > 1 {
        let mut next = Vec::with_capacity(level.len().div_ceil(2));
        let mut pending = level.into_iter();
        while let Some(left) = pending.next() {
            match pending.next() {
                Some(right) => next.push(CsgNode::union(left, right)),
                None => next.push(left),
            }
        }
        level = next;
    }
    level.pop()
}

/// A boolean solid with the transform applied once to its realized mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgTree {
    pub root: CsgNode,
    pub transform: Option<DMat4>,
}

impl CsgTree {
    /// Creates a tree without a residual transform.
    pub fn new(root: CsgNode) -> Self {
        Self {
            root,
            transform: None,
        }
    }

    /// Sets the residual transform.
    pub fn with_transform(mut self, matrix: DMat4) -> Self {
        self.transform = Some(matrix);
        self
    }

    /// Evaluates the tree into a sealed mesh carrying the residual transform.
    ///
    /// # Errors
    ///
    /// Propagates primitive errors and returns [`MeshError::BooleanFailed`]
    /// if the result is empty, contains non-finite coordinates or fails
    /// [`Mesh::validate`] after sealing.
    pub fn realize(&self) -> MeshResult<Mesh> {
        let polygons = evaluate(&self.root)?;
        if polygons.is_empty() {
            return Err(MeshError::boolean_failed("result has no faces"));
        }
        if polygons
            .iter()
            .any(|p| p.vertices().iter().any(|v| !v.is_finite()))
        {
            return Err(MeshError::boolean_failed("result has non-finite vertices"));
        }

        debug!(
            leaves = self.root.leaf_count(),
            depth = self.root.depth(),
            polygons = polygons.len(),
            "csg tree realized"
        );
        let mesh = Mesh::from_polygons(seal::seal(polygons));
        if mesh.is_empty() {
            return Err(MeshError::boolean_failed("result collapsed while sealing"));
        }
        mesh.validate()
            .map_err(|e| MeshError::boolean_failed(format!("sealed result is invalid: {e}")))?;
        Ok(match self.transform {
            Some(matrix) => mesh.with_residual_transform(matrix),
            None => mesh,
        })
    }
}

// =============================================================================
// INTERPRETER
// =============================================================================

/// Realizes a node into polygons.
///
/// Recursion depth equals the tree depth, which stays small: the lid chain
/// is a handful of cutters and text prisms are merged by [`balanced_union`].
fn evaluate(node: &CsgNode) -> MeshResult<Vec<CsgPolygon>> {
    match node {
        CsgNode::Leaf(primitive) => primitive.polygons(),
        CsgNode::Binary { op, left, right } => {
            let disjoint = !left.bounds().overlaps(&right.bounds(), 0.0);
            match (op, disjoint) {
                (CsgOp::Subtract, true) => {
                    debug!("subtract operands disjoint; keeping left operand");
                    evaluate(left)
                }
                (CsgOp::Union, true) => {
                    let mut polygons = evaluate(left)?;
                    polygons.extend(evaluate(right)?);
                    Ok(polygons)
                }
                (CsgOp::Union, false) => Ok(union(evaluate(left)?, evaluate(right)?)),
                (CsgOp::Subtract, false) => Ok(subtract(evaluate(left)?, evaluate(right)?)),
            }
        }
    }
}

fn union(a: Vec<CsgPolygon>, b: Vec<CsgPolygon>) -> Vec<CsgPolygon> {
    if a.is_empty() {
        return b;
    }
    if b.is_empty() {
        return a;
    }

    let mut a = BspTree::new(a);
    let mut b = BspTree::new(b);
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.into_polygons());
    a.into_polygons()
}

fn subtract(a: Vec<CsgPolygon>, b: Vec<CsgPolygon>) -> Vec<CsgPolygon> {
    if a.is_empty() || b.is_empty() {
        return a;
    }

    let mut a = BspTree::new(a);
    let mut b = BspTree::new(b);
    a.invert();
    a.clip_to(&b);
    b.clip_to(&a);
    b.invert();
    b.clip_to(&a);
    b.invert();
    a.build(b.into_polygons());
    a.invert();
    a.into_polygons()
}
