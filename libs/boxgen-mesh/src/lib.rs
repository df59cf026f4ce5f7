//! # Boxgen Mesh
//!
//! Geometry kernel for a parametric storage box: the box body with optional
//! dividers and chamfered corners, a lid with a sealing lip and optional
//! text, barrel hinges, and ASCII STL export.
//!
//! ## Architecture
//!
//! ```text
//! BoxParams → resolve → ResolvedParams
//!     ├─ builder::build_box     (grid heightfield, box frame)
//!     ├─ builder::build_lid     (grid heightfield, or CSG when text has ink)
//!     └─ hinge::build_hinges    (CSG knuckles and pins)
//!         → GeneratedParts → export (render buffers, STL artifacts)
//! ```
//!
//! ## Algorithms
//!
//! All algorithms are pure Rust and run in the browser:
//! - **Box and plain lid**: heightfields over a shared breakpoint grid,
//!   closed by construction
//! - **Boolean operations**: BSP trees (csg.js algorithm)
//! - **Text**: bitmap rasterization merged into rectangles
//!
//! ## Usage
//!
//! ```rust
//! use boxgen_mesh::{generate, BoxParams};
//!
//! let parts = generate(&BoxParams::default()).unwrap();
//! assert_eq!(parts.box_mesh.polygon_count(), 18);
//! assert!(parts.lid.is_some());
//! ```

pub mod builder;
pub mod csg;
pub mod error;
pub mod export;
pub mod grid;
pub mod heightfield;
pub mod hinge;
pub mod mesh;
pub mod params;
pub mod text;

pub use error::{MeshError, MeshResult};
pub use export::{Artifact, PartKind, RenderBuffers};
pub use hinge::{HingePieces, HingeSet};
pub use mesh::Mesh;
pub use params::BoxParams;
pub use text::TextRasterizer;

use tracing::{debug, info};

/// Every part generated for one parameter record.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedParts {
    /// Box body in the box frame.
    pub box_mesh: Mesh,
    /// Lid in its print frame.
    pub lid: Option<Mesh>,
    /// Hinge knuckles and pins.
    pub hinges: Option<HingeSet>,
}

impl GeneratedParts {
    /// The non-empty solids making up one part's file, in output order.
    ///
    /// Box knuckles travel with the box and lid knuckles with the lid.
    pub fn part_meshes(&self, kind: PartKind) -> Vec<&Mesh> {
        let mut meshes = Vec::new();
        match kind {
            PartKind::Box => {
                meshes.push(&self.box_mesh);
                if let Some(hinges) = &self.hinges {
                    meshes.extend(&hinges.box_knuckles);
                }
            }
            PartKind::Lid => {
                if let Some(lid) = &self.lid {
                    meshes.push(lid);
                    if let Some(hinges) = &self.hinges {
                        meshes.extend(&hinges.lid_knuckles);
                    }
                }
            }
            PartKind::HingePin => {
                if let Some(hinges) = &self.hinges {
                    meshes.extend(&hinges.pins);
                }
            }
        }
        meshes.retain(|mesh| !mesh.is_empty());
        meshes
    }

    /// One part merged into a single mesh, or `None` if it has no geometry.
    pub fn part_mesh(&self, kind: PartKind) -> Option<Mesh> {
        let meshes = self.part_meshes(kind);
        if meshes.is_empty() {
            return None;
        }
        let mut merged = Mesh::new();
        for mesh in meshes {
            merged.merge(mesh);
        }
        Some(merged)
    }

    /// Parts that have geometry, in [`PartKind::ALL`] order.
    pub fn available_parts(&self) -> Vec<PartKind> {
        PartKind::ALL
            .into_iter()
            .filter(|kind| !self.part_meshes(*kind).is_empty())
            .collect()
    }
}

/// Generates all parts with the built-in font.
///
/// # Errors
///
/// Returns an error for parameters that cannot be resolved or geometry that
/// cannot be built.
pub fn generate(params: &BoxParams) -> MeshResult<GeneratedParts> {
    generate_with(params, &TextRasterizer::default())
}

/// Generates all parts, rendering lid text with `rasterizer`.
///
/// # Errors
///
/// See [`generate`].
pub fn generate_with(params: &BoxParams, rasterizer: &TextRasterizer) -> MeshResult<GeneratedParts> {
    let resolved = params.resolve()?;

    let box_mesh = builder::build_box(&resolved)?;
    let lid = builder::build_lid(&resolved, rasterizer)?;
    let hinges = hinge::build_hinges(&resolved)?;

    info!(
        label = %params.dimension_label(),
        box_polygons = box_mesh.polygon_count(),
        lid_polygons = lid.as_ref().map_or(0, Mesh::polygon_count),
        hinges = hinges.as_ref().map_or(0, |h| h.pins.len()),
        "parts generated"
    );
    Ok(GeneratedParts {
        box_mesh,
        lid,
        hinges,
    })
}

/// Generates only the geometry exported with `kind`.
///
/// The box mesh stays empty unless `kind` is [`PartKind::Box`], the lid is
/// built only for [`PartKind::Lid`] and the hinge set holds just the pieces
/// that travel with `kind`, so previewing the pins never runs the text
/// booleans.
///
/// # Errors
///
/// See [`generate`].
pub fn generate_part_with(
    params: &BoxParams,
    rasterizer: &TextRasterizer,
    kind: PartKind,
) -> MeshResult<GeneratedParts> {
    let resolved = params.resolve()?;

    let box_mesh = match kind {
        PartKind::Box => builder::build_box(&resolved)?,
        _ => Mesh::new(),
    };
    let lid = match kind {
        PartKind::Lid => builder::build_lid(&resolved, rasterizer)?,
        _ => None,
    };
    let hinges = hinge::build_hinge_pieces(&resolved, HingePieces::for_part(kind))?;

    debug!(
        part = %kind,
        label = %params.dimension_label(),
        "single part generated"
    );
    Ok(GeneratedParts {
        box_mesh,
        lid,
        hinges,
    })
}
