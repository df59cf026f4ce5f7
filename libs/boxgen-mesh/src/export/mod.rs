//! # Export
//!
//! Turns generated parts into render buffers and named STL artifacts.

pub mod render;
pub mod stl;

pub use render::RenderBuffers;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{MeshError, MeshResult};
use crate::params::BoxParams;
use crate::GeneratedParts;

/// A printable part written to its own file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PartKind {
    /// Box body, with the box hinge knuckles.
    Box,
    /// Lid in print orientation, with the lid hinge knuckles.
    Lid,
    /// Hinge pins.
    HingePin,
}

impl PartKind {
    pub const ALL: [PartKind; 3] = [PartKind::Box, PartKind::Lid, PartKind::HingePin];

    /// File name prefix.
    pub fn prefix(&self) -> &'static str {
        match self {
            PartKind::Box => "box",
            PartKind::Lid => "lid",
            PartKind::HingePin => "hinge_pin",
        }
    }

    /// `{prefix}_{W}x{D}x{H}`, also used as the STL solid name.
    pub fn file_stem(&self, params: &BoxParams) -> String {
        format!("{}_{}", self.prefix(), params.dimension_label())
    }

    /// `{prefix}_{W}x{D}x{H}.stl`.
    pub fn file_name(&self, params: &BoxParams) -> String {
        format!("{}.stl", self.file_stem(params))
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for PartKind {
    type Err = MeshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" => Ok(PartKind::Box),
            "lid" => Ok(PartKind::Lid),
            "pin" | "pins" | "hinge_pin" => Ok(PartKind::HingePin),
            other => Err(MeshError::invalid(
                "part",
                format!("unknown part `{other}`; expected box, lid or pins"),
            )),
        }
    }
}

/// One exported STL file.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub kind: PartKind,
    pub file_name: String,
    pub solid_name: String,
    pub contents: String,
}

impl Artifact {
    /// Writes the artifact into `dir`, returning the written path.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Io`] if the file cannot be written.
    pub fn write_to_dir(&self, dir: &Path) -> MeshResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// Serializes one part, or `None` if the parts have no such geometry.
pub fn export_part(parts: &GeneratedParts, params: &BoxParams, kind: PartKind) -> Option<Artifact> {
    let meshes = parts.part_meshes(kind);
    if meshes.is_empty() {
        return None;
    }
    let solid_name = kind.file_stem(params);
    let contents = stl::stl_string(&solid_name, &meshes);
    info!(
        part = %kind,
        meshes = meshes.len(),
        bytes = contents.len(),
        "part exported"
    );
    Some(Artifact {
        kind,
        file_name: kind.file_name(params),
        solid_name,
        contents,
    })
}

/// Serializes every part that has geometry, in [`PartKind::ALL`] order.
pub fn export_artifacts(parts: &GeneratedParts, params: &BoxParams) -> Vec<Artifact> {
    PartKind::ALL
        .iter()
        .filter_map(|&kind| export_part(parts, params, kind))
        .collect()
}
