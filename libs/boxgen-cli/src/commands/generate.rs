//! boxgen generate command - write STL files.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use boxgen_mesh::export::export_part;
use boxgen_mesh::{generate_with, BoxParams, GeneratedParts};
use tracing::info;

use crate::{load_params, load_rasterizer, PartSelection};

pub fn run(
    params: Option<&Path>,
    out_dir: &Path,
    font: Option<&Path>,
    part: PartSelection,
) -> Result<()> {
    let params = load_params(params)?;
    let rasterizer = load_rasterizer(font)?;
    let parts = generate_with(&params, &rasterizer).context("Failed to generate geometry")?;

    for path in write_parts(&parts, &params, out_dir, part)? {
        println!("{}", path.display());
    }
    Ok(())
}

/// Writes the selected parts, returning the written paths.
///
/// Selecting all parts skips the ones without geometry; selecting a single
/// missing part is an error.
pub fn write_parts(
    parts: &GeneratedParts,
    params: &BoxParams,
    out_dir: &Path,
    selection: PartSelection,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    for kind in selection.kinds() {
        let Some(artifact) = export_part(parts, params, kind) else {
            if selection == PartSelection::All {
                continue;
            }
            bail!("Part `{kind}` has no geometry for these parameters");
        };
        let path = artifact
            .write_to_dir(out_dir)
            .with_context(|| format!("Failed to write {}", artifact.file_name))?;
        info!(path = %path.display(), "wrote part");
        written.push(path);
    }
    Ok(written)
}
