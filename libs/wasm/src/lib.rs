//! WASM-facing entry points for the box generator.
//!
//! This crate is compiled to a `cdylib` and consumed from JavaScript via
//! `wasm-bindgen`. Every exported function takes the parameter record as
//! camelCase JSON; the generating ones also take optional TrueType font
//! bytes for the lid text. Native tests call the `_internal` helpers, which
//! return Rust diagnostics instead of JavaScript errors.
//!
//! ```
//! let mesh = boxgen_wasm::generate_part_internal("{}", "box", None).unwrap();
//! assert_eq!(mesh.polygon_count(), 18);
//! ```

mod diagnostics;
mod mesh_handle;

pub use diagnostics::{Diagnostic, DiagnosticList, Severity};
pub use mesh_handle::MeshHandle;

use boxgen_mesh::export::export_part;
use boxgen_mesh::{generate_part_with, BoxParams, GeneratedParts, PartKind, TextRasterizer};
use config::constants::DEFAULT_SEGMENTS;
use tracing::debug;
use wasm_bindgen::prelude::*;

use diagnostics::to_js_error;

/// Installs a panic hook that forwards Rust panics to the browser console,
/// and routes kernel logs to the console when running in the browser.
///
/// # Examples
/// ```no_run
/// // In JavaScript: import and call once at startup.
/// // import { init_panic_hook } from "boxgen-wasm";
/// // init_panic_hook();
/// ```
#[wasm_bindgen]
pub fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A second call finds the subscriber already installed
    #[cfg(target_arch = "wasm32")]
    if tracing_wasm::try_set_as_global_default().is_err() {
        debug!("tracing subscriber already installed");
    }
}

/// Returns the circle segment count used for hinge barrels and pins.
#[wasm_bindgen]
pub fn default_segments() -> u32 {
    DEFAULT_SEGMENTS
}

/// Returns the default parameter record as pretty JSON.
///
/// # Errors
/// Returns a JavaScript error if the record cannot be encoded.
#[wasm_bindgen]
pub fn default_params_json() -> Result<String, JsValue> {
    default_params_json_internal().map_err(|d| to_js_error(&d))
}

/// Generates one part and returns its preview buffers.
///
/// `part` is `box`, `lid` or `pins`. `font` holds TrueType bytes for the lid
/// text; without it the built-in bitmap font is used. Only the requested
/// part is built.
///
/// # Errors
/// Returns a JavaScript error containing diagnostics if the parameters are
/// invalid, the part has no geometry, or generation fails.
///
/// # Examples
/// ```no_run
/// // In JavaScript:
/// // try {
/// //   const mesh = generate_part(JSON.stringify({ width: 100 }), "lid", fontBytes);
/// //   console.log("Triangles:", mesh.triangle_count);
/// // } catch (error) {
/// //   console.error("Generation failed:", error);
/// // }
/// ```
#[wasm_bindgen]
pub fn generate_part(params_json: &str, part: &str, font: Option<Vec<u8>>) -> Result<MeshHandle, JsValue> {
    generate_part_internal(params_json, part, font.as_deref()).map_err(|d| to_js_error(&d))
}

/// Generates one part and returns it as an ASCII STL string.
///
/// # Errors
/// See [`generate_part`].
#[wasm_bindgen]
pub fn export_part_stl(params_json: &str, part: &str, font: Option<Vec<u8>>) -> Result<String, JsValue> {
    export_part_stl_internal(params_json, part, font.as_deref()).map_err(|d| to_js_error(&d))
}

/// Returns the download file name of one part, e.g. `box_80x60x40.stl`.
///
/// # Errors
/// Returns a JavaScript error for invalid JSON or an unknown part.
#[wasm_bindgen]
pub fn part_file_name(params_json: &str, part: &str) -> Result<String, JsValue> {
    part_file_name_internal(params_json, part).map_err(|d| to_js_error(&d))
}

/// Checks a parameter record without generating geometry.
///
/// An empty list means the record is usable as is. Warnings name inputs that
/// are accepted but ignored, such as lid text characters `font` (or the
/// built-in font) has no glyph for.
#[wasm_bindgen]
pub fn validate_params(params_json: &str, font: Option<Vec<u8>>) -> DiagnosticList {
    DiagnosticList::new(validate_params_internal(params_json, font.as_deref()))
}

// =============================================================================
// NATIVE HELPERS
// =============================================================================

/// Internal implementation of [`default_params_json`].
pub fn default_params_json_internal() -> Result<String, Vec<Diagnostic>> {
    BoxParams::default()
        .to_json_pretty()
        .map_err(|err| vec![err.into()])
}

/// Internal implementation of [`validate_params`].
pub fn validate_params_internal(params_json: &str, font: Option<&[u8]>) -> Vec<Diagnostic> {
    let params = match BoxParams::from_json(params_json) {
        Ok(params) => params,
        Err(err) => return vec![err.into()],
    };
    let resolved = match params.resolve() {
        Ok(resolved) => resolved,
        Err(err) => return vec![err.into()],
    };
    let rasterizer = match rasterizer_for(font) {
        Ok(rasterizer) => rasterizer,
        Err(diagnostic) => return vec![diagnostic],
    };

    let mut diagnostics = Vec::new();
    if params.include_hinge && !params.include_lid {
        diagnostics.push(Diagnostic::warning(
            "includeHinge",
            "hinges need a lid and are skipped",
        ));
    }
    let text = resolved.lid.as_ref().and_then(|lid| lid.text.as_ref());
    if let Some(text) = text {
        let missing = rasterizer.missing_glyphs(&text.text);
        if !missing.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "lidText",
                format!(
                    "no glyph for {}; these characters are left out",
                    missing.iter().map(|c| format!("'{c}'")).collect::<Vec<_>>().join(", ")
                ),
            ));
        }
    }
    diagnostics
}

/// Internal implementation of [`generate_part`].
///
/// Returns diagnostics on error for better error reporting.
pub fn generate_part_internal(
    params_json: &str,
    part: &str,
    font: Option<&[u8]>,
) -> Result<MeshHandle, Vec<Diagnostic>> {
    let (_, kind, parts) = generate_for(params_json, part, font)?;
    let mesh = parts.part_mesh(kind).ok_or_else(|| missing_part(kind))?;
    debug!(part = %kind, polygons = mesh.polygon_count(), "preview buffers built");
    Ok(MeshHandle::from_mesh(&mesh))
}

/// Internal implementation of [`export_part_stl`].
pub fn export_part_stl_internal(
    params_json: &str,
    part: &str,
    font: Option<&[u8]>,
) -> Result<String, Vec<Diagnostic>> {
    let (params, kind, parts) = generate_for(params_json, part, font)?;
    export_part(&parts, &params, kind)
        .map(|artifact| artifact.contents)
        .ok_or_else(|| missing_part(kind))
}

/// Internal implementation of [`part_file_name`].
pub fn part_file_name_internal(params_json: &str, part: &str) -> Result<String, Vec<Diagnostic>> {
    let params = BoxParams::from_json(params_json).map_err(|err| vec![err.into()])?;
    let kind: PartKind = part.parse().map_err(|err: boxgen_mesh::MeshError| vec![err.into()])?;
    Ok(kind.file_name(&params))
}

fn rasterizer_for(font: Option<&[u8]>) -> Result<TextRasterizer, Diagnostic> {
    match font {
        Some(bytes) => TextRasterizer::from_ttf_bytes(bytes.to_vec()).map_err(Diagnostic::from),
        None => Ok(TextRasterizer::builtin()),
    }
}

/// Decodes the inputs and builds only the requested part.
fn generate_for(
    params_json: &str,
    part: &str,
    font: Option<&[u8]>,
) -> Result<(BoxParams, PartKind, GeneratedParts), Vec<Diagnostic>> {
    let mut diagnostics = Vec::new();
    let params = BoxParams::from_json(params_json).map_err(Diagnostic::from);
    let kind = part.parse::<PartKind>().map_err(Diagnostic::from);
    let rasterizer = rasterizer_for(font);

    let (params, kind, rasterizer) = match (params, kind, rasterizer) {
        (Ok(params), Ok(kind), Ok(rasterizer)) => (params, kind, rasterizer),
        (params, kind, rasterizer) => {
            diagnostics.extend(params.err());
            diagnostics.extend(kind.err());
            diagnostics.extend(rasterizer.err());
            return Err(diagnostics);
        }
    };

    let parts = generate_part_with(&params, &rasterizer, kind).map_err(|err| vec![err.into()])?;
    Ok((params, kind, parts))
}

fn missing_part(kind: PartKind) -> Vec<Diagnostic> {
    vec![Diagnostic::error(format!(
        "part `{kind}` has no geometry for these parameters"
    ))]
}

#[cfg(test)]
mod tests;
