//! boxgen inspect command - report part statistics.

use std::path::Path;

use anyhow::{Context, Result};
use boxgen_mesh::{generate_with, BoxParams, GeneratedParts};
use serde::Serialize;

use crate::{load_params, load_rasterizer, OutputFormat};

#[derive(Debug, Serialize)]
pub struct PartInfo {
    part: String,
    file_name: String,
    solids: usize,
    polygons: usize,
    triangles: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    bounds: Option<BoundsInfo>,
    volume: f64,
    open_edges: usize,
    non_manifold_edges: usize,
}

#[derive(Debug, Serialize)]
struct BoundsInfo {
    min: [f64; 3],
    max: [f64; 3],
    dimensions: [f64; 3],
}

pub fn run(params: Option<&Path>, font: Option<&Path>, format: OutputFormat) -> Result<()> {
    let params = load_params(params)?;
    let rasterizer = load_rasterizer(font)?;
    let parts = generate_with(&params, &rasterizer).context("Failed to generate geometry")?;
    let infos = collect(&parts, &params);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&infos)?),
        OutputFormat::Text => {
            for info in &infos {
                print_text(info);
            }
        }
    }
    Ok(())
}

/// Statistics for every part that has geometry.
///
/// Edge counts cover all solids of a part together.
pub fn collect(parts: &GeneratedParts, params: &BoxParams) -> Vec<PartInfo> {
    parts
        .available_parts()
        .into_iter()
        .filter_map(|kind| {
            let solids = parts.part_meshes(kind).len();
            let mesh = parts.part_mesh(kind)?;
            let report = mesh.edge_report();
            let bounds = mesh.bounding_box().map(|b| {
                let size = b.size();
                BoundsInfo {
                    min: b.min.to_array(),
                    max: b.max.to_array(),
                    dimensions: size.to_array(),
                }
            });
            Some(PartInfo {
                part: kind.to_string(),
                file_name: kind.file_name(params),
                solids,
                polygons: mesh.polygon_count(),
                triangles: mesh.triangle_count(),
                bounds,
                volume: mesh.volume(),
                open_edges: report.boundary_edges,
                non_manifold_edges: report.non_manifold_edges,
            })
        })
        .collect()
}

fn print_text(info: &PartInfo) {
    println!("{} ({})", info.part, info.file_name);
    println!("  solids:     {}", info.solids);
    println!("  polygons:   {}", info.polygons);
    println!("  triangles:  {}", info.triangles);
    if let Some(bounds) = &info.bounds {
        let [x, y, z] = bounds.dimensions;
        println!("  size:       {x:.3} x {y:.3} x {z:.3}");
        println!(
            "  bounds:     [{:.3}, {:.3}, {:.3}] .. [{:.3}, {:.3}, {:.3}]",
            bounds.min[0], bounds.min[1], bounds.min[2], bounds.max[0], bounds.max[1], bounds.max[2]
        );
    }
    println!("  volume:     {:.3}", info.volume);
    println!(
        "  open edges: {} (non-manifold: {})",
        info.open_edges, info.non_manifold_edges
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxgen_mesh::generate;

    #[test]
    fn test_collect_default_parts() {
        let params = BoxParams::default();
        let parts = generate(&params).unwrap();
        let infos = collect(&parts, &params);

        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].part, "box");
        assert_eq!(infos[0].polygons, 18);
        assert_eq!(infos[0].open_edges, 0);
        assert_eq!(infos[1].file_name, "lid_80x60x40.stl");
        assert_eq!(infos[1].open_edges, 0);
    }

    #[test]
    fn test_info_serializes() {
        let params = BoxParams::default();
        let parts = generate(&params).unwrap();
        let json = serde_json::to_string(&collect(&parts, &params)).unwrap();
        assert!(json.contains("\"part\":\"box\""));
        assert!(json.contains("\"dimensions\":[80.0,60.0,40.0]"));
    }
}
