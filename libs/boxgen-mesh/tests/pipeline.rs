//! End-to-end tests: parameters in, parts and STL files out.

use approx::assert_relative_eq;
use boxgen_mesh::builder::LidFrame;
use boxgen_mesh::export::stl::parse_stl;
use boxgen_mesh::export::{export_artifacts, export_part};
use boxgen_mesh::params::TextStyle;
use boxgen_mesh::{
    generate, generate_part_with, BoxParams, MeshError, PartKind, RenderBuffers, TextRasterizer,
};

fn hinged() -> BoxParams {
    BoxParams {
        include_hinge: true,
        hinge_count: 3,
        divisions_x: vec![33.0, 66.0],
        divisions_z: vec![50.0],
        chamfer_size: 1.0,
        ..BoxParams::default()
    }
}

// =============================================================================
// GENERATION
// =============================================================================

#[test]
fn test_default_parts() {
    let parts = generate(&BoxParams::default()).unwrap();
    assert!(parts.box_mesh.edge_report().is_closed());
    assert!(parts.lid.as_ref().unwrap().edge_report().is_closed());
    assert!(parts.hinges.is_none());
    assert_eq!(parts.available_parts(), vec![PartKind::Box, PartKind::Lid]);
}

#[test]
fn test_no_lid_no_hinge() {
    let params = BoxParams {
        include_lid: false,
        include_hinge: true,
        ..BoxParams::default()
    };
    let parts = generate(&params).unwrap();
    assert!(parts.lid.is_none());
    assert!(parts.hinges.is_none());
    assert_eq!(parts.available_parts(), vec![PartKind::Box]);
}

#[test]
fn test_generation_is_idempotent() {
    let params = BoxParams {
        lid_text: "Screws".to_string(),
        ..hinged()
    };
    let first = generate(&params).unwrap();
    let second = generate(&params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_invalid_params_rejected() {
    let params = BoxParams {
        wall_thickness: 30.0,
        ..BoxParams::default()
    };
    assert!(matches!(
        generate(&params),
        Err(MeshError::InvalidParameter {
            name: "wallThickness",
            ..
        })
    ));
}

#[test]
fn test_json_record_round_trip() {
    let json = r#"{"width": 120, "divisionsX": [25, 75], "lidText": "Bits", "lidTextStyle": "embossed"}"#;
    let params = BoxParams::from_json(json).unwrap();
    assert_eq!(params.lid_text_style, TextStyle::Embossed);
    let parts = generate(&params).unwrap();
    let lid = parts.lid.unwrap();
    // Embossed text stands below the cap bottom in the print frame
    assert!(lid.bounding_box().unwrap().min.z < -params.wall_thickness);
}

// =============================================================================
// LID AND HINGE ASSEMBLY
// =============================================================================

#[test]
fn test_text_lid_keeps_print_frame() {
    let plain = generate(&BoxParams::default()).unwrap().lid.unwrap();
    let params = BoxParams {
        lid_text: "TOOLS".to_string(),
        ..BoxParams::default()
    };
    let text = generate(&params).unwrap().lid.unwrap();

    assert_ne!(text.baked(), plain.baked());
    let (a, b) = (text.bounding_box().unwrap(), plain.bounding_box().unwrap());
    assert_relative_eq!(a.min.z, -params.wall_thickness, epsilon = 1e-9);
    assert_relative_eq!(a.min.x, b.min.x, epsilon = 1e-9);
    assert_relative_eq!(a.max.y, b.max.y, epsilon = 1e-9);
    assert!(text.volume() < plain.volume());
}

#[test]
fn test_assembled_lid_sits_on_box() {
    let params = BoxParams::default();
    let parts = generate(&params).unwrap();
    let mut lid = parts.lid.unwrap();
    lid.transform(&LidFrame::new(params.height).to_box());

    let bounds = lid.bounding_box().unwrap();
    assert_relative_eq!(bounds.max.z, params.height + params.wall_thickness, epsilon = 1e-9);
    // The lip hangs into the cavity
    assert_relative_eq!(bounds.min.z, params.height - params.lid_height, epsilon = 1e-9);
}

#[test]
fn test_hinge_parts_travel_with_box_and_lid() {
    let params = hinged();
    let parts = generate(&params).unwrap();
    let hinges = parts.hinges.as_ref().unwrap();

    assert_eq!(parts.part_meshes(PartKind::Box).len(), 1 + 6);
    assert_eq!(parts.part_meshes(PartKind::Lid).len(), 1 + 3);
    assert_eq!(parts.part_meshes(PartKind::HingePin).len(), 3);

    let box_part = parts.part_mesh(PartKind::Box).unwrap();
    let box_bounds = box_part.bounding_box().unwrap();
    // Barrels protrude behind the back wall and above the rim
    assert!(box_bounds.max.y > params.depth / 2.0);
    assert_relative_eq!(box_bounds.max.z, params.height + params.wall_thickness, epsilon = 1e-9);
    assert_eq!(
        box_part.polygon_count(),
        parts.box_mesh.polygon_count()
            + hinges.box_knuckles.iter().map(|m| m.polygon_count()).sum::<usize>()
    );
}

#[test]
fn test_text_lids_are_closed() {
    for style in [TextStyle::Engraved, TextStyle::Embossed] {
        for text in ["Screws", "BOX", "Hello\nWorld", "@#wvMN"] {
            let params = BoxParams {
                lid_text: text.to_string(),
                lid_text_style: style,
                ..BoxParams::default()
            };
            let lid = generate(&params).unwrap().lid.unwrap();
            let report = lid.edge_report();
            assert!(report.is_closed(), "{style:?} {text:?}: {report:?}");
        }
    }
}

#[test]
fn test_every_knuckle_is_closed() {
    let params = BoxParams {
        lid_text: "Screws".to_string(),
        ..hinged()
    };
    let parts = generate(&params).unwrap();
    assert!(parts.lid.as_ref().unwrap().edge_report().is_closed());

    let hinges = parts.hinges.as_ref().unwrap();
    let knuckles = hinges.box_knuckles.iter().chain(&hinges.lid_knuckles);
    for (index, knuckle) in knuckles.enumerate() {
        let report = knuckle.edge_report();
        assert!(report.is_closed(), "knuckle {index}: {report:?}");
    }
    for pin in &hinges.pins {
        assert!(pin.edge_report().is_closed());
    }
}

#[test]
fn test_single_part_generation() {
    let params = BoxParams {
        lid_text: "Screws".to_string(),
        ..hinged()
    };
    let full = generate(&params).unwrap();
    let rasterizer = TextRasterizer::builtin();

    for kind in PartKind::ALL {
        let single = generate_part_with(&params, &rasterizer, kind).unwrap();
        assert_eq!(single.part_mesh(kind), full.part_mesh(kind), "{kind}");
        assert_eq!(single.available_parts(), vec![kind]);
    }

    let pins = generate_part_with(&params, &rasterizer, PartKind::HingePin).unwrap();
    assert!(pins.box_mesh.is_empty());
    assert!(pins.lid.is_none());
    assert!(pins.hinges.as_ref().unwrap().lid_knuckles.is_empty());
}

// =============================================================================
// EXPORT
// =============================================================================

#[test]
fn test_stl_round_trip() {
    let params = hinged();
    let parts = generate(&params).unwrap();
    for artifact in export_artifacts(&parts, &params) {
        let solid = parse_stl(&artifact.contents).unwrap();
        assert_eq!(solid.name, artifact.solid_name);

        let expected: Vec<_> = parts
            .part_meshes(artifact.kind)
            .into_iter()
            .flat_map(|mesh| mesh.triangulate())
            .collect();
        assert_eq!(solid.triangles.len(), expected.len());
        for (parsed, original) in solid.triangles.iter().zip(&expected) {
            for (p, o) in parsed.vertices.iter().zip(&original.vertices) {
                assert!(p.abs_diff_eq(*o, 1e-6), "{p} vs {o}");
            }
        }
    }
}

#[test]
fn test_missing_part_not_exported() {
    let params = BoxParams::default();
    let parts = generate(&params).unwrap();
    assert!(export_part(&parts, &params, PartKind::HingePin).is_none());
}

#[test]
fn test_render_buffers_for_every_part() {
    let parts = generate(&hinged()).unwrap();
    for kind in parts.available_parts() {
        let mesh = parts.part_mesh(kind).unwrap();
        let buffers = RenderBuffers::from_mesh(&mesh);
        assert_eq!(buffers.triangle_count(), mesh.triangle_count());
        assert_eq!(buffers.normals.len(), buffers.positions.len());
        assert!(buffers.positions.iter().all(|v| v.is_finite()));
    }
}
