//! Tests for the WASM-facing helpers.

use super::*;
use boxgen_mesh::export::stl::parse_stl;

/// The default record decodes back to the defaults.
#[test]
fn default_params_round_trip() {
    let json = default_params_json_internal().expect("defaults encode");
    assert!(json.contains("\"wallThickness\": 2.0"));
    assert_eq!(BoxParams::from_json(&json).unwrap(), BoxParams::default());
}

/// An empty object takes every default.
#[test]
fn generate_box_from_empty_record() {
    let mesh = generate_part_internal("{}", "box", None).expect("generation succeeds");
    let buffers = mesh.buffers();

    assert_eq!(mesh.polygon_count(), 18);
    assert_eq!(mesh.vertex_count() as usize, buffers.positions.len() / 3);
    assert_eq!(mesh.triangle_count() as usize, buffers.indices.len() / 3);
    assert_eq!(buffers.normals.len(), buffers.positions.len());
}

/// The lid preview includes the lid knuckles when hinges are on.
#[test]
fn generate_hinged_lid() {
    let plain = generate_part_internal("{}", "lid", None).unwrap();
    let hinged = generate_part_internal(r#"{"includeHinge": true}"#, "lid", None).unwrap();
    assert!(hinged.polygon_count() > plain.polygon_count());
}

/// Pins only exist with hinges.
#[test]
fn missing_part_reports_diagnostic() {
    let diagnostics = generate_part_internal("{}", "pins", None).unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Error);
    assert!(diagnostics[0].message().contains("hinge_pin"));
}

/// Bad JSON and an unknown part are both reported.
#[test]
fn invalid_inputs_collect_diagnostics() {
    let diagnostics = generate_part_internal("{not json", "hinge", None).unwrap_err();
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[1].parameter().as_deref(), Some("part"));
}

/// Resolution errors name the offending parameter.
#[test]
fn invalid_parameter_names_field() {
    let diagnostics = generate_part_internal(r#"{"width": -5}"#, "box", None).unwrap_err();
    assert_eq!(diagnostics[0].parameter().as_deref(), Some("width"));
    assert!(diagnostics[0].to_string().starts_with("error: "));
}

/// STL export parses back with the file stem as solid name.
#[test]
fn export_stl_round_trip() {
    let stl = export_part_stl_internal(r#"{"width": 100}"#, "box", None).unwrap();
    let solid = parse_stl(&stl).unwrap();
    assert_eq!(solid.name, "box_100x60x40");
    assert!(!solid.triangles.is_empty());
}

/// File names follow the dimension label.
#[test]
fn file_names() {
    assert_eq!(part_file_name_internal("{}", "lid").unwrap(), "lid_80x60x40.stl");
    assert_eq!(
        part_file_name_internal(r#"{"height": 25.5}"#, "pins").unwrap(),
        "hinge_pin_80x60x25.5.stl"
    );
}

/// The segment count is a usable circle resolution.
#[test]
fn segments_are_usable() {
    assert!(default_segments() >= 3);
}

/// Validation reports errors and ignored inputs without generating.
#[test]
fn validate_params_reports_fields() {
    assert!(validate_params("{}", None).is_empty());

    let errors = validate_params_internal(r#"{"wallThickness": 40}"#, None);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].parameter().as_deref(), Some("wallThickness"));

    let list = validate_params(r#"{"includeHinge": true, "includeLid": false}"#, None);
    assert_eq!(list.len(), 1);
    let warning = list.get(0).unwrap();
    assert_eq!(warning.severity(), Severity::Warning);
    assert_eq!(warning.parameter().as_deref(), Some("includeHinge"));
}

/// Characters the font cannot draw are named in a warning.
#[test]
fn validate_params_reports_missing_glyphs() {
    let json = format!(r#"{{"lidText": "Box {}"}}"#, '\u{1F4E6}');
    let diagnostics = validate_params_internal(&json, None);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity(), Severity::Warning);
    assert_eq!(diagnostics[0].parameter().as_deref(), Some("lidText"));
    assert!(diagnostics[0].message().contains('\u{1F4E6}'));

    assert!(validate_params_internal(r#"{"lidText": "Screws"}"#, None).is_empty());
}

/// Font bytes that do not parse are reported, not replaced by the default.
#[test]
fn unusable_font_is_reported() {
    let bytes = [0u8, 1, 2, 3];
    let diagnostics = generate_part_internal(r#"{"lidText": "Box"}"#, "lid", Some(&bytes)).unwrap_err();
    assert_eq!(diagnostics.len(), 1);
    assert!(diagnostics[0].message().contains("font"));
    assert_eq!(validate_params_internal("{}", Some(&bytes)).len(), 1);
}

/// A pins request never needs the box or lid.
#[test]
fn pins_generated_alone() {
    let json = r#"{"includeHinge": true, "hingeCount": 3, "lidText": "Screws"}"#;
    let pins = generate_part_internal(json, "pins", None).unwrap();
    let (_, _, parts) = generate_for(json, "pins", None).unwrap();
    assert!(parts.box_mesh.is_empty());
    assert!(parts.lid.is_none());
    assert_eq!(pins.polygon_count() as usize, parts.part_mesh(PartKind::HingePin).unwrap().polygon_count());
}
