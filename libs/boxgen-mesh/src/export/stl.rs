//! # ASCII STL
//!
//! Writer and parser for the ASCII STL format:
//!
//! ```text
//! solid name
//!   facet normal ni nj nk
//!     outer loop
//!       vertex v1x v1y v1z
//!       vertex v2x v2y v2z
//!       vertex v3x v3y v3z
//!     endloop
//!   endfacet
//! endsolid name
//! ```
//!
//! Numbers are written with a fixed number of decimals and negative zero is
//! written as zero, so identical meshes always give identical files. Several
//! meshes may share one solid block.

use std::io::Write;

use config::constants::STL_DECIMALS;
use glam::DVec3;

use crate::error::{MeshError, MeshResult};
use crate::mesh::{Mesh, Triangle};

// =============================================================================
// WRITER
// =============================================================================

/// Formats one number with [`STL_DECIMALS`] decimals; `-0.000000` becomes
/// `0.000000`.
pub fn format_number(value: f64) -> String {
    let text = format!("{:.*}", STL_DECIMALS, value);
    match text.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => text,
    }
}

fn format_vector(v: DVec3) -> String {
    format!(
        "{} {} {}",
        format_number(v.x),
        format_number(v.y),
        format_number(v.z)
    )
}

/// Writes `meshes` as one ASCII solid named `name`.
///
/// # Errors
///
/// Returns [`MeshError::Io`] if the writer fails.
pub fn write_stl<W: Write>(writer: &mut W, name: &str, meshes: &[&Mesh]) -> MeshResult<()> {
    writeln!(writer, "solid {name}")?;
    for mesh in meshes {
        for triangle in mesh.triangulate() {
            writeln!(writer, "  facet normal {}", format_vector(triangle.normal))?;
            writeln!(writer, "    outer loop")?;
            for vertex in triangle.vertices {
                writeln!(writer, "      vertex {}", format_vector(vertex))?;
            }
            writeln!(writer, "    endloop")?;
            writeln!(writer, "  endfacet")?;
        }
    }
    writeln!(writer, "endsolid {name}")?;
    Ok(())
}

/// Renders `meshes` as an ASCII STL string.
///
/// # Examples
///
/// ```
/// use boxgen_mesh::export::stl::stl_string;
/// use boxgen_mesh::mesh::{Mesh, Polygon};
/// use glam::DVec3;
///
/// let mesh = Mesh::from_polygons(vec![Polygon::new(vec![
///     DVec3::ZERO,
///     DVec3::X,
///     DVec3::Y,
/// ])]);
/// let stl = stl_string("part", &[&mesh]);
/// assert!(stl.starts_with("solid part\n"));
/// assert!(stl.contains("facet normal 0.000000 0.000000 1.000000"));
/// ```
pub fn stl_string(name: &str, meshes: &[&Mesh]) -> String {
    let mut buffer = Vec::new();
    match write_stl(&mut buffer, name, meshes) {
        Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
        // Writes into a Vec cannot fail
        Err(_) => String::new(),
    }
}

// =============================================================================
// PARSER
// =============================================================================

/// A parsed ASCII solid.
#[derive(Debug, Clone, PartialEq)]
pub struct StlSolid {
    pub name: String,
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Header,
    Solid,
    Facet,
    Loop,
    LoopClosed,
    Done,
}

/// Parses one ASCII STL solid.
///
/// Normals are read from the file as written, not recomputed.
///
/// # Errors
///
/// Returns [`MeshError::StlParse`] with the 1-based line number of the first
/// malformed line, or of the last line if the solid is not closed.
pub fn parse_stl(input: &str) -> MeshResult<StlSolid> {
    let mut state = State::Header;
    let mut name = String::new();
    let mut triangles = Vec::new();
    let mut normal = DVec3::ZERO;
    let mut corners: Vec<DVec3> = Vec::with_capacity(3);
    let mut last_line = 0;

    for (index, raw) in input.lines().enumerate() {
        let line = index + 1;
        last_line = line;
        let mut words = raw.split_whitespace();
        let Some(keyword) = words.next() else {
            continue;
        };

        state = match (state, keyword) {
            (State::Header, "solid") => {
                name = words.collect::<Vec<_>>().join(" ");
                State::Solid
            }
            (State::Solid, "facet") => {
                if words.next() != Some("normal") {
                    return Err(MeshError::stl_parse(line, "expected `facet normal`"));
                }
                normal = parse_vector(words, line)?;
                State::Facet
            }
            (State::Solid, "endsolid") => State::Done,
            (State::Facet, "outer") => {
                if words.next() != Some("loop") {
                    return Err(MeshError::stl_parse(line, "expected `outer loop`"));
                }
                corners.clear();
                State::Loop
            }
            (State::Loop, "vertex") => {
                if corners.len() == 3 {
                    return Err(MeshError::stl_parse(line, "more than three vertices in a facet"));
                }
                corners.push(parse_vector(words, line)?);
                State::Loop
            }
            (State::Loop, "endloop") => {
                let [a, b, c] = corners[..] else {
                    return Err(MeshError::stl_parse(
                        line,
                        format!("facet has {} vertices, expected 3", corners.len()),
                    ));
                };
                triangles.push(Triangle {
                    normal,
                    vertices: [a, b, c],
                });
                State::LoopClosed
            }
            (State::LoopClosed, "endfacet") => State::Solid,
            (State::Done, _) => {
                return Err(MeshError::stl_parse(line, "content after `endsolid`"));
            }
            (_, other) => {
                return Err(MeshError::stl_parse(line, format!("unexpected `{other}`")));
            }
        };
    }

    if state != State::Done {
        return Err(MeshError::stl_parse(last_line, "missing `endsolid`"));
    }
    Ok(StlSolid { name, triangles })
}

fn parse_vector<'a>(words: impl Iterator<Item = &'a str>, line: usize) -> MeshResult<DVec3> {
    let values = words
        .map(|word| {
            word.parse::<f64>()
                .map_err(|_| MeshError::stl_parse(line, format!("invalid number `{word}`")))
        })
        .collect::<MeshResult<Vec<f64>>>()?;
    match values[..] {
        [x, y, z] => Ok(DVec3::new(x, y, z)),
        _ => Err(MeshError::stl_parse(
            line,
            format!("expected 3 numbers, got {}", values.len()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Polygon;

    fn square() -> Mesh {
        Mesh::from_polygons(vec![Polygon::new(vec![
            DVec3::new(0.0, 0.0, 0.0),
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(1.0, 1.0, 0.0),
            DVec3::new(0.0, 1.0, 0.0),
        ])])
    }

    // =========================================================================
    // WRITER TESTS
    // =========================================================================

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1.000000");
        assert_eq!(format_number(-2.5), "-2.500000");
        assert_eq!(format_number(1.0 / 3.0), "0.333333");
        assert_eq!(format_number(-0.0), "0.000000");
        assert_eq!(format_number(-0.0000001), "0.000000");
        assert_eq!(format_number(-0.000001), "-0.000001");
    }

    #[test]
    fn test_write_square() {
        let stl = stl_string("square", &[&square()]);
        let expected = "\
solid square
  facet normal 0.000000 0.000000 1.000000
    outer loop
      vertex 0.000000 0.000000 0.000000
      vertex 1.000000 0.000000 0.000000
      vertex 1.000000 1.000000 0.000000
    endloop
  endfacet
  facet normal 0.000000 0.000000 1.000000
    outer loop
      vertex 0.000000 0.000000 0.000000
      vertex 1.000000 1.000000 0.000000
      vertex 0.000000 1.000000 0.000000
    endloop
  endfacet
endsolid square
";
        assert_eq!(stl, expected);
    }

    #[test]
    fn test_degenerate_triangle_zero_normal() {
        let mesh = Mesh::from_polygons(vec![Polygon::new(vec![
            DVec3::ZERO,
            DVec3::X,
            DVec3::X * 2.0,
        ])]);
        let stl = stl_string("flat", &[&mesh]);
        assert!(stl.contains("facet normal 0.000000 0.000000 0.000000"));
    }

    #[test]
    fn test_several_meshes_share_one_solid() {
        let a = square();
        let mut b = square();
        b.translate(DVec3::Z);
        let stl = stl_string("pair", &[&a, &b]);
        assert_eq!(stl.matches("solid pair").count(), 2);
        assert_eq!(stl.matches("facet normal").count(), 4);
    }

    // =========================================================================
    // PARSER TESTS
    // =========================================================================

    #[test]
    fn test_round_trip() {
        let stl = stl_string("square", &[&square()]);
        let solid = parse_stl(&stl).unwrap();
        assert_eq!(solid.name, "square");
        assert_eq!(solid.triangles, square().triangulate());
    }

    #[test]
    fn test_parse_rejects_bad_number() {
        let input = "solid x\n  facet normal 0 0 one\n";
        let err = parse_stl(input).unwrap_err();
        assert!(matches!(err, MeshError::StlParse { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_short_facet() {
        let input = "solid x\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 1 0 0\nendloop\n";
        let err = parse_stl(input).unwrap_err();
        assert!(matches!(err, MeshError::StlParse { line: 6, .. }));
    }

    #[test]
    fn test_parse_rejects_missing_endsolid() {
        let err = parse_stl("solid x\n").unwrap_err();
        assert!(matches!(err, MeshError::StlParse { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_trailing_content() {
        let err = parse_stl("solid x\nendsolid x\nsolid y\n").unwrap_err();
        assert!(matches!(err, MeshError::StlParse { line: 3, .. }));
    }

    #[test]
    fn test_parse_empty_solid() {
        let solid = parse_stl("solid\nendsolid\n").unwrap();
        assert!(solid.name.is_empty());
        assert!(solid.triangles.is_empty());
    }
}
