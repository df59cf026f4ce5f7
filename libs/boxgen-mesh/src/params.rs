//! # Parameter Record
//!
//! User-facing box parameters and their resolution into clamped, absolute
//! values consumed by the builders.
//!
//! `BoxParams` mirrors the JSON record sent by the UI (camelCase keys, every
//! field optional with a default). `BoxParams::resolve` validates it once and
//! produces a [`ResolvedParams`]: clamps are applied, divider percentages are
//! mapped to sorted box-frame coordinates, and optional parts become `Option`s.
//!
//! ## Example
//!
//! ```rust
//! use boxgen_mesh::params::BoxParams;
//!
//! let params = BoxParams::from_json(r#"{"width": 100, "divisionsX": [50]}"#).unwrap();
//! let resolved = params.resolve().unwrap();
//! assert_eq!(resolved.dividers_x, vec![0.0]);
//! ```

use config::constants::{
    ENGRAVE_DEPTH_RATIO, HINGE_MIN_BARREL_WALL, HINGE_PIN_CLEARANCE, MAX_DIVISION_PERCENT,
    MAX_HINGE_COUNT, MAX_TEXT_CHARS, MIN_DIVISION_PERCENT,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{MeshError, MeshResult};

// =============================================================================
// PARAMETER RECORD
// =============================================================================

/// How lid text is applied to the cap's outer face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Text is cut into the cap.
    #[default]
    Engraved,
    /// Text stands proud of the cap.
    Embossed,
}

/// The full parameter record for one generation call.
///
/// All lengths are millimetres. `divisions_x` / `divisions_z` are percentages
/// (1–99) along the inner width and inner depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxParams {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub wall_thickness: f64,
    pub include_lid: bool,
    pub lid_height: f64,
    pub lid_tolerance: f64,
    pub divisions_x: Vec<f64>,
    pub divisions_z: Vec<f64>,
    pub lid_text: String,
    pub lid_text_size: f64,
    pub lid_text_depth: f64,
    pub lid_text_style: TextStyle,
    pub chamfer_size: f64,
    pub include_hinge: bool,
    pub hinge_count: u32,
    pub hinge_diameter: f64,
    pub hinge_pin_diameter: f64,
}

impl Default for BoxParams {
    fn default() -> Self {
        Self {
            width: 80.0,
            depth: 60.0,
            height: 40.0,
            wall_thickness: 2.0,
            include_lid: true,
            lid_height: 5.0,
            lid_tolerance: 0.3,
            divisions_x: Vec::new(),
            divisions_z: Vec::new(),
            lid_text: String::new(),
            lid_text_size: 10.0,
            lid_text_depth: 1.0,
            lid_text_style: TextStyle::Engraved,
            chamfer_size: 0.0,
            include_hinge: false,
            hinge_count: 2,
            hinge_diameter: 6.0,
            hinge_pin_diameter: 3.0,
        }
    }
}

impl BoxParams {
    /// Decodes a parameter record from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> MeshResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encodes the record as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> MeshResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Returns the `{W}x{D}x{H}` label used in exported file names.
    ///
    /// Numbers use their shortest round-trip form, so `80.0` prints as `80`.
    pub fn dimension_label(&self) -> String {
        format!("{}x{}x{}", self.width, self.depth, self.height)
    }

    /// Validates the record and applies every clamp.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] for non-finite numbers,
    /// non-positive box dimensions, or a wall so thick that no cavity remains.
    pub fn resolve(&self) -> MeshResult<ResolvedParams> {
        self.check_finite()?;

        for (name, value) in [
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
            ("wallThickness", self.wall_thickness),
        ] {
            if value <= 0.0 {
                return Err(MeshError::invalid(name, format!("must be positive, got {value}")));
            }
        }

        let wall = self.wall_thickness;
        if 2.0 * wall >= self.width.min(self.depth) {
            return Err(MeshError::invalid(
                "wallThickness",
                format!(
                    "{wall} leaves no cavity in a {}x{} footprint",
                    self.width, self.depth
                ),
            ));
        }
        if wall >= self.height {
            return Err(MeshError::invalid(
                "wallThickness",
                format!("{wall} leaves no cavity in a box {} high", self.height),
            ));
        }

        let chamfer = self.resolve_chamfer();
        let dividers_x = map_divisions(&self.divisions_x, self.width - 2.0 * wall);
        let dividers_y = map_divisions(&self.divisions_z, self.depth - 2.0 * wall);

        let lid = self.include_lid.then(|| self.resolve_lid());
        let hinge = match (self.include_hinge, self.include_lid) {
            (true, true) => Some(self.resolve_hinge()),
            (true, false) => {
                warn!("hinge requested without a lid; skipping hinge geometry");
                None
            }
            _ => None,
        };

        Ok(ResolvedParams {
            width: self.width,
            depth: self.depth,
            height: self.height,
            wall,
            chamfer,
            dividers_x,
            dividers_y,
            lid,
            hinge,
        })
    }

    fn check_finite(&self) -> MeshResult<()> {
        let scalars = [
            ("width", self.width),
            ("depth", self.depth),
            ("height", self.height),
            ("wallThickness", self.wall_thickness),
            ("lidHeight", self.lid_height),
            ("lidTolerance", self.lid_tolerance),
            ("lidTextSize", self.lid_text_size),
            ("lidTextDepth", self.lid_text_depth),
            ("chamferSize", self.chamfer_size),
            ("hingeDiameter", self.hinge_diameter),
            ("hingePinDiameter", self.hinge_pin_diameter),
        ];
        for (name, value) in scalars {
            if !value.is_finite() {
                return Err(MeshError::invalid(name, "must be a finite number"));
            }
        }
        for (name, list) in [
            ("divisionsX", &self.divisions_x),
            ("divisionsZ", &self.divisions_z),
        ] {
            if list.iter().any(|p| !p.is_finite()) {
                return Err(MeshError::invalid(name, "contains a non-finite position"));
            }
        }
        Ok(())
    }

    fn resolve_chamfer(&self) -> f64 {
        let limit = self
            .wall_thickness
            .min(self.width / 4.0)
            .min(self.depth / 4.0);
        let chamfer = self.chamfer_size.max(0.0);
        if chamfer > limit {
            warn!(requested = chamfer, clamped = limit, "chamfer clamped");
        }
        chamfer.min(limit)
    }

    fn resolve_lid(&self) -> LidSpec {
        let max_lip = self.height - self.wall_thickness;
        let lip_height = self.lid_height.clamp(0.0, max_lip);
        if lip_height != self.lid_height {
            warn!(requested = self.lid_height, clamped = lip_height, "lid height clamped");
        }
        LidSpec {
            lip_height,
            tolerance: self.lid_tolerance.max(0.0),
            text: self.resolve_text(),
        }
    }

    fn resolve_text(&self) -> Option<TextSpec> {
        let trimmed = self.lid_text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if self.lid_text_size <= 0.0 || self.lid_text_depth <= 0.0 {
            warn!(
                size = self.lid_text_size,
                depth = self.lid_text_depth,
                "non-positive text size or depth; text skipped"
            );
            return None;
        }

        let text: String = trimmed.chars().take(MAX_TEXT_CHARS).collect();
        let depth = match self.lid_text_style {
            TextStyle::Engraved => self
                .lid_text_depth
                .min(self.wall_thickness * ENGRAVE_DEPTH_RATIO),
            TextStyle::Embossed => self.lid_text_depth,
        };

        Some(TextSpec {
            text,
            size: self.lid_text_size,
            depth,
            style: self.lid_text_style,
        })
    }

    fn resolve_hinge(&self) -> HingeSpec {
        let count = self.hinge_count.clamp(1, MAX_HINGE_COUNT);
        let barrel_radius = (self.hinge_diameter / 2.0).max(self.wall_thickness);

        let max_bore = (barrel_radius - HINGE_MIN_BARREL_WALL).max(barrel_radius / 2.0);
        let min_bore = (2.0 * HINGE_PIN_CLEARANCE).min(max_bore);
        let bore_radius = (self.hinge_pin_diameter / 2.0).min(max_bore).max(min_bore);

        let pin_radius = if bore_radius > 2.0 * HINGE_PIN_CLEARANCE {
            bore_radius - HINGE_PIN_CLEARANCE
        } else {
            bore_radius / 2.0
        };

        HingeSpec {
            count,
            barrel_radius,
            bore_radius,
            pin_radius,
            clearance: self.lid_tolerance.max(0.0),
        }
    }
}

/// Maps divider percentages to sorted coordinates along an inner span
/// centred on the origin.
fn map_divisions(percentages: &[f64], inner: f64) -> Vec<f64> {
    let mut coords: Vec<f64> = percentages
        .iter()
        .map(|p| {
            let p = p.clamp(MIN_DIVISION_PERCENT, MAX_DIVISION_PERCENT);
            -inner / 2.0 + p / 100.0 * inner
        })
        .collect();
    coords.sort_by(f64::total_cmp);
    coords
}

// =============================================================================
// RESOLVED PARAMETERS
// =============================================================================

/// Parameters after validation and clamping, in box-frame coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedParams {
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    pub wall: f64,
    /// Chamfer leg, already clamped to `min(chamfer, wall, W/4, D/4)`.
    pub chamfer: f64,
    /// Centrelines of dividers crossing the width, sorted ascending (box X).
    pub dividers_x: Vec<f64>,
    /// Centrelines of dividers crossing the depth, sorted ascending (box Y).
    pub dividers_y: Vec<f64>,
    pub lid: Option<LidSpec>,
    pub hinge: Option<HingeSpec>,
}

impl ResolvedParams {
    /// Half of the outer width.
    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    /// Half of the outer depth.
    pub fn half_depth(&self) -> f64 {
        self.depth / 2.0
    }
}

/// Lid settings after clamping.
#[derive(Debug, Clone, PartialEq)]
pub struct LidSpec {
    /// Lip height, at most `height - wall`.
    pub lip_height: f64,
    /// Gap between lip and box inner wall on each side.
    pub tolerance: f64,
    pub text: Option<TextSpec>,
}

/// Lid text settings. Only present for non-blank text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpec {
    pub text: String,
    /// Glyph height in millimetres.
    pub size: f64,
    /// Engraving or embossing depth.
    pub depth: f64,
    pub style: TextStyle,
}

/// Hinge settings after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HingeSpec {
    pub count: u32,
    pub barrel_radius: f64,
    pub bore_radius: f64,
    pub pin_radius: f64,
    /// Distance between the barrels and the back wall: the lid fit tolerance.
    pub clearance: f64,
}
