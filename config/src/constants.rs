//! # Configuration Constants
//!
//! Centralized constants for the box generation kernel. All tolerances,
//! tessellation parameters, text raster settings and hinge dimensions are
//! defined here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Resolution**: Tessellation and raster resolution
//! - **Limits**: Bounds applied to user input
//! - **Hinge**: Knuckle and pin dimensions
//! - **Export**: Serialization formatting

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Tolerance for grid breakpoints and cell classification.
///
/// Two breakpoints closer than this are merged into one, which removes
/// zero-width cells caused by duplicate divider positions or a chamfer equal
/// to the wall thickness.
///
/// # Example
///
/// ```rust
/// use config::constants::GEOMETRY_EPSILON;
///
/// fn same_breakpoint(a: f64, b: f64) -> bool {
///     (a - b).abs() < GEOMETRY_EPSILON
/// }
///
/// assert!(same_breakpoint(2.0, 2.0005));
/// assert!(!same_breakpoint(2.0, 2.01));
/// ```
pub const GEOMETRY_EPSILON: f64 = 1e-3;

/// Tolerance used by BSP plane classification.
///
/// A vertex whose signed distance to a splitting plane is within this value
/// is treated as lying on the plane.
///
/// # Example
///
/// ```rust
/// use config::constants::PLANE_EPSILON;
///
/// let distance: f64 = 4e-6;
/// assert!(distance.abs() < PLANE_EPSILON);
/// ```
pub const PLANE_EPSILON: f64 = 1e-5;

/// Distance by which CSG cutters extend past the faces they cut.
///
/// Cutting blocks that would otherwise be coplanar with the stock's faces
/// overshoot by this amount so boolean results do not keep paper-thin skins.
pub const CUTTER_OVERSHOOT: f64 = 0.01;

/// Quantization step for welding vertices and matching edges.
///
/// Positions are rounded to multiples of this step before being hashed.
///
/// # Example
///
/// ```rust
/// use config::constants::WELD_QUANTUM;
///
/// let key = (1.0000004_f64 / WELD_QUANTUM).round() as i64;
/// assert_eq!(key, 1_000_000);
/// ```
pub const WELD_QUANTUM: f64 = 1e-6;

/// Distance within which CSG output vertices are merged and snapped onto
/// neighbouring edges.
///
/// Boolean results can leave a vertex lying on the interior of an adjacent
/// polygon's edge. Sealing inserts such vertices into that edge so every
/// edge is shared by exactly two faces.
///
/// # Example
///
/// ```rust
/// use config::constants::{PLANE_EPSILON, SEAL_TOLERANCE};
///
/// assert!(SEAL_TOLERANCE > PLANE_EPSILON);
/// ```
pub const SEAL_TOLERANCE: f64 = 1e-4;

// =============================================================================
// RESOLUTION CONSTANTS
// =============================================================================

/// Default segment count for cylinders (hinge barrels, bores and pins).
///
/// # Example
///
/// ```rust
/// use config::constants::DEFAULT_SEGMENTS;
///
/// let angle = std::f64::consts::TAU / DEFAULT_SEGMENTS as f64;
/// assert!(angle < 0.2);
/// ```
pub const DEFAULT_SEGMENTS: u32 = 32;

/// Minimum segment count accepted for a cylinder.
pub const MIN_SEGMENTS: u32 = 3;

/// Raster resolution used when converting lid text to geometry.
///
/// # Example
///
/// ```rust
/// use config::constants::TEXT_PIXELS_PER_MM;
///
/// let pixel_size_mm = 1.0 / TEXT_PIXELS_PER_MM;
/// assert_eq!(pixel_size_mm, 0.5);
/// ```
pub const TEXT_PIXELS_PER_MM: f64 = 2.0;

/// Luminance below which a raster pixel counts as ink.
///
/// The text raster is drawn black on white, so anything darker than mid
/// grey becomes part of a text prism.
pub const TEXT_LUMINANCE_THRESHOLD: u8 = 128;

/// Cell size of the built-in bitmap font, in font pixels.
pub const BUILTIN_GLYPH_SIZE: u32 = 8;

/// Extra stroke width added to each glyph column, as a fraction of the scale.
///
/// The built-in glyphs are thickened by this fraction of one font pixel
/// (at least one raster pixel) to get a bold face.
pub const TEXT_BOLD_FRACTION: f64 = 0.125;

/// Vertical distance between text lines, as a multiple of the font size.
pub const TEXT_LINE_SPACING: f64 = 1.2;

// =============================================================================
// LIMITS
// =============================================================================

/// Smallest accepted divider position, as a percentage of the inner span.
///
/// # Example
///
/// ```rust
/// use config::constants::{MIN_DIVISION_PERCENT, MAX_DIVISION_PERCENT};
///
/// let requested = 120.0_f64;
/// let clamped = requested.clamp(MIN_DIVISION_PERCENT, MAX_DIVISION_PERCENT);
/// assert_eq!(clamped, 99.0);
/// ```
pub const MIN_DIVISION_PERCENT: f64 = 1.0;

/// Largest accepted divider position, as a percentage of the inner span.
pub const MAX_DIVISION_PERCENT: f64 = 99.0;

/// Fraction of the wall thickness an engraving may cut into the cap.
///
/// # Example
///
/// ```rust
/// use config::constants::ENGRAVE_DEPTH_RATIO;
///
/// let wall = 2.0;
/// let depth = 3.0_f64.min(wall * ENGRAVE_DEPTH_RATIO);
/// assert_eq!(depth, 1.5);
/// ```
pub const ENGRAVE_DEPTH_RATIO: f64 = 0.75;

/// Maximum number of characters rasterized for lid text.
pub const MAX_TEXT_CHARS: usize = 256;

/// Maximum number of pixels in the text raster surface.
///
/// Bounds memory for unusually large lids (4096 x 4096 pixels).
pub const MAX_RASTER_PIXELS: u64 = 4096 * 4096;

// =============================================================================
// HINGE CONSTANTS
// =============================================================================

/// Maximum number of hinges along the back edge.
pub const MAX_HINGE_COUNT: u32 = 3;

/// Air gap between neighbouring knuckles.
pub const HINGE_KNUCKLE_GAP: f64 = 0.4;

/// Radial clearance between the pin and the knuckle bore.
///
/// # Example
///
/// ```rust
/// use config::constants::HINGE_PIN_CLEARANCE;
///
/// let bore_radius = 1.5;
/// let pin_radius = bore_radius - HINGE_PIN_CLEARANCE;
/// assert!(pin_radius < bore_radius);
/// ```
pub const HINGE_PIN_CLEARANCE: f64 = 0.2;

/// Length by which the pin sticks out past the outer knuckles at each end.
pub const HINGE_PIN_OVERHANG: f64 = 1.0;

/// Knuckle width as a multiple of the barrel diameter.
pub const HINGE_KNUCKLE_WIDTH_FACTOR: f64 = 1.5;

/// Minimum material left between the bore and the outside of a barrel.
pub const HINGE_MIN_BARREL_WALL: f64 = 0.8;

/// Hinge centre offsets as fractions of the box width, for two hinges.
pub const HINGE_OFFSETS_TWO: [f64; 2] = [-0.30, 0.30];

/// Hinge centre offsets as fractions of the box width, for three hinges.
pub const HINGE_OFFSETS_THREE: [f64; 3] = [-0.25, 0.0, 0.25];

// =============================================================================
// EXPORT CONSTANTS
// =============================================================================

/// Number of decimals written for every STL coordinate and normal component.
///
/// # Example
///
/// ```rust
/// use config::constants::STL_DECIMALS;
///
/// let text = format!("{:.*}", STL_DECIMALS, 1.0_f64 / 3.0);
/// assert_eq!(text, "0.333333");
/// ```
pub const STL_DECIMALS: usize = 6;

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Returns the hinge centre offsets (fractions of the box width) for a count.
///
/// Counts outside `1..=MAX_HINGE_COUNT` are clamped into range.
///
/// # Example
///
/// ```rust
/// use config::constants::hinge_offsets;
///
/// assert_eq!(hinge_offsets(1), &[0.0]);
/// assert_eq!(hinge_offsets(2), &[-0.30, 0.30]);
/// assert_eq!(hinge_offsets(9).len(), 3);
/// ```
pub fn hinge_offsets(count: u32) -> &'static [f64] {
    match count.clamp(1, MAX_HINGE_COUNT) {
        1 => &[0.0],
        2 => &HINGE_OFFSETS_TWO,
        _ => &HINGE_OFFSETS_THREE,
    }
}

/// Checks if two f64 values are approximately equal within GEOMETRY_EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_equal;
///
/// assert!(approx_equal(1.0, 1.0 + 1e-4));
/// assert!(!approx_equal(1.0, 1.1));
/// ```
#[inline]
pub fn approx_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < GEOMETRY_EPSILON
}

/// Checks if a f64 value is approximately zero within GEOMETRY_EPSILON.
///
/// # Example
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(1e-4));
/// assert!(!approx_zero(0.1));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < GEOMETRY_EPSILON
}
