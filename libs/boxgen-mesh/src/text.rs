//! # Text Rasterizer
//!
//! Turns lid text into a merged CSG solid of block prisms.
//!
//! ## Pipeline
//!
//! 1. Render the text into an off-screen [`GrayImage`] covering the lid
//!    footprint at [`TEXT_PIXELS_PER_MM`]: white background, black bold
//!    glyphs, lines centred horizontally and the block centred vertically.
//! 2. Run-length encode each row into spans of dark pixels (luminance below
//!    [`TEXT_LUMINANCE_THRESHOLD`]); identical spans in consecutive rows are
//!    coalesced into one rectangle.
//! 3. Map every rectangle to a block prism over the requested Z range and
//!    merge them with [`balanced_union`].
//!
//! Glyphs come from the built-in 8×8 bitmap font or from a TrueType font
//! loaded at runtime. Characters without a glyph render nothing and are
//! reported by [`TextRasterizer::missing_glyphs`] and a warning.
//!
//! ## Example
//!
//! ```rust
//! use boxgen_mesh::text::{TextRasterizer, TextRequest};
//!
//! let rasterizer = TextRasterizer::builtin();
//! let request = TextRequest::new("HI", 80.0, 60.0, 10.0, 0.0, 1.0);
//! let solid = rasterizer.rasterize(&request).unwrap();
//! assert!(solid.is_some());
//! ```

use std::path::Path;

use config::constants::{
    BUILTIN_GLYPH_SIZE, MAX_RASTER_PIXELS, TEXT_BOLD_FRACTION, TEXT_LINE_SPACING,
    TEXT_LUMINANCE_THRESHOLD, TEXT_PIXELS_PER_MM,
};
use font8x8::{
    UnicodeFonts, BASIC_FONTS, BLOCK_FONTS, BOX_FONTS, GREEK_FONTS, HIRAGANA_FONTS, LATIN_FONTS,
    MISC_FONTS, SGA_FONTS,
};
use glam::DVec3;
use image::{imageops, GrayImage, Luma};
use rusttype::{point, Font, Scale};
use tracing::{debug, warn};

use crate::csg::{balanced_union, CsgNode, Primitive};
use crate::error::{MeshError, MeshResult};

const BACKGROUND: Luma<u8> = Luma([255]);

// =============================================================================
// REQUEST
// =============================================================================

/// What to render and where the resulting prisms go.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest<'a> {
    pub text: &'a str,
    /// Footprint width (X) in millimetres, centred on the origin.
    pub width: f64,
    /// Footprint depth (Y) in millimetres, centred on the origin.
    pub depth: f64,
    /// Glyph height in millimetres.
    pub size: f64,
    pub z_min: f64,
    pub z_max: f64,
    /// Mirror along X, for faces seen from below.
    pub mirror_x: bool,
}

impl<'a> TextRequest<'a> {
    /// Creates an unmirrored request.
    pub fn new(text: &'a str, width: f64, depth: f64, size: f64, z_min: f64, z_max: f64) -> Self {
        Self {
            text,
            width,
            depth,
            size,
            z_min,
            z_max,
            mirror_x: false,
        }
    }

    /// Sets X mirroring.
    pub fn mirrored(mut self, mirror_x: bool) -> Self {
        self.mirror_x = mirror_x;
        self
    }
}

// =============================================================================
// RASTER MASK
// =============================================================================

/// A rectangle of pixels, half-open on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub x1: u32,
    pub y0: u32,
    pub y1: u32,
}

/// Rendered text over the footprint.
#[derive(Debug, Clone)]
pub struct RasterMask {
    image: GrayImage,
    /// Millimetres per pixel along X and Y.
    pixel_size: (f64, f64),
}

impl RasterMask {
    /// The underlying grayscale image.
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// True if the pixel counts as ink.
    pub fn is_dark(&self, x: u32, y: u32) -> bool {
        self.image.get_pixel(x, y)[0] < TEXT_LUMINANCE_THRESHOLD
    }

    /// Number of ink pixels.
    pub fn ink_pixels(&self) -> usize {
        self.image
            .pixels()
            .filter(|p| p[0] < TEXT_LUMINANCE_THRESHOLD)
            .count()
    }

    /// Dark runs of one row as `(start, end)` with `end` exclusive.
    pub fn row_spans(&self, y: u32) -> Vec<(u32, u32)> {
        let mut spans = Vec::new();
        let mut start = None;
        for x in 0..self.image.width() {
            match (self.is_dark(x, y), start) {
                (true, None) => start = Some(x),
                (false, Some(s)) => {
                    spans.push((s, x));
                    start = None;
                }
                _ => {}
            }
        }
        if let Some(s) = start {
            spans.push((s, self.image.width()));
        }
        spans
    }

    /// Row spans with identical spans in consecutive rows merged.
    ///
    /// Sorted by top row, then left column.
    pub fn rectangles(&self) -> Vec<PixelRect> {
        let mut closed = Vec::new();
        let mut open: Vec<PixelRect> = Vec::new();

        for y in 0..self.image.height() {
            let mut still_open = Vec::new();
            for (x0, x1) in self.row_spans(y) {
                match open.iter().position(|r| r.x0 == x0 && r.x1 == x1) {
                    Some(index) => {
                        let mut rect = open.swap_remove(index);
                        rect.y1 = y + 1;
                        still_open.push(rect);
                    }
                    None => still_open.push(PixelRect {
                        x0,
                        x1,
                        y0: y,
                        y1: y + 1,
                    }),
                }
            }
            closed.append(&mut open);
            open = still_open;
        }
        closed.append(&mut open);

        closed.sort_by_key(|r| (r.y0, r.x0));
        closed
    }
}

// =============================================================================
// FONTS
// =============================================================================

/// Where glyphs come from.
#[derive(Clone)]
pub enum FontSource {
    /// The built-in 8×8 bitmap font.
    Builtin,
    /// A TrueType font loaded at runtime.
    TrueType(Font<'static>),
}

impl std::fmt::Debug for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSource::Builtin => write!(f, "Builtin"),
            FontSource::TrueType(font) => write!(f, "TrueType({} glyphs)", font.glyph_count()),
        }
    }
}

/// 8×8 bitmap for a character, searching every built-in table.
///
/// Row bytes have bit 0 as the leftmost pixel.
fn builtin_glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| GREEK_FONTS.get(c))
        .or_else(|| BOX_FONTS.get(c))
        .or_else(|| BLOCK_FONTS.get(c))
        .or_else(|| HIRAGANA_FONTS.get(c))
        .or_else(|| MISC_FONTS.get(c))
        .or_else(|| SGA_FONTS.get(c))
}

// =============================================================================
// RASTERIZER
// =============================================================================

/// Renders text into prisms.
#[derive(Debug, Clone)]
pub struct TextRasterizer {
    font: FontSource,
    pixels_per_mm: f64,
}

impl Default for TextRasterizer {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TextRasterizer {
    /// Rasterizer using the built-in bitmap font.
    pub fn builtin() -> Self {
        Self {
            font: FontSource::Builtin,
            pixels_per_mm: TEXT_PIXELS_PER_MM,
        }
    }

    /// Rasterizer using a TrueType font from memory.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::Font`] if the bytes are not a usable font.
    pub fn from_ttf_bytes(bytes: Vec<u8>) -> MeshResult<Self> {
        let font = Font::try_from_vec(bytes)
            .ok_or_else(|| MeshError::font("not a TrueType or OpenType font"))?;
        Ok(Self {
            font: FontSource::TrueType(font),
            pixels_per_mm: TEXT_PIXELS_PER_MM,
        })
    }

    /// Rasterizer using a TrueType font file.
    pub fn from_ttf_file(path: impl AsRef<Path>) -> MeshResult<Self> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_ttf_bytes(bytes)
    }

    /// Glyph source in use.
    pub fn font(&self) -> &FontSource {
        &self.font
    }

    /// Characters of `text` the font cannot draw, each listed once in order
    /// of appearance. Whitespace and control characters are never reported.
    pub fn missing_glyphs(&self, text: &str) -> Vec<char> {
        let mut missing = Vec::new();
        for c in text.chars().filter(|c| !c.is_whitespace() && !c.is_control()) {
            let drawable = match &self.font {
                FontSource::Builtin => builtin_glyph(c).is_some(),
                FontSource::TrueType(font) => font.glyph(c).id().0 != 0,
            };
            if !drawable && !missing.contains(&c) {
                missing.push(c);
            }
        }
        missing
    }

    /// Renders the request into a mask, or `None` for blank text or no ink.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::InvalidParameter`] if the footprint needs more
    /// than [`MAX_RASTER_PIXELS`] pixels.
    pub fn render(&self, request: &TextRequest<'_>) -> MeshResult<Option<RasterMask>> {
        if request.text.trim().is_empty() || request.size <= 0.0 {
            return Ok(None);
        }

        let px_w = (request.width * self.pixels_per_mm).ceil().max(1.0) as u32;
        let px_h = (request.depth * self.pixels_per_mm).ceil().max(1.0) as u32;
        if u64::from(px_w) * u64::from(px_h) > MAX_RASTER_PIXELS {
            return Err(MeshError::invalid(
                "lidText",
                format!("text surface of {px_w}x{px_h} pixels is too large"),
            ));
        }

        let missing = self.missing_glyphs(request.text);
        if !missing.is_empty() {
            warn!(
                missing = %missing.iter().collect::<String>(),
                font = ?self.font,
                "characters without a glyph are skipped"
            );
        }

        let mut image = GrayImage::from_pixel(px_w, px_h, BACKGROUND);
        let font_px = request.size * self.pixels_per_mm;
        let lines: Vec<&str> = request.text.lines().collect();
        let line_pitch = font_px * TEXT_LINE_SPACING;
        let block_height = font_px + line_pitch * (lines.len().saturating_sub(1)) as f64;
        let top = (f64::from(px_h) - block_height) / 2.0;

        for (index, line) in lines.iter().enumerate() {
            let line_top = top + line_pitch * index as f64;
            match &self.font {
                FontSource::Builtin => draw_builtin_line(&mut image, line, font_px, line_top),
                FontSource::TrueType(font) => draw_truetype_line(&mut image, font, line, font_px, line_top),
            }
        }

        if request.mirror_x {
            imageops::flip_horizontal_in_place(&mut image);
        }

        let mask = RasterMask {
            image,
            pixel_size: (
                request.width / f64::from(px_w),
                request.depth / f64::from(px_h),
            ),
        };
        if mask.ink_pixels() == 0 {
            debug!(text = request.text, "text produced no ink");
            return Ok(None);
        }
        Ok(Some(mask))
    }

    /// Renders the request and merges its pixel rectangles into one solid.
    pub fn rasterize(&self, request: &TextRequest<'_>) -> MeshResult<Option<CsgNode>> {
        let Some(mask) = self.render(request)? else {
            return Ok(None);
        };

        let (sx, sy) = mask.pixel_size;
        let (left, back) = (-request.width / 2.0, request.depth / 2.0);
        let prisms: Vec<CsgNode> = mask
            .rectangles()
            .into_iter()
            .map(|r| {
                CsgNode::leaf(Primitive::block(
                    DVec3::new(left + f64::from(r.x0) * sx, back - f64::from(r.y1) * sy, request.z_min),
                    DVec3::new(left + f64::from(r.x1) * sx, back - f64::from(r.y0) * sy, request.z_max),
                ))
            })
            .collect();

        debug!(
            ink_pixels = mask.ink_pixels(),
            prisms = prisms.len(),
            "text rasterized"
        );
        Ok(balanced_union(prisms))
    }
}

/// Extra stroke width in pixels that makes glyphs bold.
fn bold_width(font_px: f64) -> f64 {
    (font_px / f64::from(BUILTIN_GLYPH_SIZE) * TEXT_BOLD_FRACTION).max(1.0)
}

/// Darkens pixels whose centres fall inside `[x0, x1) × [y0, y1)`.
fn fill_rect(image: &mut GrayImage, x0: f64, y0: f64, x1: f64, y1: f64, luma: u8) {
    let clamp_x = |v: f64| v.round().clamp(0.0, f64::from(image.width())) as u32;
    let clamp_y = |v: f64| v.round().clamp(0.0, f64::from(image.height())) as u32;
    let (xa, xb, ya, yb) = (clamp_x(x0), clamp_x(x1), clamp_y(y0), clamp_y(y1));
    for y in ya..yb {
        for x in xa..xb {
            let pixel = image.get_pixel_mut(x, y);
            pixel[0] = pixel[0].min(luma);
        }
    }
}

fn draw_builtin_line(image: &mut GrayImage, line: &str, font_px: f64, line_top: f64) {
    let cell = f64::from(BUILTIN_GLYPH_SIZE);
    let scale = font_px / cell;
    let bold = bold_width(font_px);
    let advance = cell * scale;
    let line_width = advance * line.chars().count() as f64;
    let left = (f64::from(image.width()) - line_width) / 2.0;

    for (index, c) in line.chars().enumerate() {
        let Some(rows) = builtin_glyph(c) else {
            continue;
        };
        let glyph_left = left + advance * index as f64;
        for (row, bits) in rows.iter().enumerate() {
            for column in 0..BUILTIN_GLYPH_SIZE {
                if bits & (1 << column) == 0 {
                    continue;
                }
                let x = glyph_left + f64::from(column) * scale;
                let y = line_top + row as f64 * scale;
                fill_rect(image, x, y, x + scale + bold, y + scale, 0);
            }
        }
    }
}

fn draw_truetype_line(image: &mut GrayImage, font: &Font<'static>, line: &str, font_px: f64, line_top: f64) {
    let scale = Scale::uniform(font_px as f32);
    let ascent = font.v_metrics(scale).ascent;
    let glyphs: Vec<_> = font.layout(line, scale, point(0.0, ascent)).collect();
    let line_width = glyphs
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0);
    let left = (f64::from(image.width()) - f64::from(line_width)) / 2.0;
    let bold = bold_width(font_px).round() as i64;
    let (width, height) = (i64::from(image.width()), i64::from(image.height()));

    for glyph in glyphs {
        let Some(bounds) = glyph.pixel_bounding_box() else {
            continue;
        };
        glyph.draw(|gx, gy, coverage| {
            let luma = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))) as u8;
            let y = (line_top.round() as i64) + i64::from(bounds.min.y) + i64::from(gy);
            let x = (left.round() as i64) + i64::from(bounds.min.x) + i64::from(gx);
            if !(0..height).contains(&y) {
                return;
            }
            for dx in 0..=bold {
                let xx = x + dx;
                if (0..width).contains(&xx) {
                    let pixel = image.get_pixel_mut(xx as u32, y as u32);
                    pixel[0] = pixel[0].min(luma);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csg::CsgTree;

    fn request(text: &str) -> TextRequest<'_> {
        TextRequest::new(text, 80.0, 60.0, 10.0, 0.0, 1.0)
    }

    #[test]
    fn test_blank_text_has_no_solid() {
        let rasterizer = TextRasterizer::builtin();
        assert!(rasterizer.rasterize(&request("")).unwrap().is_none());
        assert!(rasterizer.rasterize(&request("  \n ")).unwrap().is_none());
    }

    #[test]
    fn test_missing_glyphs_render_nothing() {
        let rasterizer = TextRasterizer::builtin();
        assert!(rasterizer.rasterize(&request("\u{4E2D}")).unwrap().is_none());
        assert!(rasterizer.rasterize(&request("\u{1F4E6}\u{1F4E6}")).unwrap().is_none());
    }

    #[test]
    fn test_missing_glyphs_listed_once() {
        let rasterizer = TextRasterizer::builtin();
        assert_eq!(
            rasterizer.missing_glyphs("Box \u{1F4E6}\u{1F4E6}\n\u{4E2D}"),
            vec!['\u{1F4E6}', '\u{4E2D}']
        );
        assert!(rasterizer.missing_glyphs("Screws\n\tn°5").is_empty());
    }

    #[test]
    fn test_partly_drawable_text_keeps_ink() {
        let rasterizer = TextRasterizer::builtin();
        let mask = rasterizer.render(&request("A\u{1F4E6}")).unwrap().unwrap();
        let alone = rasterizer.render(&request("A")).unwrap().unwrap();
        // Same ink, shifted: the missing glyph still takes its advance
        assert_eq!(mask.ink_pixels(), alone.ink_pixels());
    }

    #[test]
    fn test_builtin_glyph_tables() {
        assert!(builtin_glyph('A').is_some());
        assert!(builtin_glyph('é').is_some());
        assert!(builtin_glyph('λ').is_some());
        assert_eq!(builtin_glyph('\u{2588}'), Some([0xFF; 8]));
    }

    #[test]
    fn test_full_block_coalesces_to_one_rectangle() {
        let rasterizer = TextRasterizer::builtin();
        // 4 mm at 2 px/mm: one pixel per glyph cell plus one bold column
        let mask = rasterizer
            .render(&TextRequest::new("\u{2588}", 20.0, 20.0, 4.0, 0.0, 1.0))
            .unwrap()
            .unwrap();
        let rects = mask.rectangles();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].x1 - rects[0].x0, 9);
        assert_eq!(rects[0].y1 - rects[0].y0, 8);
        assert_eq!(mask.ink_pixels(), 72);
    }

    #[test]
    fn test_text_centred_in_footprint() {
        let rasterizer = TextRasterizer::builtin();
        let mask = rasterizer.render(&request("\u{2588}")).unwrap().unwrap();
        let rects = mask.rectangles();
        // 160 x 120 px canvas, 20 px glyph (+1 bold column) centred
        assert_eq!(rects.len(), 1);
        assert_eq!((rects[0].x0, rects[0].y0), (70, 50));
        assert_eq!((rects[0].x1, rects[0].y1), (91, 70));
    }

    #[test]
    fn test_prisms_stay_inside_footprint_and_z_range() {
        let rasterizer = TextRasterizer::builtin();
        let solid = rasterizer
            .rasterize(&TextRequest::new("HELLO", 80.0, 60.0, 10.0, -0.5, 1.5))
            .unwrap()
            .unwrap();
        let bounds = solid.bounds();
        assert!(bounds.min.x >= -40.0 && bounds.max.x <= 40.0);
        assert!(bounds.min.y >= -30.0 && bounds.max.y <= 30.0);
        assert_eq!(bounds.min.z, -0.5);
        assert_eq!(bounds.max.z, 1.5);
        assert!(CsgTree::new(solid).realize().is_ok());
    }

    #[test]
    fn test_prisms_use_balanced_union() {
        let rasterizer = TextRasterizer::builtin();
        let solid = rasterizer.rasterize(&request("BOX")).unwrap().unwrap();
        let leaves = solid.leaf_count();
        assert!(leaves > 1);
        assert_eq!(solid.depth(), (leaves as f64).log2().ceil() as usize);
    }

    #[test]
    fn test_mirror_flips_ink() {
        let rasterizer = TextRasterizer::builtin();
        let plain = rasterizer.render(&request("F")).unwrap().unwrap();
        let mirrored = rasterizer.render(&request("F").mirrored(true)).unwrap().unwrap();
        let width = plain.image().width();
        for y in 0..plain.image().height() {
            for x in 0..width {
                assert_eq!(plain.is_dark(x, y), mirrored.is_dark(width - 1 - x, y));
            }
        }
    }

    #[test]
    fn test_multiline_text_is_taller() {
        let rasterizer = TextRasterizer::builtin();
        let height = |text: &str| {
            let bounds = rasterizer.rasterize(&request(text)).unwrap().unwrap().bounds();
            bounds.size().y
        };
        assert!(height("AB\nCD") > height("AB") * 1.5);
    }

    #[test]
    fn test_row_spans() {
        let mut image = GrayImage::from_pixel(6, 1, BACKGROUND);
        for x in [1, 2, 5] {
            image.put_pixel(x, 0, Luma([0]));
        }
        let mask = RasterMask {
            image,
            pixel_size: (1.0, 1.0),
        };
        assert_eq!(mask.row_spans(0), vec![(1, 3), (5, 6)]);
    }

    #[test]
    fn test_oversized_surface_rejected() {
        let rasterizer = TextRasterizer::builtin();
        let result = rasterizer.render(&TextRequest::new("A", 5000.0, 5000.0, 10.0, 0.0, 1.0));
        assert_eq!(result.unwrap_err().parameter(), Some("lidText"));
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = TextRasterizer::from_ttf_bytes(vec![0, 1, 2, 3]);
        assert!(matches!(result, Err(MeshError::Font { .. })));
    }
}
