//! Overlay font lookup and text drawing.
//!
//! The requested family is looked up among the system fonts. When it cannot
//! be found, a warning is logged and the default font is used instead: the
//! system sans-serif face if there is one, otherwise a built-in 8x8 bitmap
//! font that is always available.

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use fontdb::{Database, Family, Query};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Pixel size of a built-in bitmap glyph.
const BITMAP_GLYPH_SIZE: u32 = 8;

/// Sans-serif families tried in order before the generic sans-serif alias,
/// which fontdb maps to "Arial" and which most Linux systems lack.
const SANS_SERIF_FAMILIES: &[&str] = &[
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// A font that can draw the overlay text.
pub enum OverlayFont {
    /// A scalable font loaded from a file or the system font database.
    Outline {
        /// Family or file the face came from.
        name: String,
        /// Parsed font face.
        font: FontVec,
    },
    /// Built-in 8x8 bitmap glyphs, scaled by whole pixels.
    Bitmap,
}

impl fmt::Debug for OverlayFont {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlayFont::Outline { name, .. } => f.debug_struct("Outline").field("name", name).finish(),
            OverlayFont::Bitmap => f.write_str("Bitmap"),
        }
    }
}

impl OverlayFont {
    /// Resolve the overlay font, falling back to the default with a warning.
    ///
    /// An explicit `font_file` takes precedence over `family`.
    pub fn resolve(family: &str, font_file: Option<&Path>) -> Self {
        if let Some(path) = font_file {
            match Self::from_file(path) {
                Some(font) => return font,
                None => {
                    warn!(
                        "The font file '{}' could not be loaded. Using default font.",
                        path.display()
                    );
                    return Self::system_default(&system_fonts());
                }
            }
        }

        let db = system_fonts();
        if let Some(font) = query_font(&db, Family::Name(family), family) {
            debug!("Using font '{}'", family);
            return font;
        }

        warn!("The font '{}' is not found. Using default font.", family);
        Self::system_default(&db)
    }

    /// Load a scalable font from a TTF/OTF file.
    pub fn from_file(path: &Path) -> Option<Self> {
        let data = std::fs::read(path).ok()?;
        let font = FontVec::try_from_vec(data).ok()?;
        Some(OverlayFont::Outline {
            name: path.display().to_string(),
            font,
        })
    }

    /// The always-available built-in bitmap font.
    pub fn builtin() -> Self {
        OverlayFont::Bitmap
    }

    /// System sans-serif if present, otherwise the built-in bitmap font.
    fn system_default(db: &Database) -> Self {
        SANS_SERIF_FAMILIES
            .iter()
            .find_map(|&name| query_font(db, Family::Name(name), name))
            .or_else(|| query_font(db, Family::SansSerif, "sans-serif"))
            .unwrap_or_else(Self::builtin)
    }

    /// Family name or file path for outline fonts, `"builtin"` for the bitmap font.
    pub fn name(&self) -> &str {
        match self {
            OverlayFont::Outline { name, .. } => name,
            OverlayFont::Bitmap => "builtin",
        }
    }

    /// Distance in pixels between the tops of consecutive lines.
    pub fn line_height(&self, size: f32) -> u32 {
        match self {
            OverlayFont::Outline { font, .. } => {
                let scaled = font.as_scaled(PxScale::from(size));
                (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32
            }
            OverlayFont::Bitmap => {
                let scale = bitmap_scale(size);
                (BITMAP_GLYPH_SIZE + 2) * scale
            }
        }
    }

    /// Draw possibly multi-line text with its top-left corner at `(x, y)`.
    ///
    /// Glyphs falling outside the canvas are clipped.
    pub fn draw_text(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, size: f32, text: &str) {
        let line_height = self.line_height(size) as i32;
        for (i, line) in text.lines().enumerate() {
            let top = y + i as i32 * line_height;
            match self {
                OverlayFont::Outline { font, .. } => {
                    imageproc::drawing::draw_text_mut(canvas, color, x, top, PxScale::from(size), font, line);
                }
                OverlayFont::Bitmap => draw_bitmap_line(canvas, color, x, top, bitmap_scale(size), line),
            }
        }
    }
}

fn system_fonts() -> Database {
    let mut db = Database::new();
    db.load_system_fonts();
    db
}

fn query_font(db: &Database, family: Family<'_>, name: &str) -> Option<OverlayFont> {
    let id = db.query(&Query {
        families: &[family],
        ..Query::default()
    })?;
    let font = db
        .with_face_data(id, |data, index| FontVec::try_from_vec_and_index(data.to_vec(), index).ok())
        .flatten()?;
    Some(OverlayFont::Outline {
        name: name.to_string(),
        font,
    })
}

/// Whole-pixel magnification giving bitmap glyphs roughly the requested height.
fn bitmap_scale(size: f32) -> u32 {
    ((size / BITMAP_GLYPH_SIZE as f32).round() as u32).max(1)
}

fn glyph(c: char) -> Option<[u8; 8]> {
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

fn draw_bitmap_line(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, scale: u32, line: &str) {
    let advance = (BITMAP_GLYPH_SIZE * scale) as i32;
    for (i, c) in line.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let left = x + i as i32 * advance;
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..BITMAP_GLYPH_SIZE {
                if bits & (1u8 << col) == 0 {
                    continue;
                }
                fill_block(
                    canvas,
                    color,
                    left + (col * scale) as i32,
                    y + (row as u32 * scale) as i32,
                    scale,
                );
            }
        }
    }
}

fn fill_block(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, size: u32) {
    let (width, height) = canvas.dimensions();
    for dy in 0..size as i32 {
        for dx in 0..size as i32 {
            let (px, py) = (x + dx, y + dy);
            if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
                canvas.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}
