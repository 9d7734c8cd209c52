//! Frame rendering: cumulative masks to an RGBA overlay, plus the text annotation.

use crate::{CumulativeChange, Mask, OverlayFont, RunConfig};
use image::{Rgba, RgbaImage};

/// Colors used to paint a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Color of cumulatively gained cells.
    pub gain: Rgba<u8>,
    /// Color of cumulatively lost cells.
    pub loss: Rgba<u8>,
    /// Color of the overlay text.
    pub text: Rgba<u8>,
}

impl Palette {
    /// Palette from the colors in a run configuration.
    pub fn from_config(config: &RunConfig) -> Self {
        Self {
            gain: Rgba(config.gain_color),
            loss: Rgba(config.loss_color),
            text: Rgba(config.text_color),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::from_config(&RunConfig::default())
    }
}

/// Paint the cumulative masks onto a transparent image, one pixel per cell.
///
/// Gain is painted first and loss second, so a cell in both masks shows the
/// loss color.
pub fn render_frame(change: &CumulativeChange, palette: &Palette) -> RgbaImage {
    let (width, height) = change.dimensions();
    let mut frame = RgbaImage::new(width as u32, height as u32);
    paint(&mut frame, change.gains(), palette.gain);
    paint(&mut frame, change.losses(), palette.loss);
    frame
}

fn paint(frame: &mut RgbaImage, mask: &Mask, color: Rgba<u8>) {
    for (x, y) in mask.iter_set() {
        frame.put_pixel(x as u32, y as u32, color);
    }
}

/// Enlarge a cell frame so its long side approaches `canvas_size` pixels.
///
/// Every cell becomes a square block of the same whole number of pixels, so
/// cell colors are never blended. Frames already at least `canvas_size` on
/// their long side are returned at one pixel per cell.
pub fn upscale(frame: &RgbaImage, canvas_size: u32) -> RgbaImage {
    let (width, height) = frame.dimensions();
    let factor = (canvas_size / width.max(height).max(1)).max(1);
    if factor == 1 {
        return frame.clone();
    }
    RgbaImage::from_fn(width * factor, height * factor, |x, y| {
        *frame.get_pixel(x / factor, y / factor)
    })
}

/// Annotation text for one frame.
pub fn overlay_text(year: &str, gain_area_km2: f64, loss_area_km2: f64) -> String {
    format!(
        "Year: {}\nCumulative Gains: {:.2} km²\nCumulative Losses: {:.2} km²",
        year, gain_area_km2, loss_area_km2
    )
}

/// Top-left anchor of the annotation: 5% in from the left, 1% down from the top.
pub fn text_anchor(width: u32, height: u32) -> (i32, i32) {
    ((width as f64 * 0.05) as i32, (height as f64 * 0.01) as i32)
}

/// Draw the annotation onto a rendered frame.
pub fn annotate(frame: &mut RgbaImage, font: &OverlayFont, palette: &Palette, size: f32, text: &str) {
    let (x, y) = text_anchor(frame.width(), frame.height());
    font.draw_text(frame, palette.text, x, y, size, text);
}
