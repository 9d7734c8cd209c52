//! Run configuration, loadable from YAML.

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Approximate area of one grid cell in square kilometres.
pub const DEFAULT_PIXEL_AREA_KM2: f64 = 0.000350;

/// Font family requested for the overlay text.
pub const DEFAULT_FONT_FAMILY: &str = "Roboto";

/// Overlay text height in pixels (12 pt at 300 dpi).
pub const DEFAULT_FONT_SIZE: f32 = 50.0;

/// Long side of the PNG canvas in pixels (10 in at 300 dpi).
pub const DEFAULT_CANVAS_SIZE: u32 = 3000;

/// Output directory used when none is given.
pub const DEFAULT_OUTPUT_DIR: &str = "output_images";

/// Image format for rendered frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Annotated RGBA PNG.
    #[default]
    Png,
    /// Georeferenced 4-band RGBA GeoTIFF, without text.
    GeoTiff,
}

impl OutputFormat {
    /// File extension for frames in this format.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::GeoTiff => "tif",
        }
    }
}

/// Settings for one pipeline run.
///
/// Every field has a default, so a YAML file only needs the keys it changes:
///
/// ```yaml
/// output_dir: frames
/// pixel_area_km2: 0.0009
/// font_family: DejaVu Sans
/// loss_color: [200, 0, 0, 255]
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory frames are written to; created if absent.
    pub output_dir: PathBuf,
    /// Frame format.
    pub format: OutputFormat,
    /// Area of one cell in km², applied uniformly across the raster.
    pub pixel_area_km2: f64,
    /// System font family for the overlay text.
    pub font_family: String,
    /// Explicit font file; takes precedence over `font_family`.
    pub font_file: Option<PathBuf>,
    /// Overlay text height in pixels.
    pub font_size: f32,
    /// Long side of the PNG canvas; cells are enlarged to fill it before the text is drawn.
    pub canvas_size: u32,
    /// Overlay text color, RGBA.
    pub text_color: [u8; 4],
    /// Color of cumulatively gained cells, RGBA.
    pub gain_color: [u8; 4],
    /// Color of cumulatively lost cells, RGBA. Painted over gain.
    pub loss_color: [u8; 4],
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            format: OutputFormat::Png,
            pixel_area_km2: DEFAULT_PIXEL_AREA_KM2,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_file: None,
            font_size: DEFAULT_FONT_SIZE,
            canvas_size: DEFAULT_CANVAS_SIZE,
            text_color: [255, 255, 255, 255],
            gain_color: [255, 255, 0, 255],
            loss_color: [255, 0, 0, 255],
        }
    }
}

impl RunConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunConfig::default();
        assert_eq!(config.output_dir, PathBuf::from("output_images"));
        assert_eq!(config.format, OutputFormat::Png);
        assert_eq!(config.pixel_area_km2, 0.000350);
        assert_eq!(config.font_family, "Roboto");
        assert_eq!(config.canvas_size, 3000);
        assert_eq!(config.gain_color, [255, 255, 0, 255]);
        assert_eq!(config.loss_color, [255, 0, 0, 255]);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RunConfig::from_yaml_str(
            "pixel_area_km2: 0.5\nformat: geotiff\ngain_color: [0, 255, 0, 255]\n",
        )
        .unwrap();
        assert_eq!(config.pixel_area_km2, 0.5);
        assert_eq!(config.format, OutputFormat::GeoTiff);
        assert_eq!(config.gain_color, [0, 255, 0, 255]);
        assert_eq!(config.loss_color, [255, 0, 0, 255]);
        assert_eq!(config.font_size, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn test_unknown_format_rejected() {
        assert!(RunConfig::from_yaml_str("format: jpeg\n").is_err());
    }

    #[test]
    fn test_extension() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::GeoTiff.extension(), "tif");
    }
}
