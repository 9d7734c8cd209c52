//! Error types for change tracking and frame output.

use landtrack_mosaic::MosaicError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while tracking change and writing frames.
#[derive(Debug, Error)]
pub enum ChangeError {
    /// Mosaicking a year's tiles failed.
    #[error(transparent)]
    Mosaic(#[from] MosaicError),

    /// I/O error reading the data root or writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding a PNG frame failed.
    #[error("Image encode error: {0}")]
    Image(#[from] image::ImageError),

    /// Encoding a GeoTIFF frame failed.
    #[error("TIFF encode error: {0}")]
    TiffEncode(#[from] tiff::TiffError),

    /// Configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),

    /// The data root has no year subdirectories.
    #[error("No year folders found in {}", dir.display())]
    NoYears {
        /// Data root that was searched.
        dir: PathBuf,
    },

    /// A year's grid does not line up with the grids before it.
    #[error("Grid for year {year} is {found_width}x{found_height}, expected {expected_width}x{expected_height}")]
    ShapeMismatch {
        /// Year label of the offending grid.
        year: String,
        /// Width of the earlier years' grids.
        expected_width: usize,
        /// Height of the earlier years' grids.
        expected_height: usize,
        /// Width of the offending grid.
        found_width: usize,
        /// Height of the offending grid.
        found_height: usize,
    },
}
