//! Error types for the mosaic crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading and merging tiles.
#[derive(Debug, Error)]
pub enum MosaicError {
    /// I/O error reading a file or directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// Invalid GeoTIFF - missing or unusable georeferencing.
    #[error("Invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// The year directory holds no tile files.
    #[error("No .tif files found in {}", dir.display())]
    NoTiles {
        /// Directory that was searched.
        dir: PathBuf,
    },

    /// A merge was requested with no tiles.
    #[error("Cannot merge an empty set of tiles")]
    NothingToMerge,

    /// Tile has zero width or height.
    #[error("Tile has no pixels: {0}")]
    EmptyTile(String),

    /// Tiles in one mosaic disagree on pixel size.
    #[error(
        "Tile pixel size {found_x}x{found_y} does not match mosaic pixel size {expected_x}x{expected_y}"
    )]
    ResolutionMismatch {
        /// Pixel width of the first tile.
        expected_x: f64,
        /// Pixel height (absolute) of the first tile.
        expected_y: f64,
        /// Pixel width of the offending tile.
        found_x: f64,
        /// Pixel height (absolute) of the offending tile.
        found_y: f64,
    },

    /// Cell buffer length does not match the declared dimensions.
    #[error("Grid of {width}x{height} cannot hold {len} cells")]
    InvalidDimensions {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
        /// Actual buffer length.
        len: usize,
    },
}
