//! # landtrack-mosaic
//!
//! Mosaics one year of GeoTIFF tiles into a single binary presence grid.
//!
//! A year of land-cover data arrives as a directory of tiles covering
//! disjoint or overlapping extents. This crate:
//! - indexes the `.tif`/`.tiff` files in the directory
//! - decodes each tile's first band and its georeferencing tags
//! - merges the tiles onto the union of their extents (first tile wins)
//! - thresholds the result so every cell is 0 (absent) or 1 (present)
//!
//! ## Example
//!
//! ```no_run
//! use landtrack_mosaic::mosaic_year;
//!
//! let mosaic = mosaic_year("data/2001")?;
//! let (width, height) = mosaic.grid.dimensions();
//! println!("{}x{} cells, {} present", width, height, mosaic.grid.count_present());
//! # Ok::<(), landtrack_mosaic::MosaicError>(())
//! ```

mod error;
mod geotransform;
mod grid;
mod mosaic;
mod tile;

pub use error::MosaicError;
pub use geotransform::GeoTransform;
pub use grid::BinaryGrid;
pub use mosaic::{is_tile_path, list_tiles, merge_first, mosaic_year, MergedRaster, YearMosaic};
pub use tile::{GeoKeys, Tile};

/// Result type for mosaic operations.
pub type Result<T> = std::result::Result<T, MosaicError>;
