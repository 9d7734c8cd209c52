//! Directory indexing and first-wins merging of a year's tiles.

use crate::{BinaryGrid, GeoKeys, GeoTransform, MosaicError, Result, Tile};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Relative tolerance when comparing pixel sizes between tiles.
const PIXEL_SIZE_TOLERANCE: f64 = 1e-6;

/// One year of tiles merged and thresholded.
#[derive(Debug, Clone)]
pub struct YearMosaic {
    /// Binary presence grid.
    pub grid: BinaryGrid,
    /// Transform of the merged grid.
    pub transform: GeoTransform,
    /// CRS tags of the first tile, if any.
    pub geokeys: Option<GeoKeys>,
}

/// Raw first-band samples merged onto the union of the tile extents.
#[derive(Debug, Clone)]
pub struct MergedRaster {
    values: Vec<f64>,
    width: usize,
    height: usize,
    transform: GeoTransform,
}

impl MergedRaster {
    /// Merged samples in row-major order. Cells no tile covers hold 0.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Transform of the merged raster.
    pub fn transform(&self) -> GeoTransform {
        self.transform
    }

    /// Threshold into a binary presence grid.
    pub fn to_binary(&self) -> Result<BinaryGrid> {
        BinaryGrid::threshold(self.width, self.height, &self.values)
    }
}

/// Whether a path looks like a GeoTIFF tile (`.tif` or `.tiff`, any case).
pub fn is_tile_path(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

/// List the tile files in a directory, sorted by path.
///
/// The sort fixes the merge order, so overlaps resolve the same way on every run.
pub fn list_tiles<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut tiles = Vec::new();
    for entry in std::fs::read_dir(dir.as_ref())? {
        let path = entry?.path();
        if is_tile_path(&path) {
            tiles.push(path);
        }
    }
    tiles.sort();
    Ok(tiles)
}

/// Mosaic every tile in a year directory into a binary presence grid.
///
/// Fails with [`MosaicError::NoTiles`] when the directory holds no tile files.
pub fn mosaic_year<P: AsRef<Path>>(dir: P) -> Result<YearMosaic> {
    let dir = dir.as_ref();
    let paths = list_tiles(dir)?;
    if paths.is_empty() {
        return Err(MosaicError::NoTiles {
            dir: dir.to_path_buf(),
        });
    }

    let mut tiles = Vec::with_capacity(paths.len());
    for path in &paths {
        let tile = Tile::from_file(path)?;
        let (width, height) = tile.dimensions();
        debug!("Loaded tile {} ({}x{})", path.display(), width, height);
        tiles.push(tile);
    }

    let merged = merge_first(&tiles)?;
    let grid = merged.to_binary()?;
    debug!(
        "Mosaicked {} tiles from {} into {}x{} grid",
        tiles.len(),
        dir.display(),
        grid.width(),
        grid.height()
    );

    Ok(YearMosaic {
        grid,
        transform: merged.transform(),
        geokeys: tiles[0].geokeys().cloned(),
    })
}

/// Merge tiles onto the union of their extents.
///
/// The first tile's pixel size is used for the output. Each output cell takes
/// the value of the first tile, in slice order, that covers it with valid data.
/// Cells no tile covers are 0.
pub fn merge_first(tiles: &[Tile]) -> Result<MergedRaster> {
    let first = tiles.first().ok_or(MosaicError::NothingToMerge)?;
    let reference = first.transform();
    let pixel_x = reference.pixel_width;
    let pixel_y = reference.pixel_height.abs();

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for tile in tiles {
        let transform = tile.transform();
        if !transform.is_north_up() || transform.pixel_width <= 0.0 {
            return Err(MosaicError::InvalidGeoTiff(
                "rotated or south-up tiles cannot be merged".to_string(),
            ));
        }
        let found_x = transform.pixel_width;
        let found_y = transform.pixel_height.abs();
        if (found_x - pixel_x).abs() > pixel_x * PIXEL_SIZE_TOLERANCE
            || (found_y - pixel_y).abs() > pixel_y * PIXEL_SIZE_TOLERANCE
        {
            return Err(MosaicError::ResolutionMismatch {
                expected_x: pixel_x,
                expected_y: pixel_y,
                found_x,
                found_y,
            });
        }

        let (tile_min_x, tile_min_y, tile_max_x, tile_max_y) = tile.bounds();
        min_x = min_x.min(tile_min_x);
        min_y = min_y.min(tile_min_y);
        max_x = max_x.max(tile_max_x);
        max_y = max_y.max(tile_max_y);
    }

    let width = ((max_x - min_x) / pixel_x).round() as usize;
    let height = ((max_y - min_y) / pixel_y).round() as usize;
    let transform = GeoTransform::new(min_x, max_y, pixel_x, -pixel_y);

    let mut values = vec![0.0; width * height];
    let mut filled = vec![false; width * height];

    for tile in tiles {
        let origin = tile.transform();
        let col_offset = ((origin.origin_x - min_x) / pixel_x).round() as i64;
        let row_offset = ((max_y - origin.origin_y) / pixel_y).round() as i64;
        let (tile_width, tile_height) = tile.dimensions();

        for row in 0..tile_height {
            let out_row = row_offset + row as i64;
            if out_row < 0 || out_row >= height as i64 {
                continue;
            }
            for col in 0..tile_width {
                let out_col = col_offset + col as i64;
                if out_col < 0 || out_col >= width as i64 {
                    continue;
                }
                let idx = out_row as usize * width + out_col as usize;
                if filled[idx] {
                    continue;
                }
                if let Some(value) = tile.value(col, row).filter(|&v| tile.is_valid(v)) {
                    values[idx] = value;
                    filled[idx] = true;
                }
            }
        }
    }

    Ok(MergedRaster {
        values,
        width,
        height,
        transform,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(origin_x: f64, origin_y: f64, width: u32, height: u32, data: Vec<f64>) -> Tile {
        Tile::from_parts(
            data,
            width,
            height,
            GeoTransform::new(origin_x, origin_y, 1.0, -1.0),
            Some(255.0),
        )
        .expect("valid tile")
    }

    #[test]
    fn test_merge_side_by_side() {
        let west = tile(0.0, 2.0, 1, 2, vec![1.0, 0.0]);
        let east = tile(1.0, 2.0, 1, 2, vec![0.0, 3.0]);
        let merged = merge_first(&[west, east]).unwrap();

        assert_eq!(merged.dimensions(), (2, 2));
        assert_eq!(merged.values(), &[1.0, 0.0, 0.0, 3.0]);
        assert_eq!(merged.transform(), GeoTransform::new(0.0, 2.0, 1.0, -1.0));
    }

    #[test]
    fn test_merge_first_wins_on_overlap() {
        let a = tile(0.0, 1.0, 2, 1, vec![5.0, 0.0]);
        let b = tile(1.0, 1.0, 2, 1, vec![9.0, 7.0]);
        let merged = merge_first(&[a, b]).unwrap();

        assert_eq!(merged.dimensions(), (3, 1));
        // Column 1 is covered by both; the first tile's 0 wins over 9
        assert_eq!(merged.values(), &[5.0, 0.0, 7.0]);
    }

    #[test]
    fn test_merge_nodata_does_not_claim_cell() {
        let a = tile(0.0, 1.0, 2, 1, vec![255.0, 2.0]);
        let b = tile(0.0, 1.0, 2, 1, vec![4.0, 8.0]);
        let merged = merge_first(&[a, b]).unwrap();
        assert_eq!(merged.values(), &[4.0, 2.0]);
    }

    #[test]
    fn test_merge_gap_is_zero() {
        let a = tile(0.0, 1.0, 1, 1, vec![1.0]);
        let b = tile(2.0, 1.0, 1, 1, vec![1.0]);
        let merged = merge_first(&[a, b]).unwrap();
        assert_eq!(merged.values(), &[1.0, 0.0, 1.0]);
        let grid = merged.to_binary().unwrap();
        assert_eq!(grid.cells(), &[1, 0, 1]);
    }

    #[test]
    fn test_merge_resolution_mismatch() {
        let a = tile(0.0, 1.0, 1, 1, vec![1.0]);
        let b = Tile::from_parts(vec![1.0], 1, 1, GeoTransform::new(1.0, 1.0, 0.5, -0.5), None).unwrap();
        assert!(matches!(
            merge_first(&[a, b]),
            Err(MosaicError::ResolutionMismatch { .. })
        ));
    }

    #[test]
    fn test_merge_empty() {
        assert!(matches!(merge_first(&[]), Err(MosaicError::NothingToMerge)));
    }
}
