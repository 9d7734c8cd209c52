//! Binary presence grid.

use crate::{MosaicError, Result};

/// A grid of cells that are each 0 (class absent) or 1 (class present).
///
/// Cells are stored in row-major order, north to south, west to east.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryGrid {
    cells: Vec<u8>,
    width: usize,
    height: usize,
}

impl BinaryGrid {
    /// Create a grid with every cell absent.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            cells: vec![0; width * height],
            width,
            height,
        }
    }

    /// Create a grid from row-major cell values. Any nonzero value counts as present.
    pub fn from_vec(width: usize, height: usize, cells: Vec<u8>) -> Result<Self> {
        if cells.len() != width * height {
            return Err(MosaicError::InvalidDimensions {
                width,
                height,
                len: cells.len(),
            });
        }
        let cells = cells.into_iter().map(|v| u8::from(v > 0)).collect();
        Ok(Self {
            cells,
            width,
            height,
        })
    }

    /// Create a grid from rows of cell values. All rows must have the same length.
    pub fn from_rows<R: AsRef<[u8]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if let Some(row) = rows.iter().find(|r| r.as_ref().len() != width) {
            return Err(MosaicError::InvalidDimensions {
                width,
                height,
                len: row.as_ref().len(),
            });
        }
        let cells: Vec<u8> = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::from_vec(width, height, cells)
    }

    /// Threshold raw sample values: anything greater than zero becomes 1, everything else 0.
    ///
    /// NaN compares false and so becomes 0.
    pub fn threshold(width: usize, height: usize, values: &[f64]) -> Result<Self> {
        if values.len() != width * height {
            return Err(MosaicError::InvalidDimensions {
                width,
                height,
                len: values.len(),
            });
        }
        Ok(Self {
            cells: values.iter().map(|&v| u8::from(v > 0.0)).collect(),
            width,
            height,
        })
    }

    /// Grid dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Width in cells.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in cells.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major cell values.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Value at column `x`, row `y`, or `None` if out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[y * self.width + x])
    }

    /// Number of present cells.
    pub fn count_present(&self) -> usize {
        self.cells.iter().filter(|&&v| v == 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold() {
        let grid = BinaryGrid::threshold(3, 2, &[0.0, 0.5, -1.0, f64::NAN, 255.0, 0.0]).unwrap();
        assert_eq!(grid.cells(), &[0, 1, 0, 0, 1, 0]);
        assert_eq!(grid.count_present(), 2);
    }

    #[test]
    fn test_from_rows() {
        let grid = BinaryGrid::from_rows(&[[1u8, 0], [0, 7]]).unwrap();
        assert_eq!(grid.dimensions(), (2, 2));
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(1, 1), Some(1));
        assert_eq!(grid.get(2, 0), None);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 0], vec![0]];
        assert!(matches!(
            BinaryGrid::from_rows(&rows),
            Err(MosaicError::InvalidDimensions { .. })
        ));
    }
}
