//! Cumulative gain/loss tracking over an ordered series of binary grids.
//!
//! [`ChangeTracker`] is a reducer: each call to [`ChangeTracker::observe`]
//! folds the next year's grid into the running state. The first grid only
//! sizes the masks. Every later grid is compared cell by cell with the one
//! before it, and the resulting transitions are OR-ed into the cumulative
//! masks, so a cell that has been marked is never cleared.

use crate::{ChangeError, Result};
use landtrack_mosaic::BinaryGrid;

/// A boolean grid in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    bits: Vec<bool>,
    width: usize,
    height: usize,
}

impl Mask {
    /// Create an all-false mask.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            bits: vec![false; width * height],
            width,
            height,
        }
    }

    /// Mask dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Value at column `x`, row `y`; out-of-range cells read as false.
    pub fn get(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.bits[y * self.width + x]
    }

    /// Row-major cell values.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Number of true cells.
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Coordinates `(x, y)` of every true cell.
    pub fn iter_set(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, b)| **b)
            .map(move |(idx, _)| (idx % width, idx / width))
    }

    /// OR another mask of the same shape into this one.
    fn union_with(&mut self, other: &Mask) {
        debug_assert_eq!(self.dimensions(), other.dimensions());
        for (dst, &src) in self.bits.iter_mut().zip(&other.bits) {
            *dst |= src;
        }
    }
}

/// Cell transitions between two consecutive years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Cells absent in the previous year and present in the current one.
    pub gained: Mask,
    /// Cells present in the previous year and absent in the current one.
    pub lost: Mask,
}

/// Compare two consecutive grids cell by cell.
///
/// Returns `None` when the grids differ in shape.
pub fn transition(previous: &BinaryGrid, current: &BinaryGrid) -> Option<Transition> {
    if previous.dimensions() != current.dimensions() {
        return None;
    }
    let (width, height) = current.dimensions();
    let mut gained = Mask::new(width, height);
    let mut lost = Mask::new(width, height);

    for (idx, (&prev, &curr)) in previous.cells().iter().zip(current.cells()).enumerate() {
        gained.bits[idx] = prev == 0 && curr == 1;
        lost.bits[idx] = prev == 1 && curr == 0;
    }

    Some(Transition { gained, lost })
}

/// Cumulative gain and loss masks after some number of years.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeChange {
    gains: Mask,
    losses: Mask,
}

impl CumulativeChange {
    /// All-false masks of the given size.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            gains: Mask::new(width, height),
            losses: Mask::new(width, height),
        }
    }

    /// Fold one transition in.
    pub fn apply(&mut self, step: &Transition) {
        self.gains.union_with(&step.gained);
        self.losses.union_with(&step.lost);
    }

    /// Cells that have ever gone from absent to present.
    pub fn gains(&self) -> &Mask {
        &self.gains
    }

    /// Cells that have ever gone from present to absent.
    pub fn losses(&self) -> &Mask {
        &self.losses
    }

    /// Dimensions as `(width, height)`.
    pub fn dimensions(&self) -> (usize, usize) {
        self.gains.dimensions()
    }

    /// Cumulative gain area, assuming every cell covers `cell_area`.
    pub fn gain_area(&self, cell_area: f64) -> f64 {
        self.gains.count() as f64 * cell_area
    }

    /// Cumulative loss area, assuming every cell covers `cell_area`.
    pub fn loss_area(&self, cell_area: f64) -> f64 {
        self.losses.count() as f64 * cell_area
    }
}

/// Running state of the year-by-year comparison.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    previous: Option<BinaryGrid>,
    cumulative: Option<CumulativeChange>,
    years_seen: usize,
}

impl ChangeTracker {
    /// Create a tracker that has seen no years.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of grids observed so far.
    pub fn years_seen(&self) -> usize {
        self.years_seen
    }

    /// Fold the next year's grid into the cumulative masks.
    ///
    /// Only the grid just observed is retained for the next comparison.
    /// Fails with [`ChangeError::ShapeMismatch`] if the grid does not match
    /// the shape of the grids before it; the tracker is left unchanged.
    pub fn observe(&mut self, year: &str, grid: BinaryGrid) -> Result<&CumulativeChange> {
        let (width, height) = grid.dimensions();

        if let Some(previous) = &self.previous {
            let step = transition(previous, &grid).ok_or_else(|| {
                let (expected_width, expected_height) = previous.dimensions();
                ChangeError::ShapeMismatch {
                    year: year.to_string(),
                    expected_width,
                    expected_height,
                    found_width: width,
                    found_height: height,
                }
            })?;
            if let Some(cumulative) = self.cumulative.as_mut() {
                cumulative.apply(&step);
            }
        }

        self.previous = Some(grid);
        self.years_seen += 1;
        Ok(self
            .cumulative
            .get_or_insert_with(|| CumulativeChange::empty(width, height)))
    }
}
