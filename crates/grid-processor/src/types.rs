//! Core types for grid accumulation.

use serde::Serialize;

/// Running totals for one grid cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CellStats {
    /// Sum of finite values
    pub sum: f64,
    /// Number of finite values
    pub count: u64,
}

impl CellStats {
    /// Mean of the accumulated values, NaN when the cell is empty.
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            f64::NAN
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Summary of an accumulator's contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AccumulatorSummary {
    /// Total cells in the grid
    pub cells: usize,
    /// Cells with at least one finite observation
    pub populated_cells: usize,
    /// Finite observations accumulated so far
    pub observations: u64,
    /// Number of `accumulate` calls that reached the state
    pub batches: u64,
}

impl AccumulatorSummary {
    /// Fraction of cells with data, 0.0 to 1.0.
    pub fn coverage(&self) -> f64 {
        if self.cells == 0 {
            0.0
        } else {
            self.populated_cells as f64 / self.cells as f64
        }
    }
}
