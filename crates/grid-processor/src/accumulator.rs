//! Per-cell running sums and counts with NaN-aware averaging.

use std::collections::BTreeMap;

use gnssr_common::observation::check_lengths;
use gnssr_common::{GridIndexer, MapGrid, ObservationBatch};
use tracing::debug;

use crate::error::{GridProcessorError, Result};
use crate::types::{AccumulatorSummary, CellStats};

/// Aggregates scattered observations into grid cells.
///
/// Sums and counts are only ever added to; averaging reads them without
/// mutation.
/// Non-finite values are treated as missing and contribute to neither.
#[derive(Debug, Clone)]
pub struct MapAccumulator {
    indexer: GridIndexer,
    sum: Vec<f64>,
    count: Vec<u64>,
    batches: u64,
}

impl MapAccumulator {
    /// Create an empty accumulator over `indexer`'s grid.
    pub fn new(indexer: GridIndexer) -> Self {
        let len = indexer.len();
        Self {
            indexer,
            sum: vec![0.0; len],
            count: vec![0; len],
            batches: 0,
        }
    }

    /// Create an empty accumulator for a grid of `cell_size_km` cells.
    pub fn with_cell_size(cell_size_km: f64) -> Result<Self> {
        let indexer = GridIndexer::new(cell_size_km).map_err(GridProcessorError::from)?;
        Ok(Self::new(indexer))
    }

    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    /// Add a batch of parallel `(lat, lon, value)` sequences.
    ///
    /// Every point is mapped to its cell before anything is written, so a
    /// batch with an out-of-range point leaves the accumulator unchanged.
    /// Points sharing a cell are grouped and their finite values summed
    /// before being added to the running totals.
    pub fn accumulate(&mut self, lats: &[f64], lons: &[f64], vals: &[f64]) -> Result<()> {
        check_lengths(lats, lons, vals)?;
        if vals.is_empty() {
            return Ok(());
        }

        let cells = lats
            .iter()
            .zip(lons)
            .map(|(&lat, &lon)| self.indexer.cell(lat, lon))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut groups: BTreeMap<usize, CellStats> = BTreeMap::new();
        for (&cell, &value) in cells.iter().zip(vals) {
            let group = groups.entry(cell).or_default();
            if value.is_finite() {
                group.sum += value;
                group.count += 1;
            }
        }

        for (&cell, group) in &groups {
            self.sum[cell] += group.sum;
            self.count[cell] += group.count;
        }
        self.batches += 1;

        debug!(
            points = vals.len(),
            cells = groups.len(),
            batch = self.batches,
            "Accumulated observation batch"
        );

        Ok(())
    }

    /// Add an [`ObservationBatch`].
    pub fn accumulate_batch(&mut self, batch: &ObservationBatch) -> Result<()> {
        self.accumulate(batch.lats(), batch.lons(), batch.values())
    }

    /// Per-cell mean as a `[lat_cells][lon_cells]` grid.
    ///
    /// Cells without finite observations are NaN. Row 0 is the southernmost
    /// latitude; flipping for display is the renderer's job.
    pub fn average(&self) -> MapGrid {
        let mut grid = self.indexer.filled_grid(f64::NAN);
        for (out, (&sum, &count)) in grid
            .data_mut()
            .iter_mut()
            .zip(self.sum.iter().zip(&self.count))
        {
            if count > 0 {
                *out = sum / count as f64;
            }
        }
        grid
    }

    /// Mean of the cell containing `(lat, lon)`.
    pub fn average_at(&self, lat: f64, lon: f64) -> Result<f64> {
        let cell = self.indexer.cell(lat, lon)?;
        Ok(self.stats_unchecked(cell).mean())
    }

    /// Running totals of a flat cell index.
    pub fn cell_stats(&self, cell: usize) -> Option<CellStats> {
        if cell >= self.sum.len() {
            return None;
        }
        Some(self.stats_unchecked(cell))
    }

    fn stats_unchecked(&self, cell: usize) -> CellStats {
        CellStats {
            sum: self.sum[cell],
            count: self.count[cell],
        }
    }

    /// Finite observations accumulated so far.
    pub fn observation_count(&self) -> u64 {
        self.count.iter().sum()
    }

    /// Cells holding at least one finite observation.
    pub fn populated_cells(&self) -> usize {
        self.count.iter().filter(|&&c| c > 0).count()
    }

    pub fn summary(&self) -> AccumulatorSummary {
        AccumulatorSummary {
            cells: self.indexer.len(),
            populated_cells: self.populated_cells(),
            observations: self.observation_count(),
            batches: self.batches,
        }
    }
}
