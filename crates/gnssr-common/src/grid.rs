//! Fixed-resolution Plate Carree grid definitions.
//!
//! The grid is sized from a cell edge length in kilometres measured at the
//! equator. Longitude spans [-180, 180] and latitude [-90, 90]; there are
//! twice as many longitude cells as latitude cells.
//!
//! # Index convention
//!
//! Coordinates map to integer axis indices by scaling around the grid centre
//! and rounding half to even. Axis indices are then folded into a flat index
//! with a one-based offset on both axes:
//!
//! ```text
//! linear = (lon_idx - 1) + lon_cells * (lat_idx - 1)
//! ```
//!
//! The offset is part of the cell-centering convention of existing GNSS-R
//! map products and must be kept for grids to stay bit-compatible with them.

use crate::error::{GnssrError, GnssrResult};
use serde::Serialize;
use std::f64::consts::PI;

/// Mean Earth radius used to size the grid (km).
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Longitude half-extent in degrees.
const X_LIM: f64 = 180.0;

/// Latitude half-extent in degrees.
const Y_LIM: f64 = 90.0;

/// Coordinate to cell-index mapping for an equirectangular grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndexer {
    cell_size_km: f64,
    lon_cells: usize,
    lat_cells: usize,
    lon_scale: Vec<f64>,
    lat_scale: Vec<f64>,
}

impl GridIndexer {
    /// Create a grid whose cells are `cell_size_km` wide at the equator.
    pub fn new(cell_size_km: f64) -> GnssrResult<Self> {
        if !cell_size_km.is_finite() || cell_size_km <= 0.0 {
            return Err(GnssrError::InvalidCellSize(cell_size_km));
        }

        let circumference = 2.0 * PI * EARTH_RADIUS_KM;
        let lon_cells = (circumference / cell_size_km).round_ties_even();
        let lat_cells = (circumference / cell_size_km / 2.0).round_ties_even();

        if lon_cells < 1.0 || lat_cells < 1.0 {
            return Err(GnssrError::InvalidCellSize(cell_size_km));
        }

        let lon_cells = lon_cells as usize;
        let lat_cells = lat_cells as usize;

        Ok(Self {
            cell_size_km,
            lon_cells,
            lat_cells,
            lon_scale: linspace(-X_LIM, X_LIM, lon_cells),
            lat_scale: linspace(-Y_LIM, Y_LIM, lat_cells),
        })
    }

    /// Cell edge length at the equator (km).
    pub fn cell_size_km(&self) -> f64 {
        self.cell_size_km
    }

    /// Number of cells along the longitude axis.
    pub fn lon_cells(&self) -> usize {
        self.lon_cells
    }

    /// Number of cells along the latitude axis.
    pub fn lat_cells(&self) -> usize {
        self.lat_cells
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.lon_cells * self.lat_cells
    }

    /// Always false; a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Longitude axis, `lon_cells` values evenly spaced over [-180, 180].
    pub fn lon_scale(&self) -> &[f64] {
        &self.lon_scale
    }

    /// Latitude axis, `lat_cells` values evenly spaced over [-90, 90].
    pub fn lat_scale(&self) -> &[f64] {
        &self.lat_scale
    }

    pub fn x_lim(&self) -> f64 {
        X_LIM
    }

    pub fn y_lim(&self) -> f64 {
        Y_LIM
    }

    /// Map extent as `[min_lon, max_lon, min_lat, max_lat]`.
    pub fn extent(&self) -> [f64; 4] {
        [-X_LIM, X_LIM, -Y_LIM, Y_LIM]
    }

    /// Axis indices `(lon_idx, lat_idx)` for a coordinate.
    ///
    /// The result is not clamped: coordinates on the antimeridian or the
    /// poles can produce indices outside `[0, lon_cells)` / `[0, lat_cells)`.
    /// Non-finite or huge input saturates; use [`GridIndexer::cell`] for a
    /// checked mapping.
    pub fn cell_index(&self, lat: f64, lon: f64) -> (i64, i64) {
        let half_lon = self.lon_cells as f64 / 2.0;
        let half_lat = self.lat_cells as f64 / 2.0;

        let lon_idx = (lon / X_LIM * half_lon + half_lon).round_ties_even();
        let lat_idx = (lat / Y_LIM * half_lat + half_lat).round_ties_even();

        (lon_idx as i64, lat_idx as i64)
    }

    /// Fold axis indices into a flat index using the one-based offset
    /// convention described in the module docs.
    ///
    /// Saturates instead of overflowing, so extreme indices still fold to a
    /// value outside the grid.
    pub fn linear_index(&self, lon_idx: i64, lat_idx: i64) -> i64 {
        let row = (self.lon_cells as i64).saturating_mul(lat_idx.saturating_sub(1));
        lon_idx.saturating_sub(1).saturating_add(row)
    }

    /// Checked flat cell index for a coordinate.
    ///
    /// Fails with `InvalidCoordinate` for non-finite coordinates or ones
    /// outside [-90, 90] x [-180, 180], and with `OutOfBounds` when the
    /// folded index lies outside the grid. Out-of-range indices are never
    /// clamped or wrapped.
    pub fn cell(&self, lat: f64, lon: f64) -> GnssrResult<usize> {
        if !(-Y_LIM..=Y_LIM).contains(&lat) || !(-X_LIM..=X_LIM).contains(&lon) {
            return Err(GnssrError::InvalidCoordinate { lat, lon });
        }

        let (lon_idx, lat_idx) = self.cell_index(lat, lon);
        let index = self.linear_index(lon_idx, lat_idx);

        if index < 0 || index as usize >= self.len() {
            return Err(GnssrError::OutOfBounds {
                index,
                len: self.len(),
                lat,
                lon,
            });
        }

        Ok(index as usize)
    }

    /// Allocate a grid of this shape filled with `value`.
    pub fn filled_grid(&self, value: f64) -> MapGrid {
        MapGrid::filled(self.lat_cells, self.lon_cells, value)
    }
}

/// Evenly spaced values over `[start, stop]`, endpoint included.
///
/// A single-element axis holds only `start`.
fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut values: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            values[n - 1] = stop;
            values
        }
    }
}

/// Dense row-major 2D grid of values.
///
/// Row 0 is the southernmost latitude. NaN marks cells without data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl MapGrid {
    /// A `rows x cols` grid with every cell set to `value`.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Wrap row-major data. Returns `None` if the length does not match.
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        if data.len() != rows * cols {
            return None;
        }
        Some(Self { rows, cols, data })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major cell values.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Mutable row-major cell values.
    pub fn data_mut(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Value at `(row, col)`, `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.data.get(row * self.cols + col).copied()
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    /// Value at a flat cell index.
    pub fn cell(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied()
    }

    /// Borrow a single row.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.rows {
            return None;
        }
        let start = row * self.cols;
        Some(&self.data[start..start + self.cols])
    }

    /// Copy into nested rows, `[rows][cols]`.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.data.chunks(self.cols.max(1)).map(|r| r.to_vec()).collect()
    }

    /// A copy with rows reversed so that row 0 is the northernmost latitude.
    pub fn flipped_north_up(&self) -> MapGrid {
        let mut data = Vec::with_capacity(self.data.len());
        for row in (0..self.rows).rev() {
            let start = row * self.cols;
            data.extend_from_slice(&self.data[start..start + self.cols]);
        }
        MapGrid {
            rows: self.rows,
            cols: self.cols,
            data,
        }
    }

    /// Number of cells holding finite values.
    pub fn populated_cells(&self) -> usize {
        self.data.iter().filter(|v| v.is_finite()).count()
    }

    /// Minimum and maximum finite values, `None` if no cell has data.
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_dimensions_200km() {
        let grid = GridIndexer::new(200.0).unwrap();
        // 2 * pi * 6371 / 200 = 200.15
        assert_eq!(grid.lon_cells(), 200);
        assert_eq!(grid.lat_cells(), 100);
        assert_eq!(grid.len(), 20_000);
    }

    #[test]
    fn test_invalid_cell_sizes() {
        assert!(GridIndexer::new(0.0).is_err());
        assert!(GridIndexer::new(-10.0).is_err());
        assert!(GridIndexer::new(f64::NAN).is_err());
        assert!(GridIndexer::new(f64::INFINITY).is_err());
        // Wider than the equator leaves no cells
        assert!(GridIndexer::new(1.0e6).is_err());
    }

    #[test]
    fn test_axis_scales() {
        let grid = GridIndexer::new(200.0).unwrap();
        let lon = grid.lon_scale();
        let lat = grid.lat_scale();
        assert_eq!(lon.len(), 200);
        assert_eq!(lat.len(), 100);
        assert_eq!(lon[0], -180.0);
        assert_eq!(lon[199], 180.0);
        assert_eq!(lat[0], -90.0);
        assert_eq!(lat[99], 90.0);
        assert!(lon.windows(2).all(|w| w[0] < w[1]));
        assert!(lat.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_linspace_single_point() {
        assert_eq!(linspace(-90.0, 90.0, 1), vec![-90.0]);
        assert!(linspace(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_linear_index_offset_convention() {
        let grid = GridIndexer::new(200.0).unwrap();
        // (1, 1) is the first cell
        assert_eq!(grid.linear_index(1, 1), 0);
        // Moving one step in longitude moves one slot
        assert_eq!(grid.linear_index(2, 1), 1);
        // Moving one step in latitude moves a full row
        assert_eq!(grid.linear_index(1, 2), 200);
        // Zero indices fall before the first cell
        assert_eq!(grid.linear_index(0, 0), -201);
    }

    #[test]
    fn test_cell_index_centre() {
        let grid = GridIndexer::new(200.0).unwrap();
        assert_eq!(grid.cell_index(0.0, 0.0), (100, 50));
        assert_eq!(grid.cell_index(90.0, 180.0), (200, 100));
        assert_eq!(grid.cell_index(-90.0, -180.0), (0, 0));
    }

    #[test]
    fn test_cell_index_rounds_half_to_even() {
        let grid = GridIndexer::new(200.0).unwrap();
        // 22.5 / 180 * 100 + 100 = 112.5 -> 112
        assert_eq!(grid.cell_index(0.0, 22.5).0, 112);
        // 67.5 / 180 * 100 + 100 = 137.5 -> 138
        assert_eq!(grid.cell_index(0.0, 67.5).0, 138);
    }

    #[test]
    fn test_checked_cell_rejects_south_pole() {
        let grid = GridIndexer::new(200.0).unwrap();
        let err = grid.cell(-90.0, -180.0).unwrap_err();
        assert!(matches!(err, GnssrError::OutOfBounds { .. }));
    }

    #[test]
    fn test_checked_cell_rejects_nan() {
        let grid = GridIndexer::new(200.0).unwrap();
        let err = grid.cell(f64::NAN, 0.0).unwrap_err();
        assert!(matches!(err, GnssrError::InvalidCoordinate { .. }));
    }

    #[test]
    fn test_map_grid_flip() {
        let grid = MapGrid::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let flipped = grid.flipped_north_up();
        assert_eq!(flipped.row(0).unwrap(), &[4.0, 5.0, 6.0]);
        assert_eq!(flipped.row(1).unwrap(), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_map_grid_finite_range() {
        let grid = MapGrid::from_vec(1, 4, vec![f64::NAN, 2.0, -1.0, f64::NAN]).unwrap();
        assert_eq!(grid.finite_range(), Some((-1.0, 2.0)));
        assert_eq!(grid.populated_cells(), 2);
        assert_eq!(MapGrid::filled(2, 2, f64::NAN).finite_range(), None);
    }
}
