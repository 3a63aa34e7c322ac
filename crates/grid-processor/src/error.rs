//! Error types for grid accumulation.

use gnssr_common::GnssrError;
use thiserror::Error;

/// Errors that can occur while accumulating or averaging.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridProcessorError {
    /// A point folded to a cell index outside the grid.
    #[error("cell index {index} is outside grid extent [0, {len}) at lat={lat}, lon={lon}")]
    OutOfBounds {
        index: i64,
        len: usize,
        lat: f64,
        lon: f64,
    },

    /// Latitude, longitude and value sequences differ in length.
    #[error("length mismatch: {lats} latitudes, {lons} longitudes, {values} values")]
    LengthMismatch {
        lats: usize,
        lons: usize,
        values: usize,
    },

    /// Grid construction or coordinate error.
    #[error("grid error: {0}")]
    Grid(GnssrError),

    /// The shared accumulator lock was poisoned by a panicking producer.
    #[error("accumulator lock poisoned")]
    Poisoned,
}

impl From<GnssrError> for GridProcessorError {
    fn from(err: GnssrError) -> Self {
        match err {
            GnssrError::OutOfBounds {
                index,
                len,
                lat,
                lon,
            } => Self::OutOfBounds {
                index,
                len,
                lat,
                lon,
            },
            GnssrError::LengthMismatch { lats, lons, values } => {
                Self::LengthMismatch { lats, lons, values }
            }
            other => Self::Grid(other),
        }
    }
}

/// Result type for grid processor operations.
pub type Result<T> = std::result::Result<T, GridProcessorError>;
