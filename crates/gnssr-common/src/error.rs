//! Error types for grid indexing and observation handling.

use thiserror::Error;

/// Result type alias using GnssrError.
pub type GnssrResult<T> = Result<T, GnssrError>;

/// Primary error type for grid and observation operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GnssrError {
    // === Grid Errors ===
    #[error("Invalid cell size: {0} km (grid would have no cells)")]
    InvalidCellSize(f64),

    #[error("Cell index {index} is outside grid extent [0, {len}) for lat={lat}, lon={lon}")]
    OutOfBounds {
        index: i64,
        len: usize,
        lat: f64,
        lon: f64,
    },

    #[error("Invalid coordinate: lat={lat}, lon={lon}")]
    InvalidCoordinate { lat: f64, lon: f64 },

    // === Observation Errors ===
    #[error("Length mismatch: {lats} latitudes, {lons} longitudes, {values} values")]
    LengthMismatch {
        lats: usize,
        lons: usize,
        values: usize,
    },

    // === Time Errors ===
    #[error("Invalid time specification: {0}")]
    InvalidTime(String),
}
