//! Error types for coastal distance lookups.

use thiserror::Error;

/// Result type for coastal distance operations.
pub type CoastalResult<T> = Result<T, CoastalError>;

/// Error types for loading and querying coastal distance rasters.
#[derive(Error, Debug)]
pub enum CoastalError {
    /// The backing raster resource does not exist
    #[error("Coastal raster not found: {0}")]
    ResourceNotFound(String),

    /// Query issued before a raster was loaded
    #[error("Coastal distance lookup is not loaded")]
    NotLoaded,

    /// An axis array has no elements
    #[error("Coastal raster has an empty {axis} axis")]
    EmptyAxis { axis: &'static str },

    /// Distance array size does not match the axes
    #[error("Coastal raster shape mismatch: {lats} x {lons} axes but {values} values")]
    ShapeMismatch {
        lats: usize,
        lons: usize,
        values: usize,
    },

    /// Query arrays of different lengths
    #[error("Length mismatch: {lats} latitudes, {lons} longitudes")]
    LengthMismatch { lats: usize, lons: usize },

    /// Malformed raster file
    #[error("Invalid raster format: {0}")]
    Format(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
