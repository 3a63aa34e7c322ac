//! Error types for map rendering.

use thiserror::Error;

/// Errors raised while colouring or encoding a map.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Image would have no pixels
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// Pixel or value buffer does not match the dimensions
    #[error("Buffer size mismatch: expected {expected}, got {actual}")]
    BufferSize { expected: usize, actual: usize },

    /// Axis length does not match the grid
    #[error("Axis length mismatch for {axis}: grid has {expected}, axis has {actual}")]
    AxisMismatch {
        axis: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Value range is empty, inverted or non-finite
    #[error("Invalid value range: [{min}, {max}]")]
    InvalidRange { min: f64, max: f64 },

    /// Upscaling factor of zero
    #[error("Invalid scale factor: {0}")]
    InvalidScale(u32),

    /// Unknown colour ramp name
    #[error("Unknown colour ramp: {0}")]
    UnknownRamp(String),

    /// zlib compression failed
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] std::io::Error),
}
