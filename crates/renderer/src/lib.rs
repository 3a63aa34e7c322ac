//! Image rendering for averaged GNSS-R maps.
//!
//! Implements:
//! - Colour ramps and gradient rendering with transparent no-data cells
//! - Indexed and RGBA PNG encoding
//! - The [`HeatmapRenderer`] consumer of averaged map snapshots

pub mod error;
pub mod gradient;
pub mod heatmap;
pub mod png;

pub use error::RenderError;
pub use gradient::{Color, ColorRamp};
pub use heatmap::{
    HeatmapOptions, HeatmapRenderer, MapFrame, PngHeatmapRenderer, RenderedMap, ValueRange,
};
