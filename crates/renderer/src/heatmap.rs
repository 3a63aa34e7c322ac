//! Averaged-map rendering.
//!
//! The accumulation core hands over an owned [`MapFrame`]: a south-up
//! [`MapGrid`] plus the axis scales and limits of its grid. Renderers flip
//! it north-up exactly once, colour it and encode it.

use gnssr_common::{GridIndexer, MapGrid};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RenderError;
use crate::gradient::{quantize, render_grid, upscale, ColorRamp};
use crate::png::encode_png;

/// An averaged grid together with the geometry needed to draw it.
#[derive(Debug, Clone, PartialEq)]
pub struct MapFrame {
    /// Row 0 is the southernmost latitude
    pub grid: MapGrid,
    pub lon_scale: Vec<f64>,
    pub lat_scale: Vec<f64>,
    pub x_lim: f64,
    pub y_lim: f64,
}

impl MapFrame {
    /// Frame a grid produced on `indexer`'s axes.
    pub fn new(grid: MapGrid, indexer: &GridIndexer) -> Result<Self, RenderError> {
        let frame = Self {
            grid,
            lon_scale: indexer.lon_scale().to_vec(),
            lat_scale: indexer.lat_scale().to_vec(),
            x_lim: indexer.x_lim(),
            y_lim: indexer.y_lim(),
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Check that the axes match the grid shape.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.lon_scale.len() != self.grid.cols() {
            return Err(RenderError::AxisMismatch {
                axis: "longitude",
                expected: self.grid.cols(),
                actual: self.lon_scale.len(),
            });
        }
        if self.lat_scale.len() != self.grid.rows() {
            return Err(RenderError::AxisMismatch {
                axis: "latitude",
                expected: self.grid.rows(),
                actual: self.lat_scale.len(),
            });
        }
        Ok(())
    }

    /// Map extent as `[min_lon, max_lon, min_lat, max_lat]`.
    pub fn extent(&self) -> [f64; 4] {
        [-self.x_lim, self.x_lim, -self.y_lim, self.y_lim]
    }
}

/// How values are mapped onto the colour ramp.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ValueRange {
    /// Minimum and maximum finite value of the grid
    #[default]
    Auto,
    /// Fixed bounds; values outside are clamped
    Fixed { min: f64, max: f64 },
}

impl ValueRange {
    /// Resolve to concrete bounds for `grid`.
    ///
    /// An automatic range over a grid with no data resolves to `(0, 1)`.
    pub fn resolve(&self, grid: &MapGrid) -> Result<(f64, f64), RenderError> {
        match *self {
            ValueRange::Auto => Ok(grid.finite_range().unwrap_or((0.0, 1.0))),
            ValueRange::Fixed { min, max } => {
                if !min.is_finite() || !max.is_finite() || min > max {
                    return Err(RenderError::InvalidRange { min, max });
                }
                Ok((min, max))
            }
        }
    }
}

/// Rendering options shared by all heatmap renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapOptions {
    #[serde(default)]
    pub ramp: ColorRamp,

    #[serde(default)]
    pub range: ValueRange,

    /// Output pixels per grid cell along each axis
    #[serde(default = "default_scale")]
    pub scale: u32,

    /// Distinct colours used from the ramp
    #[serde(default = "default_levels")]
    pub levels: usize,
}

fn default_scale() -> u32 {
    2
}

fn default_levels() -> usize {
    // One palette slot stays free for transparent no-data cells
    255
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            ramp: ColorRamp::default(),
            range: ValueRange::default(),
            scale: default_scale(),
            levels: default_levels(),
        }
    }
}

/// An encoded map image.
#[derive(Debug, Clone)]
pub struct RenderedMap {
    pub bytes: Vec<u8>,
    pub width: usize,
    pub height: usize,
    /// Values mapped to the ends of the ramp
    pub value_range: (f64, f64),
}

/// Consumer of averaged map snapshots.
pub trait HeatmapRenderer {
    fn render(&self, frame: MapFrame) -> Result<RenderedMap, RenderError>;
}

/// Renders frames as PNG images, north up, one colour per cell.
#[derive(Debug, Clone, Default)]
pub struct PngHeatmapRenderer {
    options: HeatmapOptions,
}

impl PngHeatmapRenderer {
    pub fn new(options: HeatmapOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &HeatmapOptions {
        &self.options
    }
}

impl HeatmapRenderer for PngHeatmapRenderer {
    fn render(&self, frame: MapFrame) -> Result<RenderedMap, RenderError> {
        frame.validate()?;
        if self.options.scale == 0 {
            return Err(RenderError::InvalidScale(0));
        }

        let (min, max) = self.options.range.resolve(&frame.grid)?;
        let grid = frame.grid.flipped_north_up();
        let (cols, rows) = (grid.cols(), grid.rows());

        let ramp = self.options.ramp;
        let levels = self.options.levels;
        let pixels = render_grid(grid.data(), cols, rows, min, max, |t| {
            ramp.color(quantize(t, levels))
        })?;

        let scale = self.options.scale as usize;
        let pixels = upscale(&pixels, cols, rows, scale);
        let (width, height) = (cols * scale, rows * scale);
        let bytes = encode_png(&pixels, width, height)?;

        debug!(
            width = width,
            height = height,
            min = min,
            max = max,
            bytes = bytes.len(),
            "Rendered heatmap"
        );

        Ok(RenderedMap {
            bytes,
            width,
            height,
            value_range: (min, max),
        })
    }
}
