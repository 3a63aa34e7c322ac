//! Colour ramps and gradient rendering for gridded map values.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// Linear color interpolation
fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = t.clamp(0.0, 1.0);
    let t_inv = 1.0 - t;

    Color::new(
        ((color1.r as f64 * t_inv) + (color2.r as f64 * t)).round() as u8,
        ((color1.g as f64 * t_inv) + (color2.g as f64 * t)).round() as u8,
        ((color1.b as f64 * t_inv) + (color2.b as f64 * t)).round() as u8,
        ((color1.a as f64 * t_inv) + (color2.a as f64 * t)).round() as u8,
    )
}

/// Named colour ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorRamp {
    /// Dark blue through cyan and yellow to dark red
    #[default]
    Jet,
    /// Black to white
    Gray,
    /// Deep blue through white to sand, for distance-to-coast previews
    Coast,
}

const JET_STOPS: &[(f64, Color)] = &[
    (0.0, Color::rgb(0, 0, 128)),
    (0.125, Color::rgb(0, 0, 255)),
    (0.375, Color::rgb(0, 255, 255)),
    (0.625, Color::rgb(255, 255, 0)),
    (0.875, Color::rgb(255, 0, 0)),
    (1.0, Color::rgb(128, 0, 0)),
];

const GRAY_STOPS: &[(f64, Color)] = &[(0.0, Color::rgb(0, 0, 0)), (1.0, Color::rgb(255, 255, 255))];

const COAST_STOPS: &[(f64, Color)] = &[
    (0.0, Color::rgb(210, 180, 140)),
    (0.05, Color::rgb(255, 255, 255)),
    (0.3, Color::rgb(100, 200, 255)),
    (1.0, Color::rgb(8, 48, 107)),
];

impl ColorRamp {
    pub fn from_name(name: &str) -> Result<Self, RenderError> {
        match name.to_ascii_lowercase().as_str() {
            "jet" => Ok(ColorRamp::Jet),
            "gray" | "grey" => Ok(ColorRamp::Gray),
            "coast" => Ok(ColorRamp::Coast),
            _ => Err(RenderError::UnknownRamp(name.to_string())),
        }
    }

    fn stops(&self) -> &'static [(f64, Color)] {
        match self {
            ColorRamp::Jet => JET_STOPS,
            ColorRamp::Gray => GRAY_STOPS,
            ColorRamp::Coast => COAST_STOPS,
        }
    }

    /// Colour for a normalized value in [0, 1]. Out-of-range input is clamped.
    pub fn color(&self, normalized: f64) -> Color {
        let stops = self.stops();
        let t = normalized.clamp(0.0, 1.0);

        for pair in stops.windows(2) {
            let (lo, c1) = pair[0];
            let (hi, c2) = pair[1];
            if t <= hi {
                return interpolate_color(c1, c2, (t - lo) / (hi - lo));
            }
        }

        stops[stops.len() - 1].1
    }
}

/// Render grid data as a gradient heatmap
///
/// # Arguments
/// - `data`: 2D grid of values (row-major order)
/// - `width`: Number of columns
/// - `height`: Number of rows
/// - `min_val`: Value mapped to the bottom of the ramp
/// - `max_val`: Value mapped to the top of the ramp
/// - `color_fn`: Function to convert a normalized value (0-1) to a color
///
/// Non-finite values are missing data and render fully transparent.
///
/// # Returns
/// RGBA pixel data (4 bytes per pixel)
pub fn render_grid<F>(
    data: &[f64],
    width: usize,
    height: usize,
    min_val: f64,
    max_val: f64,
    color_fn: F,
) -> Result<Vec<u8>, RenderError>
where
    F: Fn(f64) -> Color,
{
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidDimensions { width, height });
    }
    if data.len() != width * height {
        return Err(RenderError::BufferSize {
            expected: width * height,
            actual: data.len(),
        });
    }

    let range = max_val - min_val;
    let range = if range.abs() < f64::EPSILON { 1.0 } else { range };

    let mut pixels = vec![0u8; width * height * 4];
    for (pixel, &value) in pixels.chunks_exact_mut(4).zip(data) {
        let color = if value.is_finite() {
            color_fn(((value - min_val) / range).clamp(0.0, 1.0))
        } else {
            Color::transparent()
        };
        pixel.copy_from_slice(&[color.r, color.g, color.b, color.a]);
    }

    Ok(pixels)
}

/// Snap a normalized value onto `levels` evenly spaced steps.
///
/// Keeps the number of distinct colours small enough for indexed PNG
/// encoding. `levels < 2` disables quantization.
pub fn quantize(normalized: f64, levels: usize) -> f64 {
    if levels < 2 {
        return normalized;
    }
    let steps = (levels - 1) as f64;
    (normalized.clamp(0.0, 1.0) * steps).round() / steps
}

/// Nearest-neighbour upscaling of RGBA pixels by an integer factor.
pub fn upscale(pixels: &[u8], width: usize, height: usize, scale: usize) -> Vec<u8> {
    if scale <= 1 {
        return pixels.to_vec();
    }

    let out_width = width * scale;
    let mut out = Vec::with_capacity(pixels.len() * scale * scale);

    for row in pixels.chunks_exact(width * 4).take(height) {
        let mut scaled_row = Vec::with_capacity(out_width * 4);
        for pixel in row.chunks_exact(4) {
            for _ in 0..scale {
                scaled_row.extend_from_slice(pixel);
            }
        }
        for _ in 0..scale {
            out.extend_from_slice(&scaled_row);
        }
    }

    out
}
