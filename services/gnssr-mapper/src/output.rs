//! Writing rendered maps and grid dumps.

use std::path::Path;

use anyhow::{bail, Context, Result};
use coastal_distance::{open_source, CoastDistanceLookup};
use gnssr_common::{GridIndexer, MapGrid};
use renderer::{
    ColorRamp, HeatmapOptions, HeatmapRenderer, MapFrame, PngHeatmapRenderer, RenderedMap,
};
use serde::Serialize;
use tracing::info;

/// JSON form of an averaged grid. NaN cells serialize as `null`.
#[derive(Debug, Serialize)]
pub struct GridDump<'a> {
    pub cell_size_km: f64,
    pub extent: [f64; 4],
    pub lon_scale: &'a [f64],
    pub lat_scale: &'a [f64],
    /// `[lat][lon]`, row 0 southernmost
    pub values: Vec<Vec<f64>>,
}

impl<'a> GridDump<'a> {
    pub fn new(indexer: &'a GridIndexer, grid: &MapGrid) -> Self {
        Self {
            cell_size_km: indexer.cell_size_km(),
            extent: indexer.extent(),
            lon_scale: indexer.lon_scale(),
            lat_scale: indexer.lat_scale(),
            values: grid.to_rows(),
        }
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Render `grid` and write it as a PNG.
pub fn write_png(
    path: &Path,
    grid: MapGrid,
    indexer: &GridIndexer,
    options: &HeatmapOptions,
) -> Result<RenderedMap> {
    let frame = MapFrame::new(grid, indexer)?;
    let rendered = PngHeatmapRenderer::new(options.clone()).render(frame)?;

    create_parent(path)?;
    std::fs::write(path, &rendered.bytes)
        .with_context(|| format!("Failed to write PNG: {}", path.display()))?;

    info!(
        path = %path.display(),
        width = rendered.width,
        height = rendered.height,
        min = rendered.value_range.0,
        max = rendered.value_range.1,
        "Wrote map image"
    );
    Ok(rendered)
}

/// Write `grid` as a JSON dump.
pub fn write_json(path: &Path, grid: &MapGrid, indexer: &GridIndexer) -> Result<()> {
    let dump = GridDump::new(indexer, grid);
    let bytes = serde_json::to_vec(&dump).context("Failed to serialize grid")?;

    create_parent(path)?;
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write JSON: {}", path.display()))?;

    info!(path = %path.display(), "Wrote grid dump");
    Ok(())
}

/// Sample a coastal raster on an accumulation grid and render it.
pub fn coast_preview(
    raster: &Path,
    cell_size_km: f64,
    output: &Path,
    options: &HeatmapOptions,
) -> Result<RenderedMap> {
    let mut lookup = CoastDistanceLookup::new();
    let source = open_source(raster)?;
    if !lookup.load(source.as_ref())?.is_loaded() {
        bail!("Coastal raster not found: {}", raster.display());
    }

    let indexer = GridIndexer::new(cell_size_km).context("Invalid cell size")?;
    let grid = lookup.distance_grid(&indexer)?;
    write_png(output, grid, &indexer, options)
}

/// Rendering options for coastal previews.
pub fn coast_preview_options(scale: u32) -> HeatmapOptions {
    HeatmapOptions {
        ramp: ColorRamp::Coast,
        scale,
        ..Default::default()
    }
}
