//! The segment mapping pipeline.
//!
//! ```text
//! segments_between(start, stop)
//!        |
//!        v  (rayon, one task per segment of a window)
//! FeedReader::read ──missing──> warn + count
//!        |
//!        v
//! drop points outside the grid ──> drop points near the coast
//!        |
//!        v  (window done, in segment order)
//! SharedMapAccumulator::accumulate_batch
//!        |
//!        v
//! MapAccumulator::average ──> MapGrid
//! ```
//!
//! Reading and filtering run in parallel, but batches are applied in segment
//! order so that floating-point sums do not depend on thread scheduling.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use coastal_distance::{open_source, CoastDistanceLookup};
use gnssr_common::{
    segment_dir, segments_between, GridIndexer, MapGrid, ObservationBatch, TimeSegment,
};
use grid_processor::{MapAccumulator, SharedMapAccumulator};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MapperConfig;
use crate::feed::{reader_for, FeedReader};
use crate::metrics;

/// Summary of a mapping run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub segments_total: usize,
    pub segments_processed: usize,
    pub segments_missing: usize,
    pub observations_read: u64,
    /// Dropped because they fold outside the grid
    pub observations_off_grid: u64,
    /// Dropped by the coastal distance filter
    pub observations_near_coast: u64,
    /// Passed to the accumulator, NaN values included
    pub observations_kept: u64,
    pub populated_cells: usize,
}

/// A segment after reading and filtering, before accumulation.
#[derive(Debug)]
enum SegmentOutcome {
    Missing,
    Filtered {
        batch: ObservationBatch,
        read: u64,
        off_grid: u64,
        near_coast: u64,
    },
}

/// Output of [`Mapper::run`].
#[derive(Debug, Clone)]
pub struct MapOutput {
    pub accumulator: MapAccumulator,
    pub stats: RunStats,
}

impl MapOutput {
    /// The averaged map, south-up.
    pub fn average(&self) -> MapGrid {
        self.accumulator.average()
    }
}

/// Grids the observations of every segment in a period.
pub struct Mapper {
    config: MapperConfig,
    indexer: GridIndexer,
    reader: Box<dyn FeedReader>,
    coast: CoastDistanceLookup,
}

impl Mapper {
    /// Build a mapper from a validated configuration.
    ///
    /// Loads the coastal raster if one is configured. A missing raster
    /// disables the coastal filter with a warning instead of failing the run.
    pub fn new(config: MapperConfig) -> Result<Self> {
        let reader = reader_for(&config.feed)?;

        let mut coast = CoastDistanceLookup::new();
        if let Some(path) = &config.coast.raster {
            let source = open_source(path)?;
            let result = coast
                .load(source.as_ref())
                .with_context(|| format!("Failed to load coastal raster: {}", path.display()))?;
            if !result.is_loaded() && config.coast.min_distance_km.is_some() {
                warn!(
                    raster = %path.display(),
                    "Coastal raster unavailable, coastal filter disabled"
                );
            }
        }

        Self::with_parts(config, reader, coast)
    }

    /// Build a mapper from already constructed collaborators.
    pub fn with_parts(
        config: MapperConfig,
        reader: Box<dyn FeedReader>,
        coast: CoastDistanceLookup,
    ) -> Result<Self> {
        let indexer =
            GridIndexer::new(config.grid.cell_size_km).context("Invalid grid.cell_size_km")?;

        Ok(Self {
            config,
            indexer,
            reader,
            coast,
        })
    }

    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    /// Feed file of one segment.
    pub fn segment_path(&self, segment: &TimeSegment) -> PathBuf {
        let archive = &self.config.archive;
        segment_dir(&archive.root, archive.level, segment)
            .join(self.config.feed.file_name(archive.level))
    }

    /// Accumulate every complete segment between `start` and `stop`.
    ///
    /// Missing segment files are skipped. Any other read or accumulation
    /// failure aborts the run. Batches are applied in segment order, so
    /// repeated runs over the same archive give identical sums.
    pub fn run(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> Result<MapOutput> {
        let segments = segments_between(start, stop);
        info!(
            segments = segments.len(),
            start = %start,
            stop = %stop,
            cell_size_km = self.indexer.cell_size_km(),
            lon_cells = self.indexer.lon_cells(),
            lat_cells = self.indexer.lat_cells(),
            "Starting mapping run"
        );

        let shared = SharedMapAccumulator::new(MapAccumulator::new(self.indexer.clone()));
        let mut stats = RunStats {
            segments_total: segments.len(),
            ..Default::default()
        };

        let window = rayon::current_num_threads().max(1);
        for chunk in segments.chunks(window) {
            let outcomes = chunk
                .par_iter()
                .map(|segment| self.filter_segment(segment))
                .collect::<Result<Vec<_>>>()?;

            for (segment, outcome) in chunk.iter().zip(outcomes) {
                match outcome {
                    SegmentOutcome::Missing => stats.segments_missing += 1,
                    SegmentOutcome::Filtered {
                        batch,
                        read,
                        off_grid,
                        near_coast,
                    } => {
                        let kept = batch.len() as u64;
                        shared
                            .accumulate_batch(&batch)
                            .with_context(|| format!("Failed to accumulate segment {}", segment))?;
                        metrics::record_segment_processed();
                        metrics::record_observations(read, kept);

                        stats.segments_processed += 1;
                        stats.observations_read += read;
                        stats.observations_off_grid += off_grid;
                        stats.observations_near_coast += near_coast;
                        stats.observations_kept += kept;
                    }
                }
            }
        }

        let accumulator = shared.into_inner()?;
        stats.populated_cells = accumulator.populated_cells();

        info!(
            segments_processed = stats.segments_processed,
            segments_missing = stats.segments_missing,
            observations_read = stats.observations_read,
            observations_kept = stats.observations_kept,
            populated_cells = stats.populated_cells,
            coverage = accumulator.summary().coverage(),
            "Mapping run complete"
        );

        Ok(MapOutput { accumulator, stats })
    }

    fn filter_segment(&self, segment: &TimeSegment) -> Result<SegmentOutcome> {
        let path = self.segment_path(segment);

        let mut batch = match self.reader.read(&path)? {
            Some(batch) => batch,
            None => {
                warn!(
                    segment = %segment,
                    path = %path.display(),
                    "Segment file not found, skipping"
                );
                metrics::record_segment_missing();
                return Ok(SegmentOutcome::Missing);
            }
        };

        let read = batch.len() as u64;

        // Points that fold outside the grid would fail the whole batch
        let on_grid: Vec<bool> = batch
            .iter()
            .map(|(lat, lon, _)| self.indexer.cell(lat, lon).is_ok())
            .collect();
        let off_grid = on_grid.iter().filter(|&&keep| !keep).count() as u64;
        batch.retain_mask(&on_grid)?;

        let mut near_coast = 0;
        if let Some(min_km) = self.config.coast.min_distance_km {
            if self.coast.is_loaded() {
                let distances = self.coast.query_batch(batch.lats(), batch.lons())?;
                let offshore: Vec<bool> = distances.iter().map(|&d| d >= min_km).collect();
                near_coast = offshore.iter().filter(|&&keep| !keep).count() as u64;
                batch.retain_mask(&offshore)?;
            }
        }

        debug!(
            segment = %segment,
            read = read,
            off_grid = off_grid,
            near_coast = near_coast,
            kept = batch.len(),
            "Filtered segment"
        );

        Ok(SegmentOutcome::Filtered {
            batch,
            read,
            off_grid,
            near_coast,
        })
    }
}
