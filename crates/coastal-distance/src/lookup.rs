//! Nearest-cell distance-to-coast queries.

use gnssr_common::{GridIndexer, MapGrid};
use tracing::{info, warn};

use crate::error::{CoastalError, CoastalResult};
use crate::raster::CoastalRaster;
use crate::source::RasterSource;

/// Outcome of [`CoastDistanceLookup::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Raster read and validated
    Loaded { lats: usize, lons: usize },
    /// Resource absent; the lookup stays unloaded
    Unloaded { resource: String },
}

impl LoadResult {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResult::Loaded { .. })
    }
}

/// Distance-to-coast lookup against a pre-gridded raster.
///
/// Starts unloaded. A missing raster is not an error: [`load`] reports
/// [`LoadResult::Unloaded`] and later queries fail with
/// [`CoastalError::NotLoaded`].
///
/// [`load`]: CoastDistanceLookup::load
#[derive(Debug, Clone, Default)]
pub struct CoastDistanceLookup {
    raster: Option<CoastalRaster>,
}

impl CoastDistanceLookup {
    /// An unloaded lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// A lookup over an already validated raster.
    pub fn from_raster(raster: CoastalRaster) -> Self {
        Self {
            raster: Some(raster),
        }
    }

    /// Read the raster from `source`, replacing anything loaded before.
    ///
    /// The previous raster is discarded first, so any failure leaves the
    /// lookup unloaded.
    pub fn load<S>(&mut self, source: &S) -> CoastalResult<LoadResult>
    where
        S: RasterSource + ?Sized,
    {
        self.raster = None;

        match source.read() {
            Ok(raster) => {
                let (lats, lons) = raster.shape();
                info!(
                    resource = %source.describe(),
                    lats = lats,
                    lons = lons,
                    max_km = raster.max_km(),
                    resolution_km = raster.resolution_km(),
                    "Loaded coastal distance raster"
                );
                self.raster = Some(raster);
                Ok(LoadResult::Loaded { lats, lons })
            }
            Err(CoastalError::ResourceNotFound(resource)) => {
                warn!(
                    resource = %resource,
                    "Coastal distance raster not found, lookup unavailable"
                );
                Ok(LoadResult::Unloaded { resource })
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.raster.is_some()
    }

    pub fn raster(&self) -> Option<&CoastalRaster> {
        self.raster.as_ref()
    }

    fn loaded(&self) -> CoastalResult<&CoastalRaster> {
        self.raster.as_ref().ok_or(CoastalError::NotLoaded)
    }

    /// Distance (km) of the raster cell nearest to `(lat, lon)`.
    pub fn query(&self, lat: f64, lon: f64) -> CoastalResult<f64> {
        Ok(self.loaded()?.nearest(lat, lon))
    }

    /// [`query`](Self::query) over parallel coordinate arrays.
    pub fn query_batch(&self, lats: &[f64], lons: &[f64]) -> CoastalResult<Vec<f64>> {
        if lats.len() != lons.len() {
            return Err(CoastalError::LengthMismatch {
                lats: lats.len(),
                lons: lons.len(),
            });
        }

        let raster = self.loaded()?;
        Ok(lats
            .iter()
            .zip(lons)
            .map(|(&lat, &lon)| raster.nearest(lat, lon))
            .collect())
    }

    /// Sample the raster at every axis point of an accumulation grid.
    ///
    /// Row `i` holds `lat_scale[i]` and column `j` holds `lon_scale[j]`, the
    /// same south-up orientation as an averaged accumulator grid.
    pub fn distance_grid(&self, indexer: &GridIndexer) -> CoastalResult<MapGrid> {
        let raster = self.loaded()?;

        // Axes are searched independently, so resolve each once
        let rows: Vec<usize> = indexer
            .lat_scale()
            .iter()
            .map(|&lat| raster.nearest_lat_index(lat))
            .collect();
        let cols: Vec<usize> = indexer
            .lon_scale()
            .iter()
            .map(|&lon| raster.nearest_lon_index(lon))
            .collect();

        let width = raster.lons().len();
        let data = raster.data();
        Ok(MapGrid::from_fn(rows.len(), cols.len(), |i, j| {
            data[rows[i] * width + cols[j]]
        }))
    }
}
