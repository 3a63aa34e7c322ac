//! Run configuration for the mapper.
//!
//! Loaded from a YAML file and then overridden field by field from the
//! command line. Every section has defaults so a minimal file only needs
//! the archive root and the period.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use gnssr_common::{parse_datetime, DataLevel, GridIndexer};
use renderer::{HeatmapOptions, ValueRange};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Root configuration of a mapping run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MapperConfig {
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub period: Option<PeriodConfig>,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub coast: CoastConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub render: HeatmapOptions,
}

/// Location of the local segment archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_root")]
    pub root: PathBuf,
    #[serde(default = "default_level")]
    pub level: DataLevel,
}

fn default_archive_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_level() -> DataLevel {
    DataLevel::L2Fdi
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            root: default_archive_root(),
            level: default_level(),
        }
    }
}

/// Time range to map. Accepts RFC 3339 timestamps or bare dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeriodConfig {
    pub start: String,
    pub stop: String,
}

impl PeriodConfig {
    pub fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
        let start = parse_datetime(&self.start).context("Invalid period start")?;
        let stop = parse_datetime(&self.stop).context("Invalid period stop")?;
        Ok((start, stop))
    }
}

/// Accumulation grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_cell_size_km")]
    pub cell_size_km: f64,
}

fn default_cell_size_km() -> f64 {
    50.0
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            cell_size_km: default_cell_size_km(),
        }
    }
}

/// On-disk format of per-segment observation files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    #[default]
    Json,
    Netcdf,
}

/// Observation feed files inside each segment directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub format: FeedFormat,
    /// File name within the segment directory. Defaults to
    /// `observations.json` for JSON and the level's first product for NetCDF.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_lat_var")]
    pub lat_var: String,
    #[serde(default = "default_lon_var")]
    pub lon_var: String,
    #[serde(default = "default_value_var")]
    pub value_var: String,
}

fn default_lat_var() -> String {
    "SpecularPointLat".to_string()
}

fn default_lon_var() -> String {
    "SpecularPointLon".to_string()
}

fn default_value_var() -> String {
    "DDMSNRAtPeakSingleDDM".to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            format: FeedFormat::default(),
            file: None,
            lat_var: default_lat_var(),
            lon_var: default_lon_var(),
            value_var: default_value_var(),
        }
    }
}

impl FeedConfig {
    /// Feed file name for segments of `level`.
    pub fn file_name(&self, level: DataLevel) -> String {
        match (&self.file, self.format) {
            (Some(file), _) => file.clone(),
            (None, FeedFormat::Json) => "observations.json".to_string(),
            (None, FeedFormat::Netcdf) => level.files()[0].to_string(),
        }
    }
}

/// Coastal distance filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoastConfig {
    /// Distance-to-coast raster (`.json`, or `.nc`/`.h5` with the `netcdf` feature)
    #[serde(default)]
    pub raster: Option<PathBuf>,
    /// Drop observations closer to the coast than this (km)
    #[serde(default)]
    pub min_distance_km: Option<f64>,
}

/// Output files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_png")]
    pub png: PathBuf,
    /// Optional JSON dump of the averaged grid
    #[serde(default)]
    pub json: Option<PathBuf>,
}

fn default_png() -> PathBuf {
    PathBuf::from("gnssr_map.png")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            png: default_png(),
            json: None,
        }
    }
}

impl MapperConfig {
    /// Load a configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: MapperConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded mapper config");
        Ok(config)
    }

    /// Check the configuration before a run starts.
    pub fn validate(&self) -> Result<()> {
        GridIndexer::new(self.grid.cell_size_km).context("Invalid grid.cell_size_km")?;

        match &self.period {
            Some(period) => {
                let (start, stop) = period.range()?;
                if stop <= start {
                    bail!("period.stop must be after period.start");
                }
            }
            None => bail!("No period configured"),
        }

        if let Some(min) = self.coast.min_distance_km {
            if !min.is_finite() || min < 0.0 {
                bail!("coast.min_distance_km must be a non-negative number, got {}", min);
            }
            if self.coast.raster.is_none() {
                bail!("coast.min_distance_km requires coast.raster");
            }
        }

        if self.render.scale == 0 {
            bail!("render.scale must be at least 1");
        }
        if let ValueRange::Fixed { min, max } = self.render.range {
            if !min.is_finite() || !max.is_finite() || min > max {
                bail!("render.range is invalid: [{}, {}]", min, max);
            }
        }

        if cfg!(not(feature = "netcdf")) && self.feed.format == FeedFormat::Netcdf {
            bail!("feed.format netcdf requires the `netcdf` feature");
        }

        Ok(())
    }
}
