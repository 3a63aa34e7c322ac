//! Readers for per-segment observation files.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use gnssr_common::ObservationBatch;

use crate::config::{FeedConfig, FeedFormat};

/// Reads one observation file into a batch.
///
/// A missing file is `Ok(None)`: the archive is populated only for the
/// segments in which the instrument was running.
pub trait FeedReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<Option<ObservationBatch>>;
}

/// `{"lats": [..], "lons": [..], "values": [..]}` documents. `null` values
/// are missing data.
#[derive(Debug, Clone, Default)]
pub struct JsonFeedReader;

impl FeedReader for JsonFeedReader {
    fn read(&self, path: &Path) -> Result<Option<ObservationBatch>> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read feed: {}", path.display()))
            }
        };

        let batch = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse feed: {}", path.display()))?;
        Ok(Some(batch))
    }
}

/// Build the reader for a feed configuration.
pub fn reader_for(config: &FeedConfig) -> Result<Box<dyn FeedReader>> {
    match config.format {
        FeedFormat::Json => Ok(Box::new(JsonFeedReader)),
        FeedFormat::Netcdf => netcdf_reader(config),
    }
}

#[cfg(feature = "netcdf")]
fn netcdf_reader(config: &FeedConfig) -> Result<Box<dyn FeedReader>> {
    Ok(Box::new(native::NetCdfFeedReader::new(config)))
}

#[cfg(not(feature = "netcdf"))]
fn netcdf_reader(_config: &FeedConfig) -> Result<Box<dyn FeedReader>> {
    anyhow::bail!("NetCDF feeds require the `netcdf` feature")
}

#[cfg(feature = "netcdf")]
mod native {
    use super::*;
    use anyhow::anyhow;

    /// Reads three named variables from a NetCDF-4 product file.
    ///
    /// Variables are flattened row-major; `_FillValue` and non-finite
    /// entries become NaN.
    #[derive(Debug, Clone)]
    pub struct NetCdfFeedReader {
        lat_var: String,
        lon_var: String,
        value_var: String,
    }

    impl NetCdfFeedReader {
        pub fn new(config: &FeedConfig) -> Self {
            Self {
                lat_var: config.lat_var.clone(),
                lon_var: config.lon_var.clone(),
                value_var: config.value_var.clone(),
            }
        }
    }

    impl FeedReader for NetCdfFeedReader {
        fn read(&self, path: &Path) -> Result<Option<ObservationBatch>> {
            if !path.exists() {
                return Ok(None);
            }

            coastal_distance::silence_hdf5_errors();

            let file = netcdf::open(path)
                .with_context(|| format!("Failed to open NetCDF feed: {}", path.display()))?;

            let lats = read_variable(&file, &self.lat_var)?;
            let lons = read_variable(&file, &self.lon_var)?;
            let values = read_variable(&file, &self.value_var)?;

            let batch = ObservationBatch::new(lats, lons, values)
                .with_context(|| format!("Inconsistent feed variables in {}", path.display()))?;
            Ok(Some(batch))
        }
    }

    fn read_variable(file: &netcdf::File, name: &str) -> Result<Vec<f64>> {
        let var = file
            .variable(name)
            .ok_or_else(|| anyhow!("Missing variable: {}", name))?;

        let mut values: Vec<f64> = var
            .get_values(..)
            .with_context(|| format!("Failed to read variable: {}", name))?;

        if let Some(fill) = get_f64_attr(&var, "_FillValue") {
            for v in values.iter_mut().filter(|v| **v == fill) {
                *v = f64::NAN;
            }
        }

        Ok(values)
    }

    /// Check for the attribute first to avoid HDF5 error spam.
    fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
        if !var.attributes().any(|attr| attr.name() == name) {
            return None;
        }
        let attr_value = var.attribute_value(name)?.ok()?;
        f64::try_from(attr_value).ok()
    }
}
