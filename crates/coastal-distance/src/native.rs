//! NetCDF-4 / HDF5 coastal rasters read with the native netcdf library.
//!
//! The raster file holds five root variables: `array` (2D, `[lat][lon]`),
//! `lats`, `lons`, and the scalars `maxkm` and `res`.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;

use crate::error::{CoastalError, CoastalResult};
use crate::raster::CoastalRaster;
use crate::source::RasterSource;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints diagnostics even for errors the caller handles,
/// such as probing for a variable that does not exist. Call early, before
/// the first NetCDF operation; repeated calls are no-ops.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 with null handlers disables automatic error
        // printing for the default error stack.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// Coastal raster stored in a NetCDF-4 or HDF5 file.
#[derive(Debug, Clone)]
pub struct NetCdfRasterFile {
    path: PathBuf,
}

impl NetCdfRasterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RasterSource for NetCdfRasterFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> CoastalResult<CoastalRaster> {
        // libnetcdf does not report a distinguishable not-found error
        if !self.path.exists() {
            return Err(CoastalError::ResourceNotFound(self.describe()));
        }

        silence_hdf5_errors();

        let file = netcdf::open(&self.path).map_err(|e| {
            CoastalError::Format(format!("Failed to open {}: {}", self.describe(), e))
        })?;

        let data = read_f64_values(&file, "array")?;
        let lats = read_f64_values(&file, "lats")?;
        let lons = read_f64_values(&file, "lons")?;
        let max_km = read_f64_scalar(&file, "maxkm")?;
        let resolution_km = read_f64_scalar(&file, "res")?;

        debug!(
            path = %self.path.display(),
            lats = lats.len(),
            lons = lons.len(),
            max_km = max_km,
            "Read NetCDF coastal raster"
        );

        CoastalRaster::new(lats, lons, data, max_km, resolution_km)
    }
}

/// Read every value of a variable as f64, row-major.
fn read_f64_values(file: &netcdf::File, name: &str) -> CoastalResult<Vec<f64>> {
    let var = file
        .variable(name)
        .ok_or_else(|| CoastalError::Format(format!("Missing variable: {}", name)))?;

    var.get_values::<f64, _>(..)
        .map_err(|e| CoastalError::Format(format!("Failed to read {}: {}", name, e)))
}

fn read_f64_scalar(file: &netcdf::File, name: &str) -> CoastalResult<f64> {
    read_f64_values(file, name)?
        .first()
        .copied()
        .ok_or_else(|| CoastalError::Format(format!("Empty scalar variable: {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_not_found() {
        let source = NetCdfRasterFile::new("/nonexistent/dist_to_coast.nc");
        assert!(matches!(
            source.read(),
            Err(CoastalError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_silence_is_idempotent() {
        silence_hdf5_errors();
        silence_hdf5_errors();
    }
}
