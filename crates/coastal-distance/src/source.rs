//! Backends that produce a [`CoastalRaster`].

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{CoastalError, CoastalResult};
use crate::raster::{CoastalRaster, RasterArrays};

/// A resource a coastal raster can be read from.
///
/// Implementations return [`CoastalError::ResourceNotFound`] when the
/// resource does not exist so that the lookup can fall back to its
/// unloaded state. Any other failure is a real error.
pub trait RasterSource {
    /// Identifier of the resource for logs and errors.
    fn describe(&self) -> String;

    /// Read and validate the raster.
    fn read(&self) -> CoastalResult<CoastalRaster>;
}

/// Raster arrays held in memory.
#[derive(Debug, Clone)]
pub struct MemorySource {
    name: String,
    arrays: Option<RasterArrays>,
}

impl MemorySource {
    pub fn new(arrays: RasterArrays) -> Self {
        Self {
            name: "memory".to_string(),
            arrays: Some(arrays),
        }
    }

    /// A source that reports itself as missing.
    pub fn missing(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arrays: None,
        }
    }
}

impl RasterSource for MemorySource {
    fn describe(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> CoastalResult<CoastalRaster> {
        match &self.arrays {
            Some(arrays) => CoastalRaster::try_from(arrays.clone()),
            None => Err(CoastalError::ResourceNotFound(self.name.clone())),
        }
    }
}

/// JSON document with `array`, `lats`, `lons`, `maxkm` and `res` keys.
#[derive(Debug, Clone)]
pub struct JsonRasterFile {
    path: PathBuf,
}

impl JsonRasterFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RasterSource for JsonRasterFile {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> CoastalResult<CoastalRaster> {
        let bytes = std::fs::read(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => CoastalError::ResourceNotFound(self.describe()),
            _ => CoastalError::Io(e),
        })?;

        let arrays: RasterArrays = serde_json::from_slice(&bytes)
            .map_err(|e| CoastalError::Format(format!("{}: {}", self.describe(), e)))?;

        debug!(
            path = %self.path.display(),
            lats = arrays.lats.len(),
            lons = arrays.lons.len(),
            "Read JSON coastal raster"
        );

        CoastalRaster::try_from(arrays)
    }
}

/// Pick a backend from the file extension.
///
/// `.nc`, `.h5` and `.hdf5` files need the `netcdf` feature; everything else
/// is read as JSON.
pub fn open_source(path: impl AsRef<Path>) -> CoastalResult<Box<dyn RasterSource + Send + Sync>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("nc") | Some("h5") | Some("hdf5") => native_source(path),
        _ => Ok(Box::new(JsonRasterFile::new(path))),
    }
}

#[cfg(feature = "netcdf")]
fn native_source(path: &Path) -> CoastalResult<Box<dyn RasterSource + Send + Sync>> {
    Ok(Box::new(crate::native::NetCdfRasterFile::new(path)))
}

#[cfg(not(feature = "netcdf"))]
fn native_source(path: &Path) -> CoastalResult<Box<dyn RasterSource + Send + Sync>> {
    Err(CoastalError::Format(format!(
        "{}: NetCDF/HDF5 rasters require the `netcdf` feature",
        path.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrays() -> RasterArrays {
        RasterArrays {
            array: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
            lats: vec![0.0, 1.0],
            lons: vec![10.0, 11.0],
            max_km: 100.0,
            resolution_km: 5.0,
        }
    }

    #[test]
    fn test_memory_source_reads() {
        let raster = MemorySource::new(arrays()).read().unwrap();
        assert_eq!(raster.data(), &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(raster.max_km(), 100.0);
    }

    #[test]
    fn test_memory_source_missing() {
        let err = MemorySource::missing("coast.h5").read().unwrap_err();
        assert!(matches!(err, CoastalError::ResourceNotFound(name) if name == "coast.h5"));
    }

    #[test]
    fn test_json_missing_file_is_not_found() {
        let source = JsonRasterFile::new("/nonexistent/coast.json");
        assert!(matches!(
            source.read(),
            Err(CoastalError::ResourceNotFound(_))
        ));
    }

    #[test]
    fn test_json_malformed_is_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coast.json");
        std::fs::write(&path, b"{\"lats\": [1.0]}").unwrap();

        let err = JsonRasterFile::new(&path).read().unwrap_err();
        assert!(matches!(err, CoastalError::Format(_)));
    }

    #[test]
    fn test_open_source_by_extension() {
        let source = open_source("coast.json").unwrap();
        assert_eq!(source.describe(), "coast.json");

        #[cfg(not(feature = "netcdf"))]
        assert!(matches!(
            open_source("coast.h5"),
            Err(CoastalError::Format(_))
        ));
    }
}
