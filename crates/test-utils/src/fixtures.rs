//! Common test fixtures for GNSS-R mapping tests.
//!
//! This module provides pre-defined test data that represents common
//! scenarios in GNSS-R map production.

use std::io;
use std::path::Path;

/// Grid cell sizes used across the test suite (km at the equator).
pub mod cell_sizes {
    /// Coarse grid, 200 x 100 cells
    pub const COARSE: f64 = 200.0;

    /// Production map resolution, 800 x 400 cells
    pub const DEFAULT: f64 = 50.0;

    /// A single cell covers the globe
    pub const SINGLE: f64 = 30_000.0;

    /// Wider than the equator, rejected by the indexer
    pub const TOO_LARGE: f64 = 90_000.0;
}

/// Small coastal distance raster with hand-checkable values.
///
/// ```text
///            lon -1  lon 0  lon 1
///   lat -1     1      2      3
///   lat  0     4      5      6
///   lat  1     7      8      9
/// ```
pub mod raster {
    pub const LATS: [f64; 3] = [-1.0, 0.0, 1.0];
    pub const LONS: [f64; 3] = [-1.0, 0.0, 1.0];
    pub const DATA: [f64; 9] = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0];
    pub const MAX_KM: f64 = 500.0;
    pub const RESOLUTION_KM: f64 = 111.0;

    /// Data as nested rows, `[lat][lon]`.
    pub fn rows() -> Vec<Vec<f64>> {
        DATA.chunks(LONS.len()).map(|r| r.to_vec()).collect()
    }
}

/// Common time ranges for archive tests (RFC 3339).
pub mod times {
    /// One full day, four six hour segments
    pub const DAY_START: &str = "2015-04-01T00:00:00Z";
    pub const DAY_END: &str = "2015-04-02T00:00:00Z";

    /// Shorter than one segment
    pub const SHORT_START: &str = "2015-04-01T00:00:00Z";
    pub const SHORT_END: &str = "2015-04-01T05:00:00Z";

    /// Archive folder of the first segment of the day
    pub const FIRST_SEGMENT_FOLDER: &str = "2015-04/01/H03";
}

/// Write the 3x3 [`raster`] fixture as a JSON raster file.
///
/// Keys follow the coastal raster layout: `array`, `lats`, `lons`, `maxkm`, `res`.
pub fn write_raster_json(path: &Path) -> io::Result<()> {
    write_raster_json_with(
        path,
        &raster::LATS,
        &raster::LONS,
        &raster::rows(),
        raster::MAX_KM,
        raster::RESOLUTION_KM,
    )
}

/// Write an arbitrary coastal raster as a JSON raster file.
pub fn write_raster_json_with(
    path: &Path,
    lats: &[f64],
    lons: &[f64],
    rows: &[Vec<f64>],
    max_km: f64,
    res_km: f64,
) -> io::Result<()> {
    let doc = serde_json::json!({
        "array": rows,
        "lats": lats,
        "lons": lons,
        "maxkm": max_km,
        "res": res_km,
    });
    std::fs::write(path, serde_json::to_vec_pretty(&doc)?)
}

/// Write an observation feed file holding one batch.
///
/// NaN values are written as `null`, matching the feed reader's convention
/// for missing data.
pub fn write_observation_json(
    path: &Path,
    lats: &[f64],
    lons: &[f64],
    vals: &[f64],
) -> io::Result<()> {
    let vals: Vec<Option<f64>> = vals
        .iter()
        .map(|&v| if v.is_finite() { Some(v) } else { None })
        .collect();
    let doc = serde_json::json!({
        "lats": lats,
        "lons": lons,
        "values": vals,
    });
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raster_rows() {
        let rows = raster::rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_write_raster_json() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("coast.json");
        write_raster_json(&path).unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(doc["maxkm"], 500.0);
        assert_eq!(doc["array"][2][0], 7.0);
    }

    #[test]
    fn test_write_observation_json_nulls_nan() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("nested/feed.json");
        write_observation_json(&path, &[1.0, 2.0], &[3.0, 4.0], &[f64::NAN, 5.0]).unwrap();

        let doc: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(doc["values"][0].is_null());
        assert_eq!(doc["values"][1], 5.0);
    }
}
