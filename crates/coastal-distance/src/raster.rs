//! In-memory coastal distance raster.

use serde::{Deserialize, Serialize};

use crate::error::{CoastalError, CoastalResult};

/// The named arrays of a coastal raster, as stored on disk.
///
/// `array` is indexed `[lat][lon]`. Axes need not be uniformly spaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterArrays {
    pub array: Vec<Vec<f64>>,
    pub lats: Vec<f64>,
    pub lons: Vec<f64>,
    /// Distances are capped at this value (km)
    #[serde(rename = "maxkm")]
    pub max_km: f64,
    /// Nominal raster resolution (km)
    #[serde(rename = "res")]
    pub resolution_km: f64,
}

impl TryFrom<RasterArrays> for CoastalRaster {
    type Error = CoastalError;

    fn try_from(arrays: RasterArrays) -> CoastalResult<Self> {
        let n_lons = arrays.lons.len();
        if arrays.array.iter().any(|row| row.len() != n_lons) {
            return Err(CoastalError::ShapeMismatch {
                lats: arrays.lats.len(),
                lons: n_lons,
                values: arrays.array.iter().map(Vec::len).sum(),
            });
        }

        let data = arrays.array.into_iter().flatten().collect();
        CoastalRaster::new(
            arrays.lats,
            arrays.lons,
            data,
            arrays.max_km,
            arrays.resolution_km,
        )
    }
}

/// Validated, read-only distance-to-coast raster.
#[derive(Debug, Clone, PartialEq)]
pub struct CoastalRaster {
    lats: Vec<f64>,
    lons: Vec<f64>,
    /// Row-major `[lat][lon]`
    data: Vec<f64>,
    max_km: f64,
    resolution_km: f64,
}

impl CoastalRaster {
    /// Build a raster from axes and row-major distances.
    ///
    /// Fails with `EmptyAxis` if either axis is empty and with
    /// `ShapeMismatch` if `data` does not hold `lats.len() * lons.len()`
    /// values.
    pub fn new(
        lats: Vec<f64>,
        lons: Vec<f64>,
        data: Vec<f64>,
        max_km: f64,
        resolution_km: f64,
    ) -> CoastalResult<Self> {
        if lats.is_empty() {
            return Err(CoastalError::EmptyAxis { axis: "latitude" });
        }
        if lons.is_empty() {
            return Err(CoastalError::EmptyAxis { axis: "longitude" });
        }
        if data.len() != lats.len() * lons.len() {
            return Err(CoastalError::ShapeMismatch {
                lats: lats.len(),
                lons: lons.len(),
                values: data.len(),
            });
        }

        Ok(Self {
            lats,
            lons,
            data,
            max_km,
            resolution_km,
        })
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    /// Row-major distances (km).
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn max_km(&self) -> f64 {
        self.max_km
    }

    pub fn resolution_km(&self) -> f64 {
        self.resolution_km
    }

    /// `(lat count, lon count)`
    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    /// Distance at axis indices, `None` outside the raster.
    pub fn get(&self, lat_idx: usize, lon_idx: usize) -> Option<f64> {
        if lat_idx >= self.lats.len() || lon_idx >= self.lons.len() {
            return None;
        }
        self.data.get(lat_idx * self.lons.len() + lon_idx).copied()
    }

    /// Index of the latitude closest to `lat`.
    pub fn nearest_lat_index(&self, lat: f64) -> usize {
        nearest_index(&self.lats, lat)
    }

    /// Index of the longitude closest to `lon`.
    pub fn nearest_lon_index(&self, lon: f64) -> usize {
        nearest_index(&self.lons, lon)
    }

    /// Distance of the raster cell nearest to `(lat, lon)`.
    ///
    /// Each axis is searched independently.
    pub fn nearest(&self, lat: f64, lon: f64) -> f64 {
        let lat_idx = self.nearest_lat_index(lat);
        let lon_idx = self.nearest_lon_index(lon);
        self.data[lat_idx * self.lons.len() + lon_idx]
    }
}

/// Position of the smallest `|axis[i] - value|`.
///
/// Ties resolve to the first occurrence and a NaN difference wins
/// immediately. Returns 0 for an empty axis.
pub fn nearest_index(axis: &[f64], value: f64) -> usize {
    let mut best_idx = 0;
    let mut best = f64::INFINITY;

    for (i, &x) in axis.iter().enumerate() {
        let diff = (x - value).abs();
        if diff.is_nan() {
            return i;
        }
        if diff < best {
            best = diff;
            best_idx = i;
        }
    }

    best_idx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster() -> CoastalRaster {
        CoastalRaster::new(
            vec![-1.0, 0.0, 1.0],
            vec![-1.0, 0.0, 1.0],
            (1..=9).map(f64::from).collect(),
            500.0,
            111.0,
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_index_first_tie_wins() {
        // 0.5 is equidistant from 0.0 and 1.0
        assert_eq!(nearest_index(&[0.0, 1.0], 0.5), 0);
        assert_eq!(nearest_index(&[3.0, 1.0, 1.0], 1.0), 1);
    }

    #[test]
    fn test_nearest_index_nan_wins() {
        assert_eq!(nearest_index(&[0.0, f64::NAN, 5.0], 5.0), 1);
        assert_eq!(nearest_index(&[0.0, 1.0], f64::NAN), 0);
    }

    #[test]
    fn test_nearest_index_non_uniform_axis() {
        let axis = [-10.0, -1.0, 0.0, 0.5, 20.0];
        assert_eq!(nearest_index(&axis, 0.3), 3);
        assert_eq!(nearest_index(&axis, 9.0), 3);
        assert_eq!(nearest_index(&axis, 11.0), 4);
        assert_eq!(nearest_index(&axis, -100.0), 0);
    }

    #[test]
    fn test_nearest_value() {
        let raster = raster();
        assert_eq!(raster.nearest(0.4, -0.6), 4.0);
        assert_eq!(raster.nearest(-5.0, 5.0), 3.0);
        assert_eq!(raster.nearest(0.9, 0.1), 8.0);
    }

    #[test]
    fn test_empty_axes_rejected() {
        let err = CoastalRaster::new(vec![], vec![1.0], vec![], 0.0, 0.0).unwrap_err();
        assert!(matches!(err, CoastalError::EmptyAxis { axis: "latitude" }));

        let err = CoastalRaster::new(vec![1.0], vec![], vec![], 0.0, 0.0).unwrap_err();
        assert!(matches!(err, CoastalError::EmptyAxis { axis: "longitude" }));
    }

    #[test]
    fn test_shape_mismatch() {
        let err = CoastalRaster::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![1.0; 3], 0.0, 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            CoastalError::ShapeMismatch {
                lats: 2,
                lons: 2,
                values: 3
            }
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let arrays = RasterArrays {
            array: vec![vec![1.0, 2.0], vec![3.0]],
            lats: vec![0.0, 1.0],
            lons: vec![0.0, 1.0],
            max_km: 500.0,
            resolution_km: 1.0,
        };
        assert!(matches!(
            CoastalRaster::try_from(arrays),
            Err(CoastalError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_get_bounds() {
        let raster = raster();
        assert_eq!(raster.shape(), (3, 3));
        assert_eq!(raster.get(2, 0), Some(7.0));
        assert_eq!(raster.get(3, 0), None);
    }
}
