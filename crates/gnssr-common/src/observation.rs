//! Geolocated scalar observation batches.

use crate::error::{GnssrError, GnssrResult};
use serde::{Deserialize, Serialize};

/// Parallel latitude / longitude / value sequences of equal length.
///
/// Latitudes and longitudes are in degrees. Non-finite values mark missing
/// data and are ignored by accumulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBatch")]
pub struct ObservationBatch {
    lats: Vec<f64>,
    lons: Vec<f64>,
    values: Vec<f64>,
}

/// Unvalidated wire form of a batch. JSON has no NaN, so missing values
/// arrive as `null`.
#[derive(Deserialize)]
struct RawBatch {
    lats: Vec<f64>,
    lons: Vec<f64>,
    #[serde(alias = "vals")]
    values: Vec<Option<f64>>,
}

impl TryFrom<RawBatch> for ObservationBatch {
    type Error = GnssrError;

    fn try_from(raw: RawBatch) -> Result<Self, Self::Error> {
        let values = raw
            .values
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect();
        ObservationBatch::new(raw.lats, raw.lons, values)
    }
}

impl ObservationBatch {
    /// Create a batch, rejecting sequences of different lengths.
    pub fn new(lats: Vec<f64>, lons: Vec<f64>, values: Vec<f64>) -> GnssrResult<Self> {
        check_lengths(&lats, &lons, &values)?;
        Ok(Self { lats, lons, values })
    }

    pub fn lats(&self) -> &[f64] {
        &self.lats
    }

    pub fn lons(&self) -> &[f64] {
        &self.lons
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of observations whose value is finite.
    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Iterate `(lat, lon, value)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.lats
            .iter()
            .zip(&self.lons)
            .zip(&self.values)
            .map(|((&lat, &lon), &value)| (lat, lon, value))
    }

    /// Keep only the observations whose `keep` flag is set.
    pub fn retain_mask(&mut self, keep: &[bool]) -> GnssrResult<()> {
        if keep.len() != self.len() {
            return Err(GnssrError::LengthMismatch {
                lats: self.lats.len(),
                lons: self.lons.len(),
                values: keep.len(),
            });
        }

        let mut flags = keep.iter();
        self.lats.retain(|_| *flags.next().unwrap_or(&false));
        let mut flags = keep.iter();
        self.lons.retain(|_| *flags.next().unwrap_or(&false));
        let mut flags = keep.iter();
        self.values.retain(|_| *flags.next().unwrap_or(&false));
        Ok(())
    }
}

/// Validate that three parallel sequences share a length.
pub fn check_lengths(lats: &[f64], lons: &[f64], values: &[f64]) -> GnssrResult<()> {
    if lats.len() != lons.len() || lats.len() != values.len() {
        return Err(GnssrError::LengthMismatch {
            lats: lats.len(),
            lons: lons.len(),
            values: values.len(),
        });
    }
    Ok(())
}
