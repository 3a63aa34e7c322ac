//! Time segmentation of the GNSS-R data archive.
//!
//! Archive products are published in six hour segments laid out as
//! `<level>/yyyy-mm/dd/Hhh`, where `hh` is the hour of the segment midpoint.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{GnssrError, GnssrResult};

/// Length of one archive segment.
pub const SEGMENT_HOURS: i64 = 6;

/// A half-open time interval covered by one archive segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeSegment {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeSegment {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// Midpoint of the segment.
    pub fn midpoint(&self) -> DateTime<Utc> {
        self.start + self.duration() / 2
    }

    /// Archive folder for this segment, relative to the data level.
    ///
    /// Sub-daily segments resolve to `yyyy-mm/dd/Hhh` from their midpoint,
    /// whole-day segments to `yyyy-mm/dd` from their start.
    pub fn folder(&self) -> String {
        let monthly = self.start.format("%Y-%m");
        let daily_threshold = Duration::hours(23) + Duration::minutes(59) + Duration::seconds(58);

        if self.duration() < daily_threshold {
            format!("{}/{}", monthly, self.midpoint().format("%d/H%H"))
        } else {
            format!("{}/{}", monthly, self.start.format("%d"))
        }
    }
}

impl fmt::Display for TimeSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Every complete six hour segment from `start` that ends no later than `stop`.
pub fn segments_between(start: DateTime<Utc>, stop: DateTime<Utc>) -> Vec<TimeSegment> {
    let step = Duration::hours(SEGMENT_HOURS);
    let mut segments = Vec::new();

    let mut this_start = start;
    let mut this_stop = this_start + step;
    while this_stop <= stop {
        segments.push(TimeSegment::new(this_start, this_stop));
        this_start += step;
        this_stop = this_start + step;
    }

    segments
}

/// Processing level of an archive product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataLevel {
    /// Level 1b delay-Doppler maps and metadata
    #[serde(rename = "L1B")]
    L1b,
    /// Level 2 fast delivery ocean products
    #[serde(rename = "L2_FDI")]
    L2Fdi,
}

impl DataLevel {
    /// Directory name used in the archive.
    pub fn as_str(&self) -> &'static str {
        match self {
            DataLevel::L1b => "L1B",
            DataLevel::L2Fdi => "L2_FDI",
        }
    }

    /// Product files published per segment at this level.
    pub fn files(&self) -> &'static [&'static str] {
        match self {
            DataLevel::L1b => &[
                "metadata.nc",
                "ddms.nc",
                "directSignalPower.nc",
                "blackbodyNadir.nc",
                "blackbodyZenith.nc",
            ],
            DataLevel::L2Fdi => &["L2_FDI.nc"],
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "L1B" => Some(DataLevel::L1b),
            "L2_FDI" | "L2FDI" => Some(DataLevel::L2Fdi),
            _ => None,
        }
    }
}

impl fmt::Display for DataLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Local directory holding one segment of one data level.
pub fn segment_dir(root: &Path, level: DataLevel, segment: &TimeSegment) -> PathBuf {
    let mut path = root.join(level.as_str());
    for part in segment.folder().split('/') {
        path.push(part);
    }
    path
}

/// Convert a MATLAB serial date number to UTC.
///
/// MATLAB day 1 is 0000-01-01, one leap year ahead of the proleptic
/// Gregorian ordinal. Fractions of a day are kept to the microsecond.
pub fn matlab_datenum_to_datetime(datenum: f64) -> Option<DateTime<Utc>> {
    if !datenum.is_finite() {
        return None;
    }

    let whole = datenum.trunc();
    if whole < 1.0 || whole > i32::MAX as f64 {
        return None;
    }

    let day = NaiveDate::from_num_days_from_ce_opt(whole as i32)?;
    let micros = (datenum.rem_euclid(1.0) * 86_400_000_000.0).round_ties_even() as i64;

    let naive = day
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::microseconds(micros))?
        .checked_sub_signed(Duration::days(366))?;

    Some(Utc.from_utc_datetime(&naive))
}

/// Parse a UTC timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` (assumed UTC) and bare dates.
pub fn parse_datetime(s: &str) -> GnssrResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(GnssrError::InvalidTime(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_segments_between_one_day() {
        let segments = segments_between(utc(2015, 4, 1, 0), utc(2015, 4, 2, 0));
        assert_eq!(segments.len(), 4);
        assert_eq!(segments[0].start, utc(2015, 4, 1, 0));
        assert_eq!(segments[3].end, utc(2015, 4, 2, 0));
    }

    #[test]
    fn test_segments_between_drops_partial_tail() {
        let segments = segments_between(utc(2015, 4, 1, 0), utc(2015, 4, 1, 10));
        assert_eq!(segments.len(), 1);
    }

    #[test]
    fn test_segments_between_empty() {
        assert!(segments_between(utc(2015, 4, 1, 0), utc(2015, 4, 1, 5)).is_empty());
    }

    #[test]
    fn test_folder_uses_midpoint_hour() {
        let segment = TimeSegment::new(utc(2015, 4, 1, 0), utc(2015, 4, 1, 6));
        assert_eq!(segment.folder(), "2015-04/01/H03");

        let segment = TimeSegment::new(utc(2015, 4, 1, 18), utc(2015, 4, 2, 0));
        assert_eq!(segment.folder(), "2015-04/01/H21");
    }

    #[test]
    fn test_folder_whole_day() {
        let segment = TimeSegment::new(utc(2015, 4, 1, 0), utc(2015, 4, 2, 0));
        assert_eq!(segment.folder(), "2015-04/01");
    }

    #[test]
    fn test_segment_dir_layout() {
        let segment = TimeSegment::new(utc(2015, 4, 1, 6), utc(2015, 4, 1, 12));
        let dir = segment_dir(Path::new("/data"), DataLevel::L1b, &segment);
        assert_eq!(dir, PathBuf::from("/data/L1B/2015-04/01/H09"));
    }

    #[test]
    fn test_data_level_files() {
        assert_eq!(DataLevel::L1b.files().len(), 5);
        assert_eq!(DataLevel::L2Fdi.files(), &["L2_FDI.nc"]);
        assert_eq!(DataLevel::from_name("l2_fdi"), Some(DataLevel::L2Fdi));
        assert_eq!(DataLevel::from_name("L3"), None);
    }

    #[test]
    fn test_matlab_datenum() {
        // datenum(2020, 1, 1, 12, 0, 0)
        let dt = matlab_datenum_to_datetime(737791.5).unwrap();
        assert_eq!(dt.year(), 2020);
        assert_eq!(dt.month(), 1);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn test_matlab_datenum_invalid() {
        assert!(matlab_datenum_to_datetime(f64::NAN).is_none());
        assert!(matlab_datenum_to_datetime(0.5).is_none());
    }

    #[test]
    fn test_parse_datetime_formats() {
        assert_eq!(parse_datetime("2015-04-01T06:00:00Z").unwrap(), utc(2015, 4, 1, 6));
        assert_eq!(parse_datetime("2015-04-01T06:00:00").unwrap(), utc(2015, 4, 1, 6));
        assert_eq!(parse_datetime("2015-04-01").unwrap(), utc(2015, 4, 1, 0));
        assert!(parse_datetime("yesterday").is_err());
    }
}
