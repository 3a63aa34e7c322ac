//! Common types and utilities shared across the GNSS-R mapping crates.

pub mod error;
pub mod grid;
pub mod observation;
pub mod time;

pub use error::{GnssrError, GnssrResult};
pub use grid::{GridIndexer, MapGrid, EARTH_RADIUS_KM};
pub use observation::ObservationBatch;
pub use time::{
    matlab_datenum_to_datetime, parse_datetime, segment_dir, segments_between, DataLevel,
    TimeSegment,
};
