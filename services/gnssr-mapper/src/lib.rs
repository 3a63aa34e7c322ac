//! Batch job that grids GNSS-R observations into averaged maps.
//!
//! The job walks the six hour segments of a period in the local archive,
//! reads each segment's observation file, drops points that fall off the
//! grid or too close to the coast, accumulates the rest and renders the
//! per-cell average.

pub mod config;
pub mod feed;
pub mod metrics;
pub mod output;
pub mod pipeline;

pub use config::MapperConfig;
pub use pipeline::{MapOutput, Mapper, RunStats};
