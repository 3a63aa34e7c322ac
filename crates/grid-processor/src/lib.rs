//! Map accumulation for GNSS-R observations.
//!
//! Scattered `(lat, lon, value)` observations are binned onto a fixed
//! Plate Carree grid and kept as per-cell running sums and counts, so that
//! many batches (one per archive segment, typically) can be averaged at the
//! end.
//!
//! ```text
//! observation batch ──► GridIndexer::cell ──► group by cell
//!                                                  │
//!                                  sum[cell] += Σ finite values
//!                                  count[cell] += # finite values
//!                                                  │
//!                               average() ──► MapGrid (NaN = no data)
//! ```
//!
//! # Example
//!
//! ```
//! use grid_processor::MapAccumulator;
//!
//! let mut acc = MapAccumulator::with_cell_size(200.0).unwrap();
//! acc.accumulate(&[10.0], &[20.0], &[5.0]).unwrap();
//! acc.accumulate(&[10.0], &[20.0], &[3.0]).unwrap();
//! assert_eq!(acc.average_at(10.0, 20.0).unwrap(), 4.0);
//! ```

pub mod accumulator;
pub mod error;
pub mod shared;
pub mod types;

// Re-export commonly used types at crate root
pub use accumulator::MapAccumulator;
pub use error::{GridProcessorError, Result};
pub use shared::SharedMapAccumulator;
pub use types::{AccumulatorSummary, CellStats};
