//! Run counters.
//!
//! Recorded through the `metrics` facade; nothing is exported unless the
//! embedding process installs a recorder.

use metrics::counter;

pub fn record_segment_processed() {
    counter!("gnssr_segments_processed_total").increment(1);
}

pub fn record_segment_missing() {
    counter!("gnssr_segments_missing_total").increment(1);
}

/// Observations read from a segment and the share that reached the grid.
pub fn record_observations(read: u64, kept: u64) {
    counter!("gnssr_observations_total").increment(read);
    counter!("gnssr_observations_kept_total").increment(kept);
}
