//! Mutex-guarded accumulator for multiple producers.
//!
//! [`MapAccumulator`] itself is single-owner. Callers that ingest from
//! several threads share one of these instead; every batch is applied under
//! the lock, so batches never interleave.

use std::sync::{Arc, Mutex, MutexGuard};

use gnssr_common::{MapGrid, ObservationBatch};

use crate::accumulator::MapAccumulator;
use crate::error::{GridProcessorError, Result};
use crate::types::AccumulatorSummary;

/// Cloneable handle to an accumulator behind a mutex.
#[derive(Debug, Clone)]
pub struct SharedMapAccumulator {
    inner: Arc<Mutex<MapAccumulator>>,
}

impl SharedMapAccumulator {
    pub fn new(accumulator: MapAccumulator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(accumulator)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, MapAccumulator>> {
        self.inner.lock().map_err(|_| GridProcessorError::Poisoned)
    }

    pub fn accumulate(&self, lats: &[f64], lons: &[f64], vals: &[f64]) -> Result<()> {
        self.lock()?.accumulate(lats, lons, vals)
    }

    pub fn accumulate_batch(&self, batch: &ObservationBatch) -> Result<()> {
        self.lock()?.accumulate_batch(batch)
    }

    /// Snapshot of the current averages.
    pub fn average(&self) -> Result<MapGrid> {
        Ok(self.lock()?.average())
    }

    pub fn summary(&self) -> Result<AccumulatorSummary> {
        Ok(self.lock()?.summary())
    }

    /// Take the accumulator back, cloning it if other handles are alive.
    pub fn into_inner(self) -> Result<MapAccumulator> {
        match Arc::try_unwrap(self.inner) {
            Ok(mutex) => mutex.into_inner().map_err(|_| GridProcessorError::Poisoned),
            Err(shared) => shared
                .lock()
                .map(|guard| guard.clone())
                .map_err(|_| GridProcessorError::Poisoned),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_producers() {
        let shared = SharedMapAccumulator::new(MapAccumulator::with_cell_size(200.0).unwrap());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared
                            .accumulate(&[10.0], &[20.0], &[i as f64])
                            .unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let acc = shared.into_inner().unwrap();
        assert_eq!(acc.observation_count(), 200);
        assert_eq!(acc.summary().batches, 200);
        // mean of 0..8, each 25 times
        assert_eq!(acc.average_at(10.0, 20.0).unwrap(), 3.5);
    }
}
