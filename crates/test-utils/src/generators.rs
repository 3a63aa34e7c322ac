//! Test data generators for synthetic GNSS-R observations and rasters.
//!
//! These generators create predictable, verifiable data patterns that can be
//! used across the test suite. Nothing here is random; the same arguments
//! always produce the same data.

/// Creates a scattered observation batch as parallel `(lats, lons, values)`.
///
/// Points are spread over latitudes [-80, 80] and longitudes [-170, 170],
/// clear of the south-west seams where cell indices fold out of range.
/// Every seventh value is NaN to exercise missing-data handling.
///
/// # Example
///
/// ```
/// use test_utils::create_observation_batch;
///
/// let (lats, lons, vals) = create_observation_batch(100);
/// assert_eq!(lats.len(), 100);
/// assert!(vals[0].is_nan());
/// ```
pub fn create_observation_batch(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mut lats = Vec::with_capacity(n);
    let mut lons = Vec::with_capacity(n);
    let mut vals = Vec::with_capacity(n);

    for i in 0..n {
        let hash = simple_hash(i as u32, 0, 42);
        let lat = (hash % 16_001) as f64 / 100.0 - 80.0;
        let lon = ((hash >> 8) % 34_001) as f64 / 100.0 - 170.0;
        lats.push(lat);
        lons.push(lon);
        if i % 7 == 0 {
            vals.push(f64::NAN);
        } else {
            // DDM SNR-like values in dB
            vals.push((hash % 2000) as f64 / 100.0 - 5.0);
        }
    }

    (lats, lons, vals)
}

/// Creates a coastal distance raster on a regular lat/lon lattice.
///
/// Returns `(lats, lons, data)` with `data` row-major `[lat][lon]`. The
/// distance is a smooth field of the form `|lat| * 10 + |lon|` km, capped at
/// `max_km`.
pub fn create_distance_raster(
    n_lat: usize,
    n_lon: usize,
    max_km: f64,
) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let lats = axis(-90.0, 90.0, n_lat);
    let lons = axis(-180.0, 180.0, n_lon);

    let mut data = Vec::with_capacity(n_lat * n_lon);
    for &lat in &lats {
        for &lon in &lons {
            data.push((lat.abs() * 10.0 + lon.abs()).min(max_km));
        }
    }

    (lats, lons, data)
}

/// Evenly spaced axis including both ends.
fn axis(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start; n];
    }
    let step = (stop - start) / (n - 1) as f64;
    (0..n).map(|i| start + i as f64 * step).collect()
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_batch_ranges() {
        let (lats, lons, vals) = create_observation_batch(1000);
        assert!(lats.iter().all(|&v| (-80.0..=80.0).contains(&v)));
        assert!(lons.iter().all(|&v| (-170.0..=170.0).contains(&v)));
        assert_eq!(vals.iter().filter(|v| v.is_nan()).count(), 143);
    }

    #[test]
    fn test_observation_batch_deterministic() {
        assert_eq!(
            create_observation_batch(50).0,
            create_observation_batch(50).0
        );
    }

    #[test]
    fn test_distance_raster_shape() {
        let (lats, lons, data) = create_distance_raster(19, 37, 500.0);
        assert_eq!(lats.len(), 19);
        assert_eq!(lons.len(), 37);
        assert_eq!(data.len(), 19 * 37);
        assert_eq!(lats[0], -90.0);
        assert_eq!(lons[36], 180.0);
        // Capped at max_km
        assert!(data.iter().all(|&d| d <= 500.0));
        // Equator / prime meridian is zero
        assert_eq!(data[9 * 37 + 18], 0.0);
    }
}
