//! Integration tests for loading and querying coastal rasters from files.

use coastal_distance::{
    open_source, CoastDistanceLookup, CoastalError, CoastalRaster, JsonRasterFile, LoadResult,
    RasterSource,
};
use gnssr_common::GridIndexer;
use test_utils::{create_distance_raster, fixtures, temp_test_dir, write_raster_json_with};

fn loaded_fixture() -> (tempfile::TempDir, CoastDistanceLookup) {
    let dir = temp_test_dir();
    let path = dir.path().join("dist_to_coast.json");
    fixtures::write_raster_json(&path).unwrap();

    let mut lookup = CoastDistanceLookup::new();
    let result = lookup.load(&JsonRasterFile::new(&path)).unwrap();
    assert!(result.is_loaded());
    (dir, lookup)
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_missing_file_leaves_lookup_unloaded() {
    let dir = temp_test_dir();
    let path = dir.path().join("absent.json");

    let mut lookup = CoastDistanceLookup::new();
    let result = lookup.load(&JsonRasterFile::new(&path)).unwrap();

    assert!(matches!(result, LoadResult::Unloaded { .. }));
    assert!(matches!(lookup.query(0.0, 0.0), Err(CoastalError::NotLoaded)));
    assert!(matches!(
        lookup.query_batch(&[0.0], &[0.0]),
        Err(CoastalError::NotLoaded)
    ));
    assert!(matches!(
        lookup.distance_grid(&GridIndexer::new(2000.0).unwrap()),
        Err(CoastalError::NotLoaded)
    ));
}

#[test]
fn test_metadata_is_read() {
    let (_dir, lookup) = loaded_fixture();
    let raster = lookup.raster().unwrap();
    assert_eq!(raster.max_km(), fixtures::raster::MAX_KM);
    assert_eq!(raster.resolution_km(), fixtures::raster::RESOLUTION_KM);
    assert_eq!(raster.shape(), (3, 3));
}

#[test]
fn test_empty_axis_file_is_error() {
    let dir = temp_test_dir();
    let path = dir.path().join("empty.json");
    write_raster_json_with(&path, &[], &[0.0], &[], 100.0, 1.0).unwrap();

    let mut lookup = CoastDistanceLookup::new();
    let err = lookup.load(&JsonRasterFile::new(&path)).unwrap_err();
    assert!(matches!(err, CoastalError::EmptyAxis { axis: "latitude" }));
}

#[test]
fn test_shape_mismatch_file_is_error() {
    let dir = temp_test_dir();
    let path = dir.path().join("short.json");
    // Two latitudes but a single row
    write_raster_json_with(&path, &[0.0, 1.0], &[0.0, 1.0], &[vec![1.0, 2.0]], 100.0, 1.0)
        .unwrap();

    let err = JsonRasterFile::new(&path).read().unwrap_err();
    assert!(matches!(
        err,
        CoastalError::ShapeMismatch {
            lats: 2,
            lons: 2,
            values: 2
        }
    ));
}

#[test]
fn test_open_source_picks_json() {
    let dir = temp_test_dir();
    let path = dir.path().join("coast.json");
    fixtures::write_raster_json(&path).unwrap();

    let source = open_source(&path).unwrap();
    let mut lookup = CoastDistanceLookup::new();
    assert!(lookup.load(source.as_ref()).unwrap().is_loaded());
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_query_nearest_cell() {
    let (_dir, lookup) = loaded_fixture();
    assert_eq!(lookup.query(0.4, -0.6).unwrap(), 4.0);
    assert_eq!(lookup.query(0.0, 0.0).unwrap(), 5.0);
    // Far outside the raster clamps to the edge cell
    assert_eq!(lookup.query(45.0, -120.0).unwrap(), 7.0);
}

#[test]
fn test_query_ties_take_first_axis_value() {
    let (_dir, lookup) = loaded_fixture();
    // -0.5 is equidistant from -1 and 0 on both axes
    assert_eq!(lookup.query(-0.5, -0.5).unwrap(), 1.0);
}

#[test]
fn test_query_batch_matches_single_queries() {
    let (_dir, lookup) = loaded_fixture();
    let lats = [-0.9, -0.2, 0.3, 0.8, 1.4];
    let lons = [0.7, -1.2, 0.1, -0.4, 0.6];

    let batch = lookup.query_batch(&lats, &lons).unwrap();
    for (i, (&lat, &lon)) in lats.iter().zip(&lons).enumerate() {
        assert_eq!(batch[i], lookup.query(lat, lon).unwrap());
    }
}

#[test]
fn test_distance_grid_on_global_raster() {
    let dir = temp_test_dir();
    let path = dir.path().join("global.json");
    let (lats, lons, data) = create_distance_raster(181, 361, 1000.0);
    let rows: Vec<Vec<f64>> = data.chunks(lons.len()).map(|r| r.to_vec()).collect();
    write_raster_json_with(&path, &lats, &lons, &rows, 1000.0, 111.0).unwrap();

    let mut lookup = CoastDistanceLookup::new();
    lookup.load(&JsonRasterFile::new(&path)).unwrap();

    let indexer = GridIndexer::new(500.0).unwrap();
    let grid = lookup.distance_grid(&indexer).unwrap();

    assert_eq!(grid.rows(), indexer.lat_cells());
    assert_eq!(grid.cols(), indexer.lon_cells());
    assert_eq!(grid.populated_cells(), indexer.len());

    // Poles are capped at max_km
    assert_eq!(grid.get(0, 0), Some(1000.0));
    let (lo, hi) = grid.finite_range().unwrap();
    assert!(lo >= 0.0);
    assert_eq!(hi, 1000.0);
}

#[test]
fn test_from_raster_matches_loaded_file() {
    let (_dir, loaded) = loaded_fixture();

    let raster = CoastalRaster::new(
        fixtures::raster::LATS.to_vec(),
        fixtures::raster::LONS.to_vec(),
        fixtures::raster::DATA.to_vec(),
        fixtures::raster::MAX_KM,
        fixtures::raster::RESOLUTION_KM,
    )
    .unwrap();
    let direct = CoastDistanceLookup::from_raster(raster);

    assert!(direct.is_loaded());
    for (lat, lon) in [(0.4, -0.6), (-3.0, 7.0), (0.9, 0.9)] {
        assert_eq!(direct.query(lat, lon).unwrap(), loaded.query(lat, lon).unwrap());
    }
}
