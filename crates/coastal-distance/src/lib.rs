//! Distance-to-coast lookups for GNSS-R observations.
//!
//! A pre-gridded raster of distances to the nearest coastline is loaded once
//! from a [`RasterSource`] and then queried by nearest cell. Ocean products
//! use it to reject observations contaminated by land.
//!
//! # Example
//!
//! ```
//! use coastal_distance::{CoastDistanceLookup, MemorySource, RasterArrays};
//!
//! let arrays = RasterArrays {
//!     array: vec![vec![1.0, 2.0], vec![3.0, 4.0]],
//!     lats: vec![0.0, 1.0],
//!     lons: vec![0.0, 1.0],
//!     max_km: 500.0,
//!     resolution_km: 111.0,
//! };
//!
//! let mut lookup = CoastDistanceLookup::new();
//! lookup.load(&MemorySource::new(arrays)).unwrap();
//! assert_eq!(lookup.query(0.9, 0.2).unwrap(), 3.0);
//! ```

pub mod error;
pub mod lookup;
#[cfg(feature = "netcdf")]
pub mod native;
pub mod raster;
pub mod source;

pub use error::{CoastalError, CoastalResult};
pub use lookup::{CoastDistanceLookup, LoadResult};
#[cfg(feature = "netcdf")]
pub use native::{silence_hdf5_errors, NetCdfRasterFile};
pub use raster::{nearest_index, CoastalRaster, RasterArrays};
pub use source::{open_source, JsonRasterFile, MemorySource, RasterSource};
