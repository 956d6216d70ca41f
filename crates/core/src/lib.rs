//! # floodimpact core
//!
//! Core types and I/O shared by the flood extent comparison tools.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced 2-D grid with a no-data sentinel
//! - `GeoTransform`: affine transformation for georeferencing
//! - `Extent`: axis-aligned bounding box in map units
//! - Native single-band GeoTIFF reading and writing

pub mod error;
pub mod io;
pub mod raster;

pub use error::{Error, Result};
pub use raster::{Extent, GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{Extent, GeoTransform, Raster, RasterElement};
}
