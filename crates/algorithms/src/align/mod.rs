//! Grid alignment
//!
//! Resamples a source raster onto a target grid given by a signed pixel
//! resolution and a bounding extent, so that two rasters can be compared
//! cell by cell:
//! - **warp**: target grid construction and the per-cell sampling loop
//! - **resample**: nearest-neighbour and bilinear sampling kernels

mod resample;
mod warp;

pub use resample::ResampleMethod;
pub use warp::{align, align_to, AlignParams};
