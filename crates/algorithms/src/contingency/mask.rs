//! No-data normalisation and thresholding

use floodimpact_core::raster::{Raster, RasterElement};

/// Copy of `grid` as f64 with no-data (and NaN) cells set to 0.
///
/// The caller's raster is left untouched.
///
/// NaN becomes 0 even when it is not the declared sentinel, so under a
/// negative threshold a NaN cell counts as flooded rather than dry.
pub fn normalize_nodata<T: RasterElement>(grid: &Raster<T>) -> Raster<f64> {
    let nodata = grid.nodata();
    grid.map(|v| {
        if v.is_nodata(nodata) {
            0.0
        } else {
            v.to_f64().unwrap_or(0.0)
        }
    })
}

/// Boolean mask (0/1) of cells strictly above `threshold`
pub fn threshold_mask(grid: &Raster<f64>, threshold: f64) -> Raster<u8> {
    grid.map(|v| u8::from(v > threshold))
}

/// Number of non-zero cells in a mask
pub fn count_flooded(mask: &Raster<u8>) -> usize {
    mask.data().iter().filter(|&&v| v != 0).count()
}
