//! Sampling kernels
//!
//! Kernels take fractional pixel coordinates as returned by
//! `GeoTransform::geo_to_pixel`, where the centre of cell `(r, c)` sits at
//! `(c + 0.5, r + 0.5)`. A `None` result means the target cell receives the
//! no-data sentinel.

use floodimpact_core::{Raster, RasterElement};

/// Resampling algorithm used when aligning grids
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResampleMethod {
    /// Value of the source cell containing the target cell centre.
    /// Keeps boolean masks boolean.
    #[default]
    Nearest,
    /// Distance-weighted mean of the four surrounding source cell centres.
    /// No-data neighbours are dropped and the weights renormalised.
    Bilinear,
}

impl ResampleMethod {
    pub(crate) fn sample<T: RasterElement>(self, src: &Raster<T>, col: f64, row: f64) -> Option<T> {
        match self {
            ResampleMethod::Nearest => nearest(src, col, row),
            ResampleMethod::Bilinear => bilinear(src, col, row),
        }
    }
}

/// Whether the fractional position lies on the source grid
fn covered<T: RasterElement>(src: &Raster<T>, col: f64, row: f64) -> bool {
    col.is_finite()
        && row.is_finite()
        && col >= 0.0
        && row >= 0.0
        && col < src.cols() as f64
        && row < src.rows() as f64
}

fn nearest<T: RasterElement>(src: &Raster<T>, col: f64, row: f64) -> Option<T> {
    if !covered(src, col, row) {
        return None;
    }
    let value = src.data()[(row as usize, col as usize)];
    (!src.is_nodata(value)).then_some(value)
}

fn bilinear<T: RasterElement>(src: &Raster<T>, col: f64, row: f64) -> Option<T> {
    if !covered(src, col, row) {
        return None;
    }

    let (rows, cols) = src.shape();
    // Shift to cell-centre space and clamp at the raster edge
    let x = (col - 0.5).clamp(0.0, (cols - 1) as f64);
    let y = (row - 0.5).clamp(0.0, (rows - 1) as f64);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(cols - 1);
    let y1 = (y0 + 1).min(rows - 1);
    let fx = x - x0 as f64;
    let fy = y - y0 as f64;

    let corners = [
        (y0, x0, (1.0 - fx) * (1.0 - fy)),
        (y0, x1, fx * (1.0 - fy)),
        (y1, x0, (1.0 - fx) * fy),
        (y1, x1, fx * fy),
    ];

    let mut sum = 0.0;
    let mut weight = 0.0;
    for (r, c, w) in corners {
        let value = src.data()[(r, c)];
        if w <= 0.0 || src.is_nodata(value) {
            continue;
        }
        if let Some(v) = value.to_f64() {
            sum += v * w;
            weight += w;
        }
    }

    if weight <= 0.0 {
        // Only zero-weight or no-data neighbours: fall back to the containing cell
        return nearest(src, col, row);
    }

    let value = sum / weight;
    if T::is_float() {
        T::from_f64(value)
    } else {
        T::from_f64(value.round())
    }
}
