//! Target grid construction and warping

use crate::maybe_rayon::*;
use floodimpact_core::raster::{Extent, GeoTransform, Raster, RasterElement};
use floodimpact_core::Result;

use super::ResampleMethod;

/// Target grid for [`align`]
#[derive(Debug, Clone, Copy)]
pub struct AlignParams {
    /// Signed pixel size `(x, y)`; `y` is negative for north-up output
    pub resolution: (f64, f64),
    /// Output bounding extent
    pub extent: Extent,
    /// Resampling algorithm
    pub method: ResampleMethod,
}

impl AlignParams {
    /// Target grid matching another raster's resolution and extent
    pub fn from_reference<U: RasterElement>(reference: &Raster<U>) -> Self {
        Self {
            resolution: reference.resolution(),
            extent: reference.bounds(),
            method: ResampleMethod::default(),
        }
    }

    pub fn with_method(mut self, method: ResampleMethod) -> Self {
        self.method = method;
        self
    }
}

/// Resample `source` onto the grid described by `params`.
///
/// The output transform starts at the extent corner implied by the
/// resolution signs and uses exactly the requested pixel size. Each output
/// cell samples the source at its centre; cells outside the source coverage
/// or on source no-data get the source no-data sentinel (or the type
/// default when the source has none), which is also set as the output's
/// no-data value.
///
/// # Errors
/// `InvalidParameter` for a zero, negative-x or non-finite resolution, and
/// `InvalidDimensions` when the extent is smaller than one pixel.
pub fn align<T: RasterElement>(source: &Raster<T>, params: &AlignParams) -> Result<Raster<T>> {
    let (xres, yres) = params.resolution;
    let (transform, rows, cols) = GeoTransform::for_extent(&params.extent, xres, yres)?;
    let nodata = source.nodata().unwrap_or_else(T::default_nodata);
    let method = params.method;

    let data: Vec<T> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![nodata; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let (x, y) = transform.pixel_to_geo(col, row);
                let (src_col, src_row) = source.geo_to_pixel(x, y);
                if let Some(value) = method.sample(source, src_col, src_row) {
                    *cell = value;
                }
            }
            row_data
        })
        .collect();

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    output.set_nodata(Some(nodata));
    Ok(output)
}

/// Resample `source` to the resolution and extent of `reference`.
pub fn align_to<T, U>(source: &Raster<T>, reference: &Raster<U>, method: ResampleMethod) -> Result<Raster<T>>
where
    T: RasterElement,
    U: RasterElement,
{
    align(source, &AlignParams::from_reference(reference).with_method(method))
}
