//! Masked population reduction

use floodimpact_core::raster::{Raster, RasterElement};
use floodimpact_core::Result;
use ndarray::Zip;

use crate::contingency::{normalize_nodata, threshold_mask};

/// Copy of the population grid with negative, no-data and NaN cells set to 0.
pub fn mask_population<T: RasterElement>(population: &Raster<T>) -> Raster<f64> {
    normalize_nodata(population).map(|v| if v > 0.0 { v } else { 0.0 })
}

/// Sum of population over flooded cells (`flood_mask != 0`).
///
/// Population values are clamped at zero first, so no-data sentinels and
/// negative cells never reduce the total.
///
/// # Errors
/// `SizeMismatch` when the two grids are not co-registered.
pub fn affected_population<T: RasterElement>(flood_mask: &Raster<u8>, population: &Raster<T>) -> Result<f64> {
    flood_mask.ensure_same_shape(population)?;
    let population = mask_population(population);

    let total = Zip::from(flood_mask.data())
        .and(population.data())
        .fold(0.0, |acc, &flooded, &people| if flooded != 0 { acc + people } else { acc });
    Ok(total)
}

/// People affected by a flood extent grid, flooded where `value > threshold`.
pub fn exposure<E, T>(extent: &Raster<E>, threshold: f64, population: &Raster<T>) -> Result<f64>
where
    E: RasterElement,
    T: RasterElement,
{
    extent.ensure_same_shape(population)?;
    let mask = threshold_mask(&normalize_nodata(extent), threshold);
    affected_population(&mask, population)
}
