//! Category map and full evaluation

use crate::maybe_rayon::*;
use floodimpact_core::raster::{Raster, RasterElement};
use floodimpact_core::Result;
use ndarray::Zip;

use super::mask::{normalize_nodata, threshold_mask};
use super::table::{ContingencyClass, ContingencyTable};

/// Thresholds applied before comparison (`value > threshold` is flooded)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContingencyParams {
    /// Threshold for the benchmark (observed) grid
    pub benchmark_threshold: f64,
    /// Threshold for the model (simulated) grid
    pub model_threshold: f64,
}

impl Default for ContingencyParams {
    fn default() -> Self {
        Self {
            benchmark_threshold: 0.5,
            model_threshold: 0.0,
        }
    }
}

/// Outcome of comparing one model grid against the benchmark
#[derive(Debug, Clone)]
pub struct ContingencyResult {
    /// Normalised, thresholded benchmark
    pub benchmark_mask: Raster<u8>,
    /// Normalised, thresholded model
    pub model_mask: Raster<u8>,
    /// Per-cell agreement class (0..=3)
    pub category_map: Raster<u8>,
    pub table: ContingencyTable,
    pub hit_rate: Option<f64>,
    pub false_alarm_rate: Option<f64>,
    pub critical_success_index: Option<f64>,
}

/// Per-cell agreement class `1 * model + 2 * benchmark` of two masks.
///
/// The output shares the benchmark's transform and has no no-data value.
pub fn contingency_map(benchmark_mask: &Raster<u8>, model_mask: &Raster<u8>) -> Result<Raster<u8>> {
    benchmark_mask.ensure_same_shape(model_mask)?;

    let codes = Zip::from(benchmark_mask.data())
        .and(model_mask.data())
        .map_collect(|&b, &m| ContingencyClass::classify(b != 0, m != 0).code());

    let mut map = Raster::from_array(codes);
    map.set_transform(*benchmark_mask.transform());
    Ok(map)
}

/// Compare a model grid with the benchmark grid.
///
/// Both grids must be co-registered (same rows and columns); a mismatch is
/// rejected before anything is computed. No-data cells of either grid count
/// as dry. Inputs are not modified.
pub fn evaluate<B, M>(benchmark: &Raster<B>, model: &Raster<M>, params: &ContingencyParams) -> Result<ContingencyResult>
where
    B: RasterElement,
    M: RasterElement,
{
    benchmark.ensure_same_shape(model)?;
    let benchmark_mask = threshold_mask(&normalize_nodata(benchmark), params.benchmark_threshold);
    evaluate_against(benchmark_mask, model, params.model_threshold)
}

/// Compare several model grids with one benchmark.
///
/// Results come back in the order of `models`. Every model must match the
/// benchmark's shape; the first mismatch aborts the batch.
pub fn evaluate_many<B, M>(
    benchmark: &Raster<B>,
    models: &[Raster<M>],
    params: &ContingencyParams,
) -> Result<Vec<ContingencyResult>>
where
    B: RasterElement,
    M: RasterElement,
{
    for model in models {
        benchmark.ensure_same_shape(model)?;
    }
    let benchmark_mask = threshold_mask(&normalize_nodata(benchmark), params.benchmark_threshold);

    models
        .par_iter()
        .map(|model| evaluate_against(benchmark_mask.clone(), model, params.model_threshold))
        .collect()
}

fn evaluate_against<M: RasterElement>(
    benchmark_mask: Raster<u8>,
    model: &Raster<M>,
    model_threshold: f64,
) -> Result<ContingencyResult> {
    let model_mask = threshold_mask(&normalize_nodata(model), model_threshold);
    let category_map = contingency_map(&benchmark_mask, &model_mask)?;
    let table = ContingencyTable::from_category_map(&category_map)?;

    Ok(ContingencyResult {
        hit_rate: table.hit_rate(),
        false_alarm_rate: table.false_alarm_rate(),
        critical_success_index: table.critical_success_index(),
        benchmark_mask,
        model_mask,
        category_map,
        table,
    })
}
