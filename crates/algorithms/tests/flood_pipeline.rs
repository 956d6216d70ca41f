//! End-to-end pipeline: GeoTIFF files → alignment → contingency → exposure.
//!
//! A 4x4 observed extent at 1-unit cells is compared with a 2x2 simulated
//! depth grid at 2-unit cells covering the same area, the way a coarse
//! global model is checked against a satellite-derived extent.

use approx::assert_relative_eq;
use floodimpact_algorithms::align::{align_to, ResampleMethod};
use floodimpact_algorithms::contingency::{evaluate, evaluate_many, ContingencyParams, ContingencyTable};
use floodimpact_algorithms::impact::exposure;
use floodimpact_core::io::{read_geotiff, write_geotiff, GeoTiffOptions};
use floodimpact_core::{GeoTransform, Raster};
use std::path::Path;

const NODATA: f64 = -9999.0;

fn observed() -> Raster<f64> {
    #[rustfmt::skip]
    let values = vec![
        1.0, 1.0, 0.0, 0.0,
        1.0, 1.0, 0.0, 0.0,
        1.0, 0.0, 0.0, 0.0,
        0.0, 0.0, 0.0, NODATA,
    ];
    let mut r = Raster::from_vec(values, 4, 4).unwrap();
    r.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
    r.set_nodata(Some(NODATA));
    r
}

fn simulated() -> Raster<f64> {
    let mut r = Raster::from_vec(vec![0.8, 0.0, 0.3, 0.0], 2, 2).unwrap();
    r.set_transform(GeoTransform::new(0.0, 4.0, 2.0, -2.0));
    r
}

fn population() -> Raster<f64> {
    let mut r = Raster::filled(4, 4, 10.0);
    r.set(0, 0, -5.0).unwrap();
    r.set_transform(GeoTransform::new(0.0, 4.0, 1.0, -1.0));
    r
}

fn roundtrip(raster: &Raster<f64>, dir: &Path, name: &str) -> Raster<f64> {
    let path = dir.join(name);
    write_geotiff(raster, &path, None).expect("write failed");
    read_geotiff(&path, None).expect("read failed")
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

#[test]
fn coarse_model_aligns_to_observed_grid() {
    let dir = tempfile::tempdir().unwrap();
    let obs = roundtrip(&observed(), dir.path(), "obs.tif");
    let sim = roundtrip(&simulated(), dir.path(), "sim.tif");

    let aligned = align_to(&sim, &obs, ResampleMethod::Nearest).unwrap();

    assert_eq!(aligned.shape(), obs.shape());
    assert_eq!(aligned.transform(), obs.transform());
    for row in 0..4 {
        assert!(aligned.get(row, 0).unwrap() > 0.0);
        assert!(aligned.get(row, 1).unwrap() > 0.0);
        assert_eq!(aligned.get(row, 2).unwrap(), 0.0);
        assert_eq!(aligned.get(row, 3).unwrap(), 0.0);
    }
}

// ---------------------------------------------------------------------------
// Contingency
// ---------------------------------------------------------------------------

#[test]
fn contingency_of_aligned_model() {
    let dir = tempfile::tempdir().unwrap();
    let obs = roundtrip(&observed(), dir.path(), "obs.tif");
    let sim = roundtrip(&simulated(), dir.path(), "sim.tif");
    let aligned = align_to(&sim, &obs, ResampleMethod::Nearest).unwrap();

    let result = evaluate(&obs, &aligned, &ContingencyParams::default()).unwrap();

    assert_eq!(
        result.table,
        ContingencyTable { hits: 5, false_alarms: 3, misses: 0, correct_negatives: 8 }
    );
    assert_relative_eq!(result.hit_rate.unwrap(), 1.0);
    assert_relative_eq!(result.false_alarm_rate.unwrap(), 0.375);
    assert_relative_eq!(result.critical_success_index.unwrap(), 0.625);

    // Persist the category map as UInt8 and read it back
    let path = dir.path().join("contingency_map.tif");
    write_geotiff(&result.category_map, &path, Some(GeoTiffOptions::uint8())).unwrap();
    let map: Raster<u8> = read_geotiff(&path, None).unwrap();

    #[rustfmt::skip]
    let expected: &[u8] = &[
        3, 3, 0, 0,
        3, 3, 0, 0,
        3, 1, 0, 0,
        1, 1, 0, 0,
    ];
    assert_eq!(map.data().as_slice().unwrap(), expected);
    assert_eq!(map.transform(), obs.transform());
}

#[test]
fn unaligned_model_is_rejected() {
    let result = evaluate(&observed(), &simulated(), &ContingencyParams::default());
    assert!(result.is_err());
}

#[test]
fn several_models_against_one_observation() {
    let obs = observed();
    let coarse = align_to(&simulated(), &obs, ResampleMethod::Nearest).unwrap();
    let perfect = obs.map(|v| if v > 0.5 { 1.0 } else { 0.0 });
    let dry: Raster<f64> = obs.like(0.0);

    let results = evaluate_many(&obs, &[coarse, perfect, dry], &ContingencyParams::default()).unwrap();

    assert_relative_eq!(results[0].critical_success_index.unwrap(), 0.625);
    assert_relative_eq!(results[1].critical_success_index.unwrap(), 1.0);
    assert_eq!(results[2].hit_rate, Some(0.0));
    assert_eq!(results[2].false_alarm_rate, None);
}

// ---------------------------------------------------------------------------
// Exposure
// ---------------------------------------------------------------------------

#[test]
fn population_exposure_per_extent() {
    let obs = observed();
    let aligned = align_to(&simulated(), &obs, ResampleMethod::Nearest).unwrap();
    let pop = population();

    // Negative population at (0, 0) is clamped to zero
    assert_relative_eq!(exposure(&obs, 0.0, &pop).unwrap(), 40.0);
    assert_relative_eq!(exposure(&aligned, 0.0, &pop).unwrap(), 70.0);
}
