//! Agreement classes and contingency scores

use floodimpact_core::raster::Raster;
use floodimpact_core::{Error, Result};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Agreement class of one cell, encoded as `1 * model + 2 * benchmark`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ContingencyClass {
    /// Neither grid exceeds its threshold
    Neither = 0,
    /// Only the model is flooded (false alarm)
    ModelOnly = 1,
    /// Only the benchmark is flooded (miss)
    BenchmarkOnly = 2,
    /// Both are flooded (hit)
    Both = 3,
}

impl ContingencyClass {
    pub fn classify(benchmark: bool, model: bool) -> Self {
        match (benchmark, model) {
            (false, false) => ContingencyClass::Neither,
            (false, true) => ContingencyClass::ModelOnly,
            (true, false) => ContingencyClass::BenchmarkOnly,
            (true, true) => ContingencyClass::Both,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ContingencyClass {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(ContingencyClass::Neither),
            1 => Ok(ContingencyClass::ModelOnly),
            2 => Ok(ContingencyClass::BenchmarkOnly),
            3 => Ok(ContingencyClass::Both),
            other => Err(Error::InvalidParameter {
                name: "category",
                value: other.to_string(),
                reason: "contingency categories are 0..=3".into(),
            }),
        }
    }
}

/// Cell counts of the four agreement classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Flooded in both
    pub hits: usize,
    /// Flooded in the model only
    pub false_alarms: usize,
    /// Flooded in the benchmark only
    pub misses: usize,
    /// Dry in both
    pub correct_negatives: usize,
}

impl ContingencyTable {
    /// Count agreement classes of two co-registered masks (non-zero = flooded)
    pub fn from_masks(benchmark: &Raster<u8>, model: &Raster<u8>) -> Result<Self> {
        benchmark.ensure_same_shape(model)?;
        let table = Zip::from(benchmark.data())
            .and(model.data())
            .fold(Self::default(), |mut acc, &b, &m| {
                acc.record(ContingencyClass::classify(b != 0, m != 0));
                acc
            });
        Ok(table)
    }

    /// Count the classes of an existing category map
    pub fn from_category_map(map: &Raster<u8>) -> Result<Self> {
        let mut table = Self::default();
        for &code in map.data().iter() {
            table.record(ContingencyClass::try_from(code)?);
        }
        Ok(table)
    }

    fn record(&mut self, class: ContingencyClass) {
        match class {
            ContingencyClass::Neither => self.correct_negatives += 1,
            ContingencyClass::ModelOnly => self.false_alarms += 1,
            ContingencyClass::BenchmarkOnly => self.misses += 1,
            ContingencyClass::Both => self.hits += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.hits + self.false_alarms + self.misses + self.correct_negatives
    }

    /// Cells flooded in the benchmark
    pub fn benchmark_flooded(&self) -> usize {
        self.hits + self.misses
    }

    /// Cells flooded in the model
    pub fn model_flooded(&self) -> usize {
        self.hits + self.false_alarms
    }

    /// Cells flooded in either grid
    pub fn either_flooded(&self) -> usize {
        self.hits + self.misses + self.false_alarms
    }

    /// hits / benchmark flooded; `None` when the benchmark is dry
    pub fn hit_rate(&self) -> Option<f64> {
        ratio(self.hits, self.benchmark_flooded())
    }

    /// false alarms / model flooded; `None` when the model is dry
    pub fn false_alarm_rate(&self) -> Option<f64> {
        ratio(self.false_alarms, self.model_flooded())
    }

    /// hits / either flooded; `None` when both grids are dry
    pub fn critical_success_index(&self) -> Option<f64> {
        ratio(self.hits, self.either_flooded())
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

/// Fraction of benchmark-flooded cells also flooded in the model
pub fn hit_rate(benchmark: &Raster<u8>, model: &Raster<u8>) -> Result<Option<f64>> {
    Ok(ContingencyTable::from_masks(benchmark, model)?.hit_rate())
}

/// Fraction of model-flooded cells that are dry in the benchmark
pub fn false_alarm_rate(benchmark: &Raster<u8>, model: &Raster<u8>) -> Result<Option<f64>> {
    Ok(ContingencyTable::from_masks(benchmark, model)?.false_alarm_rate())
}

/// Intersection over union of the flooded cells
pub fn critical_success(benchmark: &Raster<u8>, model: &Raster<u8>) -> Result<Option<f64>> {
    Ok(ContingencyTable::from_masks(benchmark, model)?.critical_success_index())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn mask(values: &[u8]) -> Raster<u8> {
        Raster::from_vec(values.to_vec(), 2, 2).unwrap()
    }

    #[test]
    fn classify_codes() {
        assert_eq!(ContingencyClass::classify(false, false).code(), 0);
        assert_eq!(ContingencyClass::classify(false, true).code(), 1);
        assert_eq!(ContingencyClass::classify(true, false).code(), 2);
        assert_eq!(ContingencyClass::classify(true, true).code(), 3);
        assert!(ContingencyClass::try_from(4).is_err());
    }

    #[test]
    fn mixed_agreement() {
        let bench = mask(&[1, 0, 0, 1]);
        let model = mask(&[1, 0, 1, 0]);
        let table = ContingencyTable::from_masks(&bench, &model).unwrap();

        assert_eq!(
            table,
            ContingencyTable { hits: 1, false_alarms: 1, misses: 1, correct_negatives: 1 }
        );
        assert_relative_eq!(table.hit_rate().unwrap(), 0.5);
        assert_relative_eq!(table.false_alarm_rate().unwrap(), 0.5);
        assert_relative_eq!(table.critical_success_index().unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn dry_benchmark_leaves_hit_rate_undefined() {
        let bench = mask(&[0, 0, 0, 0]);
        let model = mask(&[1, 0, 0, 0]);

        assert_eq!(hit_rate(&bench, &model).unwrap(), None);
        assert_eq!(false_alarm_rate(&bench, &model).unwrap(), Some(1.0));
        assert_eq!(critical_success(&bench, &model).unwrap(), Some(0.0));
    }

    #[test]
    fn both_dry_leaves_everything_undefined() {
        let dry = mask(&[0, 0, 0, 0]);
        let table = ContingencyTable::from_masks(&dry, &dry).unwrap();
        assert_eq!(table.hit_rate(), None);
        assert_eq!(table.false_alarm_rate(), None);
        assert_eq!(table.critical_success_index(), None);
        assert_eq!(table.total(), 4);
    }

    #[test]
    fn identical_masks_score_one() {
        let a = mask(&[1, 0, 1, 1]);
        assert_eq!(critical_success(&a, &a).unwrap(), Some(1.0));
        assert_eq!(hit_rate(&a, &a).unwrap(), Some(1.0));
        assert_eq!(false_alarm_rate(&a, &a).unwrap(), Some(0.0));
    }

    #[test]
    fn disjoint_masks_score_zero() {
        let a = mask(&[1, 1, 0, 0]);
        let b = mask(&[0, 0, 1, 0]);
        assert_eq!(critical_success(&a, &b).unwrap(), Some(0.0));
        assert_eq!(hit_rate(&a, &b).unwrap(), Some(0.0));
    }

    #[test]
    fn scores_stay_in_unit_interval() {
        // Exhaustive over all pairs of 2x2 masks
        for a in 0u8..16 {
            for b in 0u8..16 {
                let bits = |n: u8| (0..4).map(|i| (n >> i) & 1).collect::<Vec<u8>>();
                let bench = mask(&bits(a));
                let model = mask(&bits(b));
                let table = ContingencyTable::from_masks(&bench, &model).unwrap();

                for score in [table.hit_rate(), table.false_alarm_rate(), table.critical_success_index()]
                    .into_iter()
                    .flatten()
                {
                    assert!((0.0..=1.0).contains(&score));
                }
                assert_eq!(table.hit_rate().is_some(), a != 0);
                assert_eq!(table.critical_success_index() == Some(1.0), a == b && a != 0);
            }
        }
    }

    #[test]
    fn shape_mismatch_is_fatal() {
        let a = mask(&[1, 0, 0, 1]);
        let b: Raster<u8> = Raster::new(1, 4);
        assert!(matches!(hit_rate(&a, &b), Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn table_from_category_map() {
        let map = mask(&[3, 0, 1, 2]);
        let table = ContingencyTable::from_category_map(&map).unwrap();
        assert_eq!(table.hits, 1);
        assert_eq!(table.false_alarms, 1);
        assert_eq!(table.misses, 1);
        assert_eq!(table.correct_negatives, 1);

        let bad = mask(&[3, 0, 7, 2]);
        assert!(ContingencyTable::from_category_map(&bad).is_err());
    }
}
