//! Contingency analysis of flood extents
//!
//! Compares a benchmark (observed) flood extent with a model (simulated)
//! one on a common grid:
//! - **mask**: copy-on-normalise of no-data and threshold exceedance masks
//! - **table**: the four agreement classes, their counts and the scores
//!   derived from them (hit rate, false-alarm rate, critical success index)
//! - **evaluate**: category map and the full single/batch evaluation
//!
//! A score whose denominator is zero is reported as `None`, never as NaN
//! or a panic.

mod evaluate;
mod mask;
mod table;

pub use evaluate::{contingency_map, evaluate, evaluate_many, ContingencyParams, ContingencyResult};
pub use mask::{count_flooded, normalize_nodata, threshold_mask};
pub use table::{critical_success, false_alarm_rate, hit_rate, ContingencyClass, ContingencyTable};
