//! # floodimpact algorithms
//!
//! Numerical core of the flood extent comparison.
//!
//! ## Modules
//!
//! - **align**: resample a raster onto another grid's resolution and extent
//! - **contingency**: category map, hit rate, false-alarm rate and critical
//!   success index between observed and simulated flood extents
//! - **impact**: population affected by a flood extent

pub mod align;
pub mod contingency;
pub mod impact;

mod maybe_rayon;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::align::{align, align_to, AlignParams, ResampleMethod};
    pub use crate::contingency::{
        contingency_map, evaluate, evaluate_many, ContingencyClass, ContingencyParams,
        ContingencyResult, ContingencyTable,
    };
    pub use crate::impact::{affected_population, exposure, mask_population};
    pub use floodimpact_core::prelude::*;
}
