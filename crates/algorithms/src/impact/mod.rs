//! Population exposure
//!
//! First-order estimate of people affected by a flood extent: overlay a
//! flood mask with a co-registered population count grid and sum.

mod exposure;

pub use exposure::{affected_population, exposure, mask_population};
