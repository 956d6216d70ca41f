//! Axis-aligned bounding extent in map units

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bounding extent `(xmin, ymin, xmax, ymax)` of a north-up raster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl Extent {
    /// Create an extent, rejecting empty or inverted boxes
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Result<Self> {
        let finite = [xmin, ymin, xmax, ymax].iter().all(|v| v.is_finite());
        if !finite || xmax <= xmin || ymax <= ymin {
            return Err(Error::InvalidParameter {
                name: "extent",
                value: format!("({xmin}, {ymin}, {xmax}, {ymax})"),
                reason: "expected finite bounds with xmax > xmin and ymax > ymin".into(),
            });
        }
        Ok(Self { xmin, ymin, xmax, ymax })
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Whether the two extents share a region of positive area
    pub fn intersects(&self, other: &Extent) -> bool {
        self.xmin < other.xmax
            && other.xmin < self.xmax
            && self.ymin < other.ymax
            && other.ymin < self.ymax
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.6}, {:.6}) - ({:.6}, {:.6})",
            self.xmin, self.ymin, self.xmax, self.ymax
        )
    }
}
