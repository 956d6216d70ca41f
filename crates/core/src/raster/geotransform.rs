//! Affine geotransformation for rasters

use super::Extent;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest grid `for_extent` will size
const MAX_CELLS: u64 = u32::MAX as u64;

/// Affine transformation coefficients for georeferencing rasters.
///
/// Converts between pixel coordinates (col, row) and geographic coordinates (x, y):
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// For north-up images, `row_rotation` and `col_rotation` are 0
/// and `pixel_height` is negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    /// Rotation about X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up image)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Build the transform and grid size that cover `extent` at the given
    /// signed resolution.
    ///
    /// The origin is the extent corner implied by the resolution signs
    /// (`ymax` for the usual negative `yres`). Pixel counts are rounded to
    /// the nearest integer, so the far edge may shift by less than half a
    /// pixel. Returns `(transform, rows, cols)`.
    pub fn for_extent(extent: &Extent, xres: f64, yres: f64) -> Result<(Self, usize, usize)> {
        for (name, res) in [("xres", xres), ("yres", yres)] {
            if !res.is_finite() || res == 0.0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: res.to_string(),
                    reason: "resolution must be finite and non-zero".into(),
                });
            }
        }
        if xres < 0.0 {
            return Err(Error::InvalidParameter {
                name: "xres",
                value: xres.to_string(),
                reason: "x resolution must be positive".into(),
            });
        }

        let cols = (extent.width() / xres.abs()).round();
        let rows = (extent.height() / yres.abs()).round();
        // Cell count must fit a single TIFF image
        if rows < 1.0 || cols < 1.0 || rows * cols > MAX_CELLS as f64 {
            return Err(Error::InvalidDimensions {
                width: cols as usize,
                height: rows as usize,
            });
        }
        let (rows, cols) = (rows as usize, cols as usize);

        let origin_y = if yres < 0.0 { extent.ymax } else { extent.ymin };
        Ok((Self::new(extent.xmin, origin_y, xres, yres), rows, cols))
    }

    /// Convert to GDAL-style array
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.pixel_width,
            self.row_rotation,
            self.origin_y,
            self.col_rotation,
            self.pixel_height,
        ]
    }

    /// Signed pixel size `(x, y)`
    pub fn resolution(&self) -> (f64, f64) {
        (self.pixel_width, self.pixel_height)
    }

    /// Convert pixel coordinates to geographic coordinates
    ///
    /// Returns the coordinates of the pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Convert pixel coordinates to geographic coordinates (top-left corner)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Convert geographic coordinates to pixel coordinates
    ///
    /// Returns fractional pixel coordinates; use `.floor()` to get integer indices
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-20 {
            // Degenerate transformation
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Check if this is a north-up image (no rotation)
    pub fn is_north_up(&self) -> bool {
        self.row_rotation.abs() < 1e-10
            && self.col_rotation.abs() < 1e-10
            && self.pixel_height < 0.0
    }

    /// Calculate the bounding extent for a raster of given dimensions
    pub fn bounds(&self, width: usize, height: usize) -> Extent {
        let (x0, y0) = self.pixel_to_geo_corner(0, 0);
        let (x1, y1) = self.pixel_to_geo_corner(width, 0);
        let (x2, y2) = self.pixel_to_geo_corner(0, height);
        let (x3, y3) = self.pixel_to_geo_corner(width, height);

        Extent {
            xmin: x0.min(x1).min(x2).min(x3),
            ymin: y0.min(y1).min(y2).min(y3),
            xmax: x0.max(x1).max(x2).max(x3),
            ymax: y0.max(y1).max(y2).max(y3),
        }
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
