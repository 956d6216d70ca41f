//! Cell value trait shared by all grids

use num_traits::{NumCast, Zero};
use std::fmt::{Debug, Display};

/// Trait for types that can be stored in a raster cell.
///
/// Grids read from disk are usually `f64`, masks and category maps `u8`.
pub trait RasterElement:
    Copy + Debug + Display + PartialOrd + NumCast + Zero + Send + Sync + 'static
{
    /// Sentinel used when a grid carries no explicit no-data value
    fn default_nodata() -> Self;

    /// Whether this value matches the given no-data sentinel
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Lossless-where-possible conversion to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }

    /// Conversion from f64, `None` when the value does not fit
    fn from_f64(value: f64) -> Option<Self> {
        NumCast::from(value)
    }
}

macro_rules! impl_raster_element_int {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::MAX
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                nodata == Some(*self)
            }

            fn is_float() -> bool {
                false
            }
        }
    )*};
}

macro_rules! impl_raster_element_float {
    ($($t:ty),*) => {$(
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::NAN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() <= <$t>::EPSILON * 100.0 * nd.abs().max(1.0),
                    None => false,
                }
            }

            fn is_float() -> bool {
                true
            }
        }
    )*};
}

impl_raster_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_raster_element_float!(f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_nan_is_always_nodata() {
        assert!(f64::NAN.is_nodata(None));
        assert!(f32::NAN.is_nodata(Some(-9999.0)));
    }

    #[test]
    fn float_sentinel_match() {
        assert!((-9999.0f64).is_nodata(Some(-9999.0)));
        assert!((-3.4028235e38f32).is_nodata(Some(f32::MIN)));
        assert!(!0.0f64.is_nodata(Some(-9999.0)));
        assert!(!1.0f64.is_nodata(None));
    }

    #[test]
    fn integer_sentinel_match() {
        assert!(255u8.is_nodata(Some(255)));
        assert!(!0u8.is_nodata(Some(255)));
        assert!(!0u8.is_nodata(None));
        assert_eq!(u8::default_nodata(), 255);
    }

    #[test]
    fn casts() {
        assert_eq!(u8::from_f64(3.0), Some(3));
        assert_eq!(u8::from_f64(-1.0), None);
        assert_eq!(3u8.to_f64(), Some(3.0));
    }
}
