//! Cell value types

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// How samples of a cell type are laid out when written to a GeoTIFF.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleStorage {
    /// 8-bit unsigned integer (categorical outputs, scene classification)
    Byte,
    /// 16-bit unsigned integer (reflectance counts)
    UInt16,
    /// 32-bit IEEE float (indices and other real-valued rasters)
    Float32,
}

/// Trait for types that can be stored in a raster cell.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Check if this value represents no-data
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// On-disk sample layout
    fn storage() -> SampleStorage;

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($t:ty, $storage:expr) => {
        impl RasterElement for $t {
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                nodata.is_some_and(|nd| *self == nd)
            }

            fn storage() -> SampleStorage {
                $storage
            }
        }
    };
}

macro_rules! impl_raster_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }

            fn storage() -> SampleStorage {
                SampleStorage::Float32
            }
        }
    };
}

impl_raster_element_int!(u8, SampleStorage::Byte);
impl_raster_element_int!(u16, SampleStorage::UInt16);
impl_raster_element_float!(f32);
impl_raster_element_float!(f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_is_always_nodata() {
        assert!(f64::NAN.is_nodata(None));
        assert!(!0.5_f64.is_nodata(None));
    }

    #[test]
    fn test_integer_nodata_requires_explicit_value() {
        assert!(!0_u16.is_nodata(None));
        assert!(0_u16.is_nodata(Some(0)));
    }

    #[test]
    fn test_storage() {
        assert_eq!(u8::storage(), SampleStorage::Byte);
        assert_eq!(u16::storage(), SampleStorage::UInt16);
        assert_eq!(f64::storage(), SampleStorage::Float32);
    }
}
