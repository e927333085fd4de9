//! Spectral indices from scaled reflectance
//!
//! Level-2A reflectance is delivered as unsigned integer counts. Each count
//! is divided by [`REFLECTANCE_GAIN`] before the normalized difference is
//! taken, so the indices are computed on fractional reflectance.

use ndarray::Array2;
use rayon::prelude::*;
use burned_area_core::raster::Raster;
use burned_area_core::Result;

/// Scale factor between stored reflectance counts and fractional reflectance
pub const REFLECTANCE_GAIN: f64 = 10_000.0;

/// Vegetation and water indices of one acquisition
#[derive(Debug, Clone)]
pub struct SpectralIndices {
    /// `(NIR - Red) / (NIR + Red)`
    pub ndvi: Raster<f64>,
    /// `(NIR - SWIR) / (NIR + SWIR)`
    pub ndwi: Raster<f64>,
}

/// Normalized difference of two reflectance bands after gain scaling:
///
/// `(a/g - b/g) / (a/g + b/g)`
///
/// No masking is applied. A pixel where both counts are zero yields NaN
/// (0/0); every other pixel lands in [-1, 1].
pub fn scaled_normalized_difference(band_a: &Raster<u16>, band_b: &Raster<u16>) -> Result<Raster<f64>> {
    band_a.ensure_same_grid(band_b, "band_b")?;

    let (rows, cols) = band_a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            (0..cols)
                .map(|col| {
                    let a = f64::from(unsafe { band_a.get_unchecked(row, col) }) / REFLECTANCE_GAIN;
                    let b = f64::from(unsafe { band_b.get_unchecked(row, col) }) / REFLECTANCE_GAIN;
                    (a - b) / (a + b)
                })
                .collect::<Vec<_>>()
        })
        .collect();

    let mut output = band_a.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data)?;

    Ok(output)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Dense live vegetation sits around 0.6 to 0.9, bare soil near 0.1.
pub fn ndvi(nir: &Raster<u16>, red: &Raster<u16>) -> Result<Raster<f64>> {
    scaled_normalized_difference(nir, red)
}

/// Normalized Difference Water Index, SWIR variant (Gao, 1996)
///
/// `NDWI = (NIR - SWIR) / (NIR + SWIR)`
///
/// Tracks canopy water content; same formula as the Normalized Burn Ratio
/// when the SWIR band is around 1.6 µm.
pub fn ndwi(nir: &Raster<u16>, swir: &Raster<u16>) -> Result<Raster<f64>> {
    scaled_normalized_difference(nir, swir)
}

/// Compute both indices for one acquisition.
///
/// The three bands must share one grid; a mismatch is rejected before any
/// pixel is touched.
pub fn compute_indices(red: &Raster<u16>, nir: &Raster<u16>, swir: &Raster<u16>) -> Result<SpectralIndices> {
    red.ensure_same_grid(nir, "nir")?;
    red.ensure_same_grid(swir, "swir")?;

    Ok(SpectralIndices {
        ndvi: ndvi(nir, red)?,
        ndwi: ndwi(nir, swir)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use burned_area_core::{Error, GeoTransform, CRS};

    fn make_band(value: u16) -> Raster<u16> {
        let mut r = Raster::filled(5, 5, value);
        r.set_transform(GeoTransform::new(600000.0, 3400050.0, 10.0, -10.0));
        r.set_crs(Some(CRS::from_epsg(32636)));
        r
    }

    #[test]
    fn test_ndvi_vegetated() {
        let nir = make_band(4000);
        let red = make_band(500);

        let result = ndvi(&nir, &red).unwrap();
        let expected = (0.4 - 0.05) / (0.4 + 0.05);
        assert_relative_eq!(result.get(2, 2).unwrap(), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_ndwi_uses_nir_and_swir() {
        let nir = make_band(3000);
        let swir = make_band(1000);

        let result = ndwi(&nir, &swir).unwrap();
        assert_relative_eq!(result.get(0, 0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_over_zero_is_nan() {
        let mut nir = make_band(2000);
        let mut red = make_band(1000);
        nir.set(1, 1, 0).unwrap();
        red.set(1, 1, 0).unwrap();

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
        assert!(!result.get(1, 2).unwrap().is_nan());
    }

    #[test]
    fn test_single_zero_band_is_finite() {
        let nir = make_band(2000);
        let red = make_band(0);

        let result = ndvi(&nir, &red).unwrap();
        assert_relative_eq!(result.get(0, 0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_output_keeps_georeference() {
        let nir = make_band(2000);
        let red = make_band(1000);

        let result = ndvi(&nir, &red).unwrap();
        assert_eq!(result.shape(), nir.shape());
        assert_eq!(result.transform(), nir.transform());
        assert_eq!(result.crs(), nir.crs());
    }

    #[test]
    fn test_compute_indices_is_deterministic() {
        let mut red = make_band(700);
        let mut nir = make_band(3100);
        let swir = make_band(1900);
        for i in 0..5 {
            red.set(i, i, (i as u16) * 311).unwrap();
            nir.set(i, 4 - i, (i as u16) * 977).unwrap();
        }

        let first = compute_indices(&red, &nir, &swir).unwrap();
        let second = compute_indices(&red, &nir, &swir).unwrap();

        let bits = |r: &Raster<f64>| r.data().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&first.ndvi), bits(&second.ndvi));
        assert_eq!(bits(&first.ndwi), bits(&second.ndwi));
    }

    #[test]
    fn test_compute_indices_rejects_mismatched_bands() {
        let red = make_band(700);
        let nir = make_band(3100);
        let swir = Raster::filled(5, 4, 1900u16);

        let result = compute_indices(&red, &nir, &swir);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }
}
