//! Burned area change classification
//!
//! Compares the vegetation and water indices of a pre-event and a
//! post-event acquisition and assigns each pixel one of three classes:
//! - 0 = not burned
//! - 1 = burned: both index deltas exceed their thresholds and at least one
//!   acquisition labels the pixel as vegetation
//! - 2 = invalid: either acquisition labels the pixel with an unreliable
//!   scene class; this overrides a burned result

use ndarray::Array2;
use rayon::prelude::*;
use burned_area_core::raster::Raster;
use burned_area_core::{Error, Result};

use super::indices::SpectralIndices;
use super::scene_class::{class_mask, validate_scene_classes, SceneClass, DEFAULT_INVALID_CLASSES};

/// Output category of the burned area raster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BurnClass {
    NotBurned = 0,
    Burned = 1,
    Invalid = 2,
}

impl BurnClass {
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Parameters for burned area classification
#[derive(Debug, Clone)]
pub struct BurnedAreaParams {
    /// Minimum `post - pre` NDVI difference (exclusive)
    pub ndvi_threshold: f64,
    /// Minimum `post - pre` NDWI difference (exclusive)
    pub ndwi_threshold: f64,
    /// Scene classes that force the invalid category
    pub invalid_classes: Vec<SceneClass>,
}

impl Default for BurnedAreaParams {
    fn default() -> Self {
        Self {
            ndvi_threshold: 0.19,
            ndwi_threshold: 0.18,
            invalid_classes: DEFAULT_INVALID_CLASSES.to_vec(),
        }
    }
}

impl BurnedAreaParams {
    /// Default parameters with custom thresholds
    pub fn with_thresholds(ndvi_threshold: f64, ndwi_threshold: f64) -> Self {
        Self {
            ndvi_threshold,
            ndwi_threshold,
            ..Self::default()
        }
    }

    /// Reject non-finite thresholds and an invalid set that masks vegetation
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("ndvi_threshold", self.ndvi_threshold), ("ndwi_threshold", self.ndwi_threshold)] {
            if !value.is_finite() {
                return Err(Error::InvalidParameter {
                    name,
                    value: value.to_string(),
                    reason: "threshold must be finite".to_string(),
                });
            }
        }

        if self.invalid_classes.contains(&SceneClass::Vegetation) {
            return Err(Error::InvalidParameter {
                name: "invalid_classes",
                value: format!("{:?}", self.invalid_classes),
                reason: "vegetation cannot be an invalid class".to_string(),
            });
        }

        Ok(())
    }
}

/// Burn predicate for a single pixel.
///
/// `(d_ndwi > ndwi_threshold) AND (d_ndvi > ndvi_threshold) AND (pre == vegetation OR post == vegetation)`
///
/// Comparisons against NaN are false, so a pixel with an undefined index never passes.
pub fn is_burned(d_ndvi: f64, d_ndwi: f64, pre_scl: u8, post_scl: u8, params: &BurnedAreaParams) -> bool {
    let vegetation = SceneClass::Vegetation.code();
    d_ndwi > params.ndwi_threshold
        && d_ndvi > params.ndvi_threshold
        && (pre_scl == vegetation || post_scl == vegetation)
}

/// Classify burned area from the indices and scene classes of two acquisitions.
///
/// All six rasters must share one grid; the output carries the grid,
/// transform and CRS of `pre_ndvi`. Scene class codes outside the codebook
/// are rejected before any pixel is classified.
pub fn classify(
    pre_ndvi: &Raster<f64>,
    post_ndvi: &Raster<f64>,
    pre_ndwi: &Raster<f64>,
    post_ndwi: &Raster<f64>,
    pre_scl: &Raster<u8>,
    post_scl: &Raster<u8>,
    params: &BurnedAreaParams,
) -> Result<Raster<u8>> {
    params.validate()?;

    for (name, r) in [("post_ndvi", post_ndvi), ("pre_ndwi", pre_ndwi), ("post_ndwi", post_ndwi)] {
        pre_ndvi.ensure_same_grid(r, name)?;
    }
    pre_ndvi.ensure_same_grid(pre_scl, "pre_scl")?;
    pre_ndvi.ensure_same_grid(post_scl, "post_scl")?;

    validate_scene_classes(pre_scl, "pre_scl")?;
    validate_scene_classes(post_scl, "post_scl")?;

    let (rows, cols) = pre_ndvi.shape();
    let invalid = class_mask(&params.invalid_classes);

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![BurnClass::NotBurned.code(); cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let (pre_q, post_q, d_ndvi, d_ndwi) = unsafe {
                    (
                        pre_scl.get_unchecked(row, col),
                        post_scl.get_unchecked(row, col),
                        post_ndvi.get_unchecked(row, col) - pre_ndvi.get_unchecked(row, col),
                        post_ndwi.get_unchecked(row, col) - pre_ndwi.get_unchecked(row, col),
                    )
                };

                if is_burned(d_ndvi, d_ndwi, pre_q, post_q, params) {
                    *cell = BurnClass::Burned.code();
                }

                // Applied last: invalid wins over burned.
                if invalid[pre_q as usize] || invalid[post_q as usize] {
                    *cell = BurnClass::Invalid.code();
                }
            }
            row_data
        })
        .collect();

    let mut output = pre_ndvi.with_same_meta::<u8>(rows, cols);
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data)?;

    Ok(output)
}

/// [`classify`] over the index pairs produced by [`compute_indices`](super::compute_indices)
pub fn burned_area(
    pre: &SpectralIndices,
    post: &SpectralIndices,
    pre_scl: &Raster<u8>,
    post_scl: &Raster<u8>,
    params: &BurnedAreaParams,
) -> Result<Raster<u8>> {
    classify(&pre.ndvi, &post.ndvi, &pre.ndwi, &post.ndwi, pre_scl, post_scl, params)
}

/// Pixel count per output category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub not_burned: usize,
    pub burned: usize,
    pub invalid: usize,
}

impl ClassCounts {
    pub fn from_raster(raster: &Raster<u8>) -> Self {
        let counts = raster.value_counts();
        Self {
            not_burned: counts[BurnClass::NotBurned.code() as usize],
            burned: counts[BurnClass::Burned.code() as usize],
            invalid: counts[BurnClass::Invalid.code() as usize],
        }
    }

    pub fn total(&self) -> usize {
        self.not_burned + self.burned + self.invalid
    }

    /// Share of valid (not invalid) pixels classified as burned
    pub fn burned_fraction(&self) -> Option<f64> {
        let valid = self.not_burned + self.burned;
        (valid > 0).then(|| self.burned as f64 / valid as f64)
    }
}
