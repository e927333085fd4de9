//! End-to-end burned area detection from raw acquisition bands

use burned_area_core::raster::Raster;
use burned_area_core::{Algorithm, Error, Result};

use super::change_detection::{burned_area, BurnedAreaParams};
use super::indices::compute_indices;

/// Co-registered bands of one acquisition
#[derive(Debug, Clone)]
pub struct AcquisitionBands {
    /// Red reflectance (Sentinel-2 B04)
    pub red: Raster<u16>,
    /// Near-infrared reflectance (B08)
    pub nir: Raster<u16>,
    /// Shortwave-infrared reflectance (B11)
    pub swir: Raster<u16>,
    /// Scene classification (SCL)
    pub scl: Raster<u8>,
}

impl AcquisitionBands {
    /// Fail unless all four bands share the red band's grid
    pub fn ensure_co_registered(&self) -> Result<()> {
        self.red.ensure_same_grid(&self.nir, "nir")?;
        self.red.ensure_same_grid(&self.swir, "swir")?;
        self.red.ensure_same_grid(&self.scl, "scl")
    }
}

/// Pre-event and post-event acquisitions of the same tile
#[derive(Debug, Clone)]
pub struct BurnedAreaInput {
    pub pre: AcquisitionBands,
    pub post: AcquisitionBands,
}

/// Burned area detection as an [`Algorithm`]: indices for both acquisitions,
/// then change classification.
#[derive(Debug, Clone, Copy, Default)]
pub struct BurnedArea;

impl Algorithm for BurnedArea {
    type Input = BurnedAreaInput;
    type Output = Raster<u8>;
    type Params = BurnedAreaParams;
    type Error = Error;

    fn name(&self) -> &'static str {
        "burned-area"
    }

    fn description(&self) -> &'static str {
        "Burned area from NDVI/NDWI differences between two acquisitions"
    }

    fn execute(&self, input: BurnedAreaInput, params: BurnedAreaParams) -> Result<Raster<u8>> {
        params.validate()?;
        input.pre.ensure_co_registered()?;
        input.post.ensure_co_registered()?;
        input.pre.red.ensure_same_grid(&input.post.red, "post")?;

        let BurnedAreaInput { pre, post } = input;

        let pre_indices = compute_indices(&pre.red, &pre.nir, &pre.swir)?;
        let post_indices = compute_indices(&post.red, &post.nir, &post.swir)?;

        burned_area(&pre_indices, &post_indices, &pre.scl, &post.scl, &params)
    }
}
