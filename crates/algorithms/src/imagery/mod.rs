//! Imagery analysis for burned area detection
//!
//! - Spectral indices: NDVI and SWIR-based NDWI on gain-scaled reflectance
//! - Scene classification codebook (Sentinel-2 SCL)
//! - Change classification: burned / not burned / invalid
//! - `BurnedArea`: the full pipeline behind the `Algorithm` trait

mod burned_area;
mod change_detection;
mod indices;
mod scene_class;

pub use burned_area::{AcquisitionBands, BurnedArea, BurnedAreaInput};
pub use change_detection::{burned_area, classify, is_burned, BurnClass, BurnedAreaParams, ClassCounts};
pub use indices::{
    compute_indices, ndvi, ndwi, scaled_normalized_difference, SpectralIndices, REFLECTANCE_GAIN,
};
pub use scene_class::{validate_scene_classes, SceneClass, DEFAULT_INVALID_CLASSES};
