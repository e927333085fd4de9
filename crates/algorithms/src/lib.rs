//! # Burned Area Algorithms
//!
//! Change detection between a pre-event and a post-event multispectral
//! acquisition. Every kernel is a pure element-wise transform, parallelised
//! over rows with rayon.

pub mod imagery;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        burned_area, classify, compute_indices, ndvi, ndwi, AcquisitionBands, BurnClass, BurnedArea,
        BurnedAreaInput, BurnedAreaParams, ClassCounts, SceneClass, SpectralIndices,
    };
    pub use burned_area_core::prelude::*;
}
