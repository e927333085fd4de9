//! Raster data structures

mod element;
mod geotransform;
mod grid;

pub use element::{RasterElement, SampleStorage};
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
