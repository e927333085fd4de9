//! # Burned Area Core
//!
//! Core types and I/O shared by the burned area detection crates.
//!
//! This crate provides:
//! - `Raster<T>`: georeferenced 2D grid backed by `ndarray`
//! - `GeoTransform`: affine transform from pixel to map coordinates
//! - `CRS`: spatial reference carried alongside every raster
//! - The `Algorithm` trait implemented by the processing crates
//! - Native GeoTIFF reading and writing

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::CRS;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, SampleStorage};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::CRS;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
    pub use crate::Algorithm;
}

/// A processing step that turns an input into an output under a set of parameters.
///
/// Implementations are pure: the same input and parameters always produce the
/// same output, and nothing outside the call is mutated.
pub trait Algorithm {
    /// Input type for the algorithm
    type Input;
    /// Output type for the algorithm
    type Output;
    /// Parameters controlling algorithm behavior
    type Params: Default;
    /// Error type for algorithm execution
    type Error: std::error::Error;

    /// Short machine-friendly name
    fn name(&self) -> &'static str;

    /// One-line description
    fn description(&self) -> &'static str;

    /// Execute the algorithm
    fn execute(&self, input: Self::Input, params: Self::Params) -> std::result::Result<Self::Output, Self::Error>;

    /// Execute with default parameters
    fn execute_default(&self, input: Self::Input) -> std::result::Result<Self::Output, Self::Error> {
        self.execute(input, Self::Params::default())
    }
}
