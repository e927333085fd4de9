//! Error types for burned area processing

use thiserror::Error;

/// Main error type for raster operations.
///
/// Every variant except `Io` and `Tiff` describes a precondition violation:
/// the inputs have to be fixed upstream, retrying will not help.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TIFF error: {0}")]
    Tiff(String),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch for {name}: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch {
        name: String,
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("Geotransform mismatch for {name}: expected {expected:?}, got {actual:?}")]
    TransformMismatch {
        name: String,
        expected: [f64; 6],
        actual: [f64; 6],
    },

    #[error("CRS mismatch for {name}: {expected} vs {actual}")]
    CrsMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Invalid scene classification code {code} in {name} at ({row}, {col})")]
    InvalidClassCode {
        name: String,
        code: u8,
        row: usize,
        col: usize,
    },

    #[error("Sample {value} at ({row}, {col}) does not fit {target}")]
    SampleOutOfRange {
        value: String,
        target: &'static str,
        row: usize,
        col: usize,
    },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl From<tiff::TiffError> for Error {
    fn from(e: tiff::TiffError) -> Self {
        Error::Tiff(e.to_string())
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(e: ndarray::ShapeError) -> Self {
        Error::Other(e.to_string())
    }
}

/// Result type alias for raster operations
pub type Result<T> = std::result::Result<T, Error>;
