//! Error types for acquisition loading and catalog writing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while reading STAC items or writing the output catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid STAC JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("item {item} has no asset for {band} (tried {tried:?})")]
    MissingAsset {
        item: String,
        band: &'static str,
        tried: Vec<String>,
    },

    #[error("asset {href} of item {item} is remote; fetch it locally first")]
    RemoteAsset { item: String, href: String },

    #[error("item {item} has an invalid datetime: {reason}")]
    InvalidDatetime { item: String, reason: String },

    #[error("band {band} of item {item}: {source}")]
    Band {
        item: String,
        band: &'static str,
        #[source]
        source: burned_area_core::Error,
    },

    #[error("core error: {0}")]
    Core(#[from] burned_area_core::Error),
}

impl CatalogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CatalogError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        CatalogError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
