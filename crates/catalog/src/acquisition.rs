//! Acquisition loading from a local STAC item.
//!
//! Each acquisition is described by a STAC item whose band assets point at
//! GeoTIFFs already resampled onto one common grid. Hrefs are resolved
//! relative to the item file. Fetching remote assets is not done here.

use std::fs;
use std::path::{Path, PathBuf};

use burned_area_algorithms::imagery::AcquisitionBands;
use burned_area_core::io::read_geotiff;
use burned_area_core::{Raster, RasterElement, CRS};
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{CatalogError, Result};
use crate::stac_models::StacItem;

/// Asset keys tried, in order, for each band.
#[derive(Debug, Clone)]
pub struct BandKeys {
    pub red: Vec<String>,
    pub nir: Vec<String>,
    pub swir: Vec<String>,
    pub scl: Vec<String>,
}

impl Default for BandKeys {
    /// Sentinel-2 band names first, then the Earth Search v1 common names.
    fn default() -> Self {
        let keys = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            red: keys(&["B04", "red"]),
            nir: keys(&["B08", "nir"]),
            swir: keys(&["B11", "swir16"]),
            scl: keys(&["SCL", "scl"]),
        }
    }
}

/// One acquisition: its STAC item, acquisition time and band rasters.
#[derive(Debug, Clone)]
pub struct Acquisition {
    pub item: StacItem,
    pub datetime: DateTime<Utc>,
    pub bands: AcquisitionBands,
}

impl Acquisition {
    /// Parse the item at `path` and read its four band assets.
    pub fn from_item_file(path: impl AsRef<Path>, keys: &BandKeys) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
        let item: StacItem = serde_json::from_str(&text).map_err(|e| CatalogError::json(path, e))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        Self::from_item(item, base, keys)
    }

    /// Read the band assets of an already parsed item, resolving relative hrefs against `base`.
    pub fn from_item(item: StacItem, base: &Path, keys: &BandKeys) -> Result<Self> {
        let datetime = item.datetime().map_err(|reason| CatalogError::InvalidDatetime {
            item: item.id.clone(),
            reason,
        })?;

        info!("Loading acquisition {} ({})", item.id, datetime.format("%Y-%m-%d"));

        // Every asset is located before any raster is opened.
        let red = resolve_href(&item, base, "red", &keys.red)?;
        let nir = resolve_href(&item, base, "nir", &keys.nir)?;
        let swir = resolve_href(&item, base, "swir", &keys.swir)?;
        let scl = resolve_href(&item, base, "scl", &keys.scl)?;

        let mut bands = AcquisitionBands {
            red: read_band(&item, "red", &red)?,
            nir: read_band(&item, "nir", &nir)?,
            swir: read_band(&item, "swir", &swir)?,
            scl: read_band(&item, "scl", &scl)?,
        };

        // Fall back to proj:epsg when the GeoTIFFs carry no usable GeoKeys.
        if let Some(epsg) = item.epsg() {
            fill_crs(&mut bands.red, epsg);
            fill_crs(&mut bands.nir, epsg);
            fill_crs(&mut bands.swir, epsg);
            fill_crs(&mut bands.scl, epsg);
        }

        bands.ensure_co_registered().map_err(|source| CatalogError::Band {
            item: item.id.clone(),
            band: "all",
            source,
        })?;

        Ok(Self { item, datetime, bands })
    }
}

fn fill_crs<T: RasterElement>(raster: &mut Raster<T>, epsg: u32) {
    if raster.crs().is_none() {
        raster.set_crs(Some(CRS::from_epsg(epsg)));
    }
}

fn resolve_href(item: &StacItem, base: &Path, band: &'static str, keys: &[String]) -> Result<PathBuf> {
    let (key, asset) = item.first_asset(keys).ok_or_else(|| CatalogError::MissingAsset {
        item: item.id.clone(),
        band,
        tried: keys.to_vec(),
    })?;

    if asset.is_remote() {
        return Err(CatalogError::RemoteAsset {
            item: item.id.clone(),
            href: asset.href.clone(),
        });
    }

    let href = asset.href.strip_prefix("file://").unwrap_or(&asset.href);
    let path = base.join(href);
    debug!("{} band {} -> asset {} at {}", item.id, band, key, path.display());
    Ok(path)
}

fn read_band<T: RasterElement>(item: &StacItem, band: &'static str, path: &Path) -> Result<Raster<T>> {
    read_geotiff(path, None).map_err(|source| CatalogError::Band {
        item: item.id.clone(),
        band,
        source,
    })
}
