//! STAC (SpatioTemporal Asset Catalog) data types.
//!
//! Lightweight serde models for the subset of STAC used here: reading the
//! Sentinel-2 items describing each acquisition, and writing the item and
//! catalog describing the burned area product.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// STAC version written into produced documents.
pub const STAC_VERSION: &str = "1.0.0";

/// A single STAC Item (GeoJSON Feature).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacItem {
    #[serde(rename = "type")]
    pub type_: String,

    #[serde(default = "default_stac_version")]
    pub stac_version: String,

    /// Unique item identifier.
    pub id: String,

    /// Footprint as raw GeoJSON; passed through untouched.
    pub geometry: Option<serde_json::Value>,

    /// Bounding box `[west, south, east, north]`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    pub properties: StacItemProperties,

    #[serde(default)]
    pub assets: BTreeMap<String, StacAsset>,

    #[serde(default)]
    pub links: Vec<StacLink>,

    /// Collection this item belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
}

fn default_stac_version() -> String {
    STAC_VERSION.to_string()
}

impl StacItem {
    /// New item with no assets or links.
    pub fn new(id: impl Into<String>, properties: StacItemProperties) -> Self {
        Self {
            type_: "Feature".to_string(),
            stac_version: default_stac_version(),
            id: id.into(),
            geometry: None,
            bbox: None,
            properties,
            assets: BTreeMap::new(),
            links: Vec::new(),
            collection: None,
        }
    }

    /// Get an asset by key.
    pub fn asset(&self, key: &str) -> Option<&StacAsset> {
        self.assets.get(key)
    }

    /// First asset found under any of `keys`, in order.
    pub fn first_asset<'a>(&'a self, keys: &[String]) -> Option<(&'a str, &'a StacAsset)> {
        keys.iter()
            .find_map(|k| self.assets.get_key_value(k.as_str()))
            .map(|(k, a)| (k.as_str(), a))
    }

    /// Acquisition time from `properties.datetime` (RFC 3339).
    pub fn datetime(&self) -> std::result::Result<DateTime<Utc>, String> {
        let raw = self
            .properties
            .datetime
            .as_deref()
            .ok_or_else(|| "properties.datetime is missing".to_string())?;
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("{raw:?}: {e}"))
    }

    /// EPSG code from the `proj:epsg` property, if available.
    pub fn epsg(&self) -> Option<u32> {
        self.properties
            .extra
            .get("proj:epsg")
            .and_then(|v| v.as_u64())
            .and_then(|v| u32::try_from(v).ok())
    }
}

/// STAC Item properties.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StacItemProperties {
    /// ISO 8601 datetime.
    pub datetime: Option<String>,

    /// Platform name (e.g., "sentinel-2b").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    /// Cloud cover percentage (EO extension).
    #[serde(rename = "eo:cloud_cover", skip_serializing_if = "Option::is_none")]
    pub eo_cloud_cover: Option<f64>,

    /// All other properties we don't model explicitly.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A single STAC Asset (file reference).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacAsset {
    /// Location of the asset, relative to the item document or absolute.
    pub href: String,

    /// Media type (e.g., `"image/tiff; application=geotiff"`).
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Roles: `["data"]`, `["thumbnail"]`, etc.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// All other asset fields.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl StacAsset {
    /// Whether the href points at a network location rather than a file.
    pub fn is_remote(&self) -> bool {
        let href = self.href.to_ascii_lowercase();
        ["http://", "https://", "s3://", "gs://", "/vsicurl/"]
            .iter()
            .any(|scheme| href.starts_with(scheme))
    }
}

/// A STAC Link.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StacLink {
    /// Relationship: `"root"`, `"parent"`, `"item"`, `"self"`, ...
    pub rel: String,

    pub href: String,

    /// Media type of the linked resource.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StacLink {
    /// JSON link with the given relationship
    pub fn json(rel: &str, href: impl Into<String>) -> Self {
        Self {
            rel: rel.to_string(),
            href: href.into(),
            type_: Some("application/json".to_string()),
            title: None,
        }
    }
}

/// A STAC Catalog.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StacCatalog {
    #[serde(rename = "type")]
    pub type_: String,

    pub id: String,

    #[serde(default = "default_stac_version")]
    pub stac_version: String,

    pub description: String,

    #[serde(default)]
    pub links: Vec<StacLink>,
}

impl StacCatalog {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            type_: "Catalog".to_string(),
            id: id.into(),
            stac_version: default_stac_version(),
            description: description.into(),
            links: Vec::new(),
        }
    }

    /// Links pointing at child items.
    pub fn item_links(&self) -> impl Iterator<Item = &StacLink> {
        self.links.iter().filter(|l| l.rel == "item")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
