//! Spatial reference handling

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial reference of a raster grid.
///
/// Held as an EPSG code, a WKT string, or both. The reference is propagated
/// unchanged from inputs to outputs; no reprojection happens here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CRS {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation
    wkt: Option<String>,
}

impl CRS {
    /// Create a CRS from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a CRS from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// Attach an EPSG code to an existing reference
    pub fn with_epsg(mut self, code: u32) -> Self {
        self.epsg = Some(code);
        self
    }

    /// EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// WKT representation if known
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Whether this is a geographic (lat/lon) system.
    ///
    /// EPSG codes in the 4000-4999 block, or without a code, a WKT whose
    /// root node is `GEOGCS`/`GEOGCRS`. Anything else is treated as projected.
    pub fn is_geographic(&self) -> bool {
        match (self.epsg, &self.wkt) {
            (Some(code), _) => (4000..=4999).contains(&code),
            (None, Some(wkt)) => {
                let root = wkt.trim_start();
                root.starts_with("GEOGCS[") || root.starts_with("GEOGCRS[")
            }
            (None, None) => false,
        }
    }

    /// Check if two references describe the same system.
    ///
    /// EPSG codes win when both sides have one, otherwise WKT is compared verbatim.
    pub fn is_equivalent(&self, other: &CRS) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (&self.wkt, &other.wkt) {
            return a == b;
        }
        false
    }

    /// Short identifier, e.g. `EPSG:32636`
    pub fn identifier(&self) -> String {
        if let Some(code) = self.epsg {
            return format!("EPSG:{}", code);
        }
        if let Some(wkt) = &self.wkt {
            let end = wkt
                .char_indices()
                .nth(50)
                .map(|(i, _)| i)
                .unwrap_or(wkt.len());
            return format!("WKT:{}", &wkt[..end]);
        }
        "Unknown".to_string()
    }
}

impl fmt::Display for CRS {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identifier())
    }
}
