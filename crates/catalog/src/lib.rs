//! # Burned Area Catalog
//!
//! The packaging side of burned area detection:
//! - Lightweight serde models for STAC items and catalogs
//! - Loading a pre-event or post-event acquisition from a local STAC item
//! - Naming the product after both acquisition dates
//! - Writing the classification raster into a self-contained catalog

pub mod acquisition;
pub mod error;
pub mod naming;
pub mod stac_models;
pub mod writer;

pub use acquisition::{Acquisition, BandKeys};
pub use error::{CatalogError, Result};
pub use naming::output_name;
pub use stac_models::{StacAsset, StacCatalog, StacItem, StacItemProperties, StacLink};
pub use writer::{CatalogWriter, WrittenProduct};
