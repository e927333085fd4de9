//! Self-contained output catalog.
//!
//! Layout under the root directory:
//!
//! ```text
//! catalog.json
//! <name>/<name>.json    STAC item (pre-event footprint and datetime)
//! <name>/<name>.tif     burned area classification raster
//! ```
//!
//! Every link and asset href is relative, so the tree can be moved as a whole.

use std::fs;
use std::path::{Path, PathBuf};

use burned_area_algorithms::imagery::{BurnedAreaParams, ClassCounts};
use burned_area_core::io::{write_geotiff, GeoTiffOptions};
use burned_area_core::Raster;
use serde::Serialize;
use tracing::info;

use crate::error::{CatalogError, Result};
use crate::stac_models::{StacAsset, StacCatalog, StacItem, StacItemProperties, StacLink};

const CATALOG_FILE: &str = "catalog.json";
const GEOTIFF_MEDIA_TYPE: &str = "image/tiff; application=geotiff";
const ASSET_TITLE: &str = "Burned area analysis from Sentinel-2";

/// Paths of a written product
#[derive(Debug, Clone)]
pub struct WrittenProduct {
    pub catalog: PathBuf,
    pub item: PathBuf,
    pub raster: PathBuf,
}

/// Writes burned area products into a catalog rooted at a directory.
#[derive(Debug, Clone)]
pub struct CatalogWriter {
    root: PathBuf,
    options: GeoTiffOptions,
}

impl CatalogWriter {
    pub fn new(root: impl Into<PathBuf>, options: GeoTiffOptions) -> Self {
        Self {
            root: root.into(),
            options,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write the raster, its item and the root catalog.
    ///
    /// The item copies geometry, bbox and datetime from `pre_item`, and
    /// records the thresholds and per-class pixel counts.
    pub fn write(
        &self,
        name: &str,
        raster: &Raster<u8>,
        pre_item: &StacItem,
        params: &BurnedAreaParams,
    ) -> Result<WrittenProduct> {
        let product_dir = self.root.join(name);
        fs::create_dir_all(&product_dir).map_err(|e| CatalogError::io(&product_dir, e))?;

        let raster_path = product_dir.join(format!("{name}.tif"));
        info!("Writing {}", raster_path.display());
        write_geotiff(raster, &raster_path, &self.options)?;

        let item = product_item(name, raster, pre_item, params);
        let item_path = product_dir.join(format!("{name}.json"));
        write_json(&item_path, &item)?;

        let mut catalog = StacCatalog::new("catalog", "Results");
        catalog.links.push(StacLink::json("root", format!("./{CATALOG_FILE}")));
        catalog.links.push(StacLink::json("item", format!("./{name}/{name}.json")));
        let catalog_path = self.root.join(CATALOG_FILE);
        write_json(&catalog_path, &catalog)?;

        Ok(WrittenProduct {
            catalog: catalog_path,
            item: item_path,
            raster: raster_path,
        })
    }
}

fn product_item(name: &str, raster: &Raster<u8>, pre_item: &StacItem, params: &BurnedAreaParams) -> StacItem {
    let counts = ClassCounts::from_raster(raster);

    let mut properties = StacItemProperties {
        datetime: pre_item.properties.datetime.clone(),
        ..Default::default()
    };
    let extra = &mut properties.extra;
    extra.insert("burned_area:ndvi_threshold".into(), params.ndvi_threshold.into());
    extra.insert("burned_area:ndwi_threshold".into(), params.ndwi_threshold.into());
    extra.insert("burned_area:not_burned_pixels".into(), counts.not_burned.into());
    extra.insert("burned_area:burned_pixels".into(), counts.burned.into());
    extra.insert("burned_area:invalid_pixels".into(), counts.invalid.into());
    if let Some(crs) = raster.crs() {
        if let Some(epsg) = crs.epsg() {
            extra.insert("proj:epsg".into(), epsg.into());
        }
    }
    extra.insert("proj:shape".into(), vec![raster.rows(), raster.cols()].into());
    extra.insert("proj:transform".into(), raster.transform().to_gdal().to_vec().into());

    let mut item = StacItem::new(name, properties);
    item.geometry = pre_item.geometry.clone();
    item.bbox = pre_item.bbox.clone();
    item.assets.insert(
        "data".to_string(),
        StacAsset {
            href: format!("./{name}.tif"),
            type_: Some(GEOTIFF_MEDIA_TYPE.to_string()),
            title: Some(ASSET_TITLE.to_string()),
            roles: Some(vec!["data".to_string()]),
            extra: Default::default(),
        },
    );
    item.links.push(StacLink::json("self", format!("./{name}.json")));
    item.links.push(StacLink::json("root", format!("../{CATALOG_FILE}")));
    item.links.push(StacLink::json("parent", format!("../{CATALOG_FILE}")));
    item
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| CatalogError::json(path, e))?;
    fs::write(path, text).map_err(|e| CatalogError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burned_area_core::io::read_geotiff;
    use burned_area_core::{GeoTransform, CRS};
    use tempfile::TempDir;

    fn pre_item() -> StacItem {
        let props = StacItemProperties {
            datetime: Some("2019-12-05T08:42:04Z".to_string()),
            ..Default::default()
        };
        let mut item = StacItem::new("S2B_36RTT_20191205_0_L2A", props);
        item.bbox = Some(vec![31.0, 29.8, 32.1, 30.8]);
        item.geometry = Some(serde_json::json!({"type": "Point", "coordinates": [31.5, 30.3]}));
        item
    }

    fn classified() -> Raster<u8> {
        let mut r = Raster::from_vec(vec![0, 1, 1, 2, 0, 0], 2, 3).unwrap();
        r.set_transform(GeoTransform::new(600000.0, 3400020.0, 10.0, -10.0));
        r.set_crs(Some(CRS::from_epsg(32636)));
        r
    }

    #[test]
    fn writes_self_contained_layout() {
        let dir = TempDir::new().unwrap();
        let writer = CatalogWriter::new(dir.path(), GeoTiffOptions::default());
        let name = "S2_BURNED_AREA_20191205_20191215";

        let product = writer.write(name, &classified(), &pre_item(), &BurnedAreaParams::default()).unwrap();

        assert_eq!(product.catalog, dir.path().join("catalog.json"));
        assert_eq!(product.item, dir.path().join(name).join(format!("{name}.json")));
        assert_eq!(product.raster, dir.path().join(name).join(format!("{name}.tif")));

        let catalog: StacCatalog = serde_json::from_str(&fs::read_to_string(&product.catalog).unwrap()).unwrap();
        assert_eq!(catalog.id, "catalog");
        let links: Vec<_> = catalog.item_links().map(|l| l.href.clone()).collect();
        assert_eq!(links, vec![format!("./{name}/{name}.json")]);
    }

    #[test]
    fn item_carries_pre_event_footprint_and_counts() {
        let dir = TempDir::new().unwrap();
        let writer = CatalogWriter::new(dir.path(), GeoTiffOptions::default());
        let name = "S2_BURNED_AREA_20191205_20191215";

        let product = writer.write(name, &classified(), &pre_item(), &BurnedAreaParams::default()).unwrap();
        let item: StacItem = serde_json::from_str(&fs::read_to_string(&product.item).unwrap()).unwrap();

        assert_eq!(item.id, name);
        assert_eq!(item.bbox, pre_item().bbox);
        assert_eq!(item.geometry, pre_item().geometry);
        assert_eq!(item.properties.datetime.as_deref(), Some("2019-12-05T08:42:04Z"));
        assert_eq!(item.epsg(), Some(32636));
        assert_eq!(item.properties.extra["burned_area:burned_pixels"], 2);
        assert_eq!(item.properties.extra["burned_area:invalid_pixels"], 1);

        let links: Vec<_> = item.links.iter().map(|l| (l.rel.as_str(), l.href.as_str())).collect();
        let self_href = format!("./{name}.json");
        assert_eq!(
            links,
            vec![
                ("self", self_href.as_str()),
                ("root", "../catalog.json"),
                ("parent", "../catalog.json"),
            ]
        );

        let data = item.asset("data").unwrap();
        assert_eq!(data.href, format!("./{name}.tif"));
        assert_eq!(data.title.as_deref(), Some(ASSET_TITLE));
    }

    #[test]
    fn raster_roundtrips_through_catalog() {
        let dir = TempDir::new().unwrap();
        let writer = CatalogWriter::new(dir.path(), GeoTiffOptions::default());
        let raster = classified();

        let product = writer.write("product", &raster, &pre_item(), &BurnedAreaParams::default()).unwrap();
        let loaded: Raster<u8> = read_geotiff(&product.raster, None).unwrap();

        assert_eq!(loaded.data(), raster.data());
        assert_eq!(loaded.transform(), raster.transform());
        assert_eq!(loaded.crs().and_then(CRS::epsg), Some(32636));
    }
}
