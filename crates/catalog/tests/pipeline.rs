//! Item files in, catalog out.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use burned_area_algorithms::imagery::{BurnedArea, BurnedAreaInput, BurnedAreaParams, ClassCounts};
use burned_area_catalog::{
    output_name, Acquisition, BandKeys, CatalogWriter, StacAsset, StacCatalog, StacItem, StacItemProperties,
};
use burned_area_core::io::{read_geotiff, write_geotiff, GeoTiffOptions};
use burned_area_core::{Algorithm, GeoTransform, Raster, RasterElement, CRS};
use tempfile::TempDir;

fn grid<T: RasterElement>(values: Vec<T>) -> Raster<T> {
    let mut r = Raster::from_vec(values, 2, 2).unwrap();
    r.set_transform(GeoTransform::new(699960.0, 3300000.0, 10.0, -10.0));
    r.set_crs(Some(CRS::from_epsg(32636)));
    r
}

struct Bands {
    red: Vec<u16>,
    nir: Vec<u16>,
    swir: Vec<u16>,
    scl: Vec<u8>,
}

fn write_acquisition(dir: &Path, id: &str, datetime: &str, bands: Bands) -> PathBuf {
    let acq_dir = dir.join(id);
    fs::create_dir_all(&acq_dir).unwrap();

    write_geotiff(&grid(bands.red), acq_dir.join("B04.tif"), &GeoTiffOptions::default()).unwrap();
    write_geotiff(&grid(bands.nir), acq_dir.join("B08.tif"), &GeoTiffOptions::default()).unwrap();
    write_geotiff(&grid(bands.swir), acq_dir.join("B11.tif"), &GeoTiffOptions::default()).unwrap();
    write_geotiff(&grid(bands.scl), acq_dir.join("SCL.tif"), &GeoTiffOptions::default()).unwrap();

    let props = StacItemProperties {
        datetime: Some(datetime.to_string()),
        platform: Some("sentinel-2b".to_string()),
        ..Default::default()
    };
    let mut item = StacItem::new(id, props);
    item.bbox = Some(vec![32.9, 29.8, 33.0, 29.9]);
    for key in ["B04", "B08", "B11", "SCL"] {
        item.assets.insert(
            key.to_string(),
            StacAsset {
                href: format!("./{key}.tif"),
                type_: Some("image/tiff; application=geotiff".to_string()),
                title: None,
                roles: Some(vec!["data".to_string()]),
                extra: BTreeMap::new(),
            },
        );
    }

    let path = acq_dir.join("item.json");
    fs::write(&path, serde_json::to_string_pretty(&item).unwrap()).unwrap();
    path
}

#[test]
fn detects_and_packages_burned_area() {
    let dir = TempDir::new().unwrap();

    // Flat spectra before the event: NDVI 0, NDWI -1/3.
    let pre_path = write_acquisition(
        dir.path(),
        "S2B_36RTT_20191205_0_L2A",
        "2019-12-05T08:42:04Z",
        Bands {
            red: vec![1500; 4],
            nir: vec![1500; 4],
            swir: vec![3000; 4],
            scl: vec![4; 4],
        },
    );

    // Both indices rise except at (0, 1); (1, 0) is under cloud, (1, 1) is now bare soil.
    let post_path = write_acquisition(
        dir.path(),
        "S2B_36RTT_20191215_0_L2A",
        "2019-12-15T08:42:01Z",
        Bands {
            red: vec![500, 1500, 500, 500],
            nir: vec![3500, 1500, 3500, 3500],
            swir: vec![1000, 3000, 1000, 1000],
            scl: vec![4, 4, 9, 5],
        },
    );

    let keys = BandKeys::default();
    let pre = Acquisition::from_item_file(&pre_path, &keys).unwrap();
    let post = Acquisition::from_item_file(&post_path, &keys).unwrap();

    let params = BurnedAreaParams::default();
    let input = BurnedAreaInput {
        pre: pre.bands.clone(),
        post: post.bands.clone(),
    };
    let result = BurnedArea.execute(input, params.clone()).unwrap();
    assert_eq!(result.data().iter().copied().collect::<Vec<_>>(), vec![1, 0, 2, 1]);

    let name = output_name(&pre.datetime, &post.datetime);
    assert_eq!(name, "S2_BURNED_AREA_20191205_20191215");

    let out_dir = dir.path().join("output");
    let writer = CatalogWriter::new(&out_dir, GeoTiffOptions::default());
    let product = writer.write(&name, &result, &pre.item, &params).unwrap();

    let written: Raster<u8> = read_geotiff(&product.raster, None).unwrap();
    assert_eq!(written.data(), result.data());
    assert_eq!(written.crs().and_then(CRS::epsg), Some(32636));
    assert_eq!(written.transform(), grid(vec![0u8; 4]).transform());
    assert_eq!(
        ClassCounts::from_raster(&written),
        ClassCounts {
            not_burned: 1,
            burned: 2,
            invalid: 1,
        }
    );

    let catalog: StacCatalog = serde_json::from_str(&fs::read_to_string(out_dir.join("catalog.json")).unwrap()).unwrap();
    let item_href = catalog.item_links().next().unwrap().href.clone();
    assert_eq!(item_href, format!("./{name}/{name}.json"));

    let item: StacItem = serde_json::from_str(&fs::read_to_string(out_dir.join(&item_href)).unwrap()).unwrap();
    assert_eq!(item.properties.datetime.as_deref(), Some("2019-12-05T08:42:04Z"));
    assert_eq!(item.bbox, pre.item.bbox);
}
