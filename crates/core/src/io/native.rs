//! Native GeoTIFF reading/writing on top of the `tiff` crate
//!
//! Georeferencing is carried by the GeoTIFF tags:
//! - ModelPixelScaleTag and ModelTiepointTag for north-up transforms
//! - ModelTransformationTag for rotated or south-up transforms
//! - GeoKeyDirectoryTag for the EPSG code, with the WKT (if any) stored as
//!   the GTCitationGeoKey string in GeoAsciiParamsTag
//! - GDAL_NODATA for the no-data value

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement, SampleStorage};
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::{ColorType, Gray16, Gray32Float, Gray8};
use tiff::encoder::compression::{Compression, Deflate, Lzw, Uncompressed};
use tiff::encoder::{TiffEncoder, TiffValue};
use tiff::tags::Tag;

const GEO_ASCII_PARAMS: u16 = 34737;

const GT_MODEL_TYPE_KEY: u16 = 1024;
const GT_RASTER_TYPE_KEY: u16 = 1025;
const GT_CITATION_KEY: u16 = 1026;
const GEOGRAPHIC_TYPE_KEY: u16 = 2048;
const PROJECTED_CS_TYPE_KEY: u16 = 3072;

/// GeoKey value meaning "user-defined"; EPSG codes must sit below it.
const USER_DEFINED: u16 = 32767;

/// Compression applied to written image data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressionMethod {
    None,
    #[default]
    Deflate,
    Lzw,
}

/// Options for writing GeoTIFF files
#[derive(Debug, Clone, Default)]
pub struct GeoTiffOptions {
    pub compression: CompressionMethod,
}

impl GeoTiffOptions {
    pub fn with_compression(compression: CompressionMethod) -> Self {
        Self { compression }
    }
}

/// Read one band of a GeoTIFF file into a Raster
///
/// `band` is 1-indexed and picks a sample from pixel-interleaved
/// multi-sample images; `None` reads the first sample. A sample that does
/// not fit `T` is an error, never a silent substitution.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode_geotiff(file, band)
}

/// Read one band of an in-memory GeoTIFF into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

/// Pick `band` out of the interleaved samples and convert it to `T`.
fn band_samples<S, T>(buf: Vec<S>, rows: usize, cols: usize, band: Option<usize>) -> Result<Vec<T>>
where
    S: num_traits::NumCast + Copy + Debug,
    T: RasterElement,
{
    let cells = rows * cols;
    if cells == 0 || buf.len() % cells != 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let per_pixel = buf.len() / cells;
    let band = band.unwrap_or(1);
    if band == 0 || band > per_pixel {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("image has {} band(s)", per_pixel),
        });
    }

    buf.into_iter()
        .skip(band - 1)
        .step_by(per_pixel)
        .enumerate()
        .map(|(i, v)| {
            num_traits::cast(v).ok_or_else(|| Error::SampleOutOfRange {
                value: format!("{:?}", v),
                target: std::any::type_name::<T>(),
                row: i / cols,
                col: i % cols,
            })
        })
        .collect()
}

fn decode_geotiff<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let data: Vec<T> = match decoder.read_image()? {
        DecodingResult::U8(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::U16(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::U32(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::I8(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::I16(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::I32(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::F32(buf) => band_samples(buf, rows, cols, band)?,
        DecodingResult::F64(buf) => band_samples(buf, rows, cols, band)?,
        _ => return Err(Error::UnsupportedDataType("Unsupported TIFF pixel format".to_string())),
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;

    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    raster.set_crs(read_crs(&mut decoder));
    if let Some(nodata) = read_nodata(&mut decoder) {
        raster.set_nodata(num_traits::cast(nodata));
    }

    Ok(raster)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    // Row-major 4x4 matrix: x = m0*col + m1*row + m3, y = m4*col + m5*row + m7
    if let Ok(m) = decoder.get_tag_f64_vec(Tag::ModelTransformationTag) {
        if m.len() >= 8 {
            return Some(GeoTransform::from_gdal([m[3], m[0], m[1], m[7], m[4], m[5]]));
        }
    }

    let scale = decoder.get_tag_f64_vec(Tag::ModelPixelScaleTag).ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::ModelTiepointTag).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z], scale: [ScaleX, ScaleY, ScaleZ]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

fn read_crs<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<CRS> {
    let keys = decoder.get_tag_u16_vec(Tag::GeoKeyDirectoryTag).ok()?;
    if keys.len() < 4 {
        return None;
    }

    // Header [version, revision, minor, count], then [id, location, count, value] per key.
    let mut epsg = None;
    let mut citation = None;
    for key in keys[4..].chunks_exact(4).take(keys[3] as usize) {
        match (key[0], key[1]) {
            (PROJECTED_CS_TYPE_KEY | GEOGRAPHIC_TYPE_KEY, 0) if key[3] > 0 && key[3] < USER_DEFINED => {
                epsg = Some(u32::from(key[3]));
            }
            (GT_CITATION_KEY, GEO_ASCII_PARAMS) => {
                citation = Some((key[3] as usize, key[2] as usize));
            }
            _ => {}
        }
    }

    // Plain-name citations are common; only bracketed text is taken as WKT.
    let wkt = citation.and_then(|(offset, count)| {
        let ascii = decoder.get_tag_ascii_string(Tag::GeoAsciiParamsTag).ok()?;
        let end = (offset + count).min(ascii.len());
        let text = ascii.get(offset..end)?.trim_end_matches(['|', '\0']);
        text.contains('[').then(|| text.to_string())
    });

    match (wkt, epsg) {
        (Some(wkt), Some(code)) => Some(CRS::from_wkt(wkt).with_epsg(code)),
        (Some(wkt), None) => Some(CRS::from_wkt(wkt)),
        (None, Some(code)) => Some(CRS::from_epsg(code)),
        (None, None) => None,
    }
}

fn read_nodata<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f64> {
    let text = decoder.get_tag_ascii_string(Tag::GdalNodata).ok()?;
    text.trim_end_matches('\0').trim().parse().ok()
}

/// Write a Raster to a GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let mut file = BufWriter::new(File::create(path.as_ref())?);
    encode_geotiff(raster, &mut file, options)?;
    file.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>, options: &GeoTiffOptions) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf), options)?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W, options: &GeoTiffOptions) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    // Fail before anything is written when the CRS has no GeoTIFF encoding.
    let geokeys = GeoKeys::for_crs(raster.crs())?;
    let mut encoder = TiffEncoder::new(writer)?;

    match T::storage() {
        SampleStorage::Byte => {
            let data: Vec<u8> = raster.data().iter().map(|&v| num_traits::cast(v).unwrap_or(0)).collect();
            write_with_compression::<_, Gray8, _>(&mut encoder, raster, &geokeys, &data, options.compression)
        }
        SampleStorage::UInt16 => {
            let data: Vec<u16> = raster.data().iter().map(|&v| num_traits::cast(v).unwrap_or(0)).collect();
            write_with_compression::<_, Gray16, _>(&mut encoder, raster, &geokeys, &data, options.compression)
        }
        SampleStorage::Float32 => {
            let data: Vec<f32> = raster
                .data()
                .iter()
                .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
                .collect();
            write_with_compression::<_, Gray32Float, _>(&mut encoder, raster, &geokeys, &data, options.compression)
        }
    }
}

fn write_with_compression<W, C, T>(
    encoder: &mut TiffEncoder<W>,
    raster: &Raster<T>,
    geokeys: &GeoKeys,
    data: &[C::Inner],
    compression: CompressionMethod,
) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    T: RasterElement,
    [C::Inner]: TiffValue,
{
    match compression {
        CompressionMethod::None => write_image::<_, C, _, _>(encoder, raster, geokeys, data, Uncompressed),
        CompressionMethod::Deflate => {
            write_image::<_, C, _, _>(encoder, raster, geokeys, data, Deflate::default())
        }
        CompressionMethod::Lzw => write_image::<_, C, _, _>(encoder, raster, geokeys, data, Lzw::default()),
    }
}

fn write_image<W, C, D, T>(
    encoder: &mut TiffEncoder<W>,
    raster: &Raster<T>,
    geokeys: &GeoKeys,
    data: &[C::Inner],
    compression: D,
) -> Result<()>
where
    W: Write + Seek,
    C: ColorType,
    D: Compression,
    T: RasterElement,
    [C::Inner]: TiffValue,
{
    let (rows, cols) = raster.shape();
    let mut image = encoder.new_image_with_compression::<C, D>(cols as u32, rows as u32, compression)?;
    let gt = raster.transform();

    if gt.is_north_up() {
        let scale = [gt.pixel_width, -gt.pixel_height, 0.0];
        image.encoder().write_tag(Tag::ModelPixelScaleTag, &scale[..])?;

        let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
        image.encoder().write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    } else {
        let matrix = [
            gt.pixel_width, gt.row_rotation, 0.0, gt.origin_x,
            gt.col_rotation, gt.pixel_height, 0.0, gt.origin_y,
            0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        ];
        image.encoder().write_tag(Tag::ModelTransformationTag, &matrix[..])?;
    }

    image.encoder().write_tag(Tag::GeoKeyDirectoryTag, &geokeys.directory[..])?;
    if let Some(ascii) = &geokeys.ascii {
        image.encoder().write_tag(Tag::GeoAsciiParamsTag, ascii.as_str())?;
    }

    if let Some(nodata) = raster.nodata().and_then(|v| v.to_f64()) {
        if !nodata.is_nan() {
            let text = nodata.to_string();
            image.encoder().write_tag(Tag::GdalNodata, text.as_str())?;
        }
    }

    image.write_data(data)?;
    Ok(())
}

/// Encoded GeoKeyDirectory plus the GeoAsciiParams string it points into.
struct GeoKeys {
    directory: Vec<u16>,
    ascii: Option<String>,
}

impl GeoKeys {
    /// Model type and raster type always; then the WKT citation and the
    /// EPSG key when present. Keys stay sorted by id.
    fn for_crs(crs: Option<&CRS>) -> Result<Self> {
        let epsg = crs
            .and_then(CRS::epsg)
            .and_then(|code| u16::try_from(code).ok())
            .filter(|&code| code > 0 && code < USER_DEFINED);
        let wkt = crs
            .and_then(CRS::wkt)
            .filter(|wkt| wkt.is_ascii() && wkt.len() < usize::from(u16::MAX));

        if let Some(crs) = crs {
            if epsg.is_none() && wkt.is_none() {
                return Err(Error::InvalidParameter {
                    name: "crs",
                    value: crs.to_string(),
                    reason: "no EPSG code in the GeoKey range and no storable WKT".to_string(),
                });
            }
        }

        let geographic = crs.is_some_and(CRS::is_geographic);

        // GTModelTypeGeoKey: 1 = projected, 2 = geographic
        let mut directory = vec![
            1, 1, 0, 2,
            GT_MODEL_TYPE_KEY, 0, 1, if geographic { 2 } else { 1 },
            GT_RASTER_TYPE_KEY, 0, 1, 1,
        ];

        let ascii = wkt.map(|wkt| {
            let count = wkt.len() as u16 + 1;
            directory.extend_from_slice(&[GT_CITATION_KEY, GEO_ASCII_PARAMS, count, 0]);
            format!("{}|", wkt)
        });

        if let Some(code) = epsg {
            let key = if geographic { GEOGRAPHIC_TYPE_KEY } else { PROJECTED_CS_TYPE_KEY };
            directory.extend_from_slice(&[key, 0, 1, code]);
        }

        directory[3] = ((directory.len() - 4) / 4) as u16;
        Ok(Self { directory, ascii })
    }
}
