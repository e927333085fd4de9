//! Main Raster type

use crate::crs::CRS;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement};
use ndarray::Array2;

/// A georeferenced 2D raster grid.
///
/// Values are stored row-major as `(row, col)` together with the affine
/// transform, the spatial reference and an optional no-data value.
///
/// # Example
///
/// ```ignore
/// use burned_area_core::Raster;
///
/// let mut scl: Raster<u8> = Raster::filled(10980, 10980, 4);
/// scl.set(0, 0, 9)?;
/// ```
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    data: Array2<T>,
    transform: GeoTransform,
    crs: Option<CRS>,
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a new raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::from_array(Array2::zeros((rows, cols)))
    }

    /// Create a new raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self::from_array(Array2::from_elem((rows, cols), value))
    }

    /// Create a raster from row-major data
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)?;
        Ok(Self::from_array(array))
    }

    /// Create a raster from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self {
            data,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Zeroed raster of another cell type carrying this raster's transform and CRS
    pub fn with_same_meta<U: RasterElement>(&self, rows: usize, cols: usize) -> Raster<U> {
        Raster {
            data: Array2::zeros((rows, cols)),
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: None,
        }
    }

    // Dimensions

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the raster is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    /// Get the geotransform
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Set the geotransform
    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    /// Get the CRS
    pub fn crs(&self) -> Option<&CRS> {
        self.crs.as_ref()
    }

    /// Set the CRS
    pub fn set_crs(&mut self, crs: Option<CRS>) {
        self.crs = crs;
    }

    /// Get the no-data value
    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    /// Set the no-data value
    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    /// Cell size (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Geographic bounds (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        self.transform.bounds(self.cols(), self.rows())
    }

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Fail unless `other` lies on exactly the same grid as `self`.
    ///
    /// Same grid means identical shape, bit-identical geotransform, and
    /// equivalent CRS (or no CRS on either side). `name` labels `other`
    /// in the error.
    pub fn ensure_same_grid<U: RasterElement>(&self, other: &Raster<U>, name: &str) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(Error::SizeMismatch {
                name: name.to_string(),
                er: self.rows(),
                ec: self.cols(),
                ar: other.rows(),
                ac: other.cols(),
            });
        }

        if self.transform != other.transform {
            return Err(Error::TransformMismatch {
                name: name.to_string(),
                expected: self.transform.to_gdal(),
                actual: other.transform.to_gdal(),
            });
        }

        let same_crs = match (&self.crs, &other.crs) {
            (None, None) => true,
            (Some(a), Some(b)) => a.is_equivalent(b),
            _ => false,
        };
        if !same_crs {
            let describe = |c: Option<&CRS>| c.map_or_else(|| "none".to_string(), CRS::identifier);
            return Err(Error::CrsMismatch {
                name: name.to_string(),
                expected: describe(self.crs()),
                actual: describe(other.crs()),
            });
        }

        Ok(())
    }

    /// Basic statistics over valid cells
    pub fn statistics(&self) -> RasterStatistics<T> {
        let mut min: Option<T> = None;
        let mut max: Option<T> = None;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter().filter(|v| !self.is_nodata(**v)) {
            if min.map_or(true, |m| value < m) {
                min = Some(value);
            }
            if max.map_or(true, |m| value > m) {
                max = Some(value);
            }
            if let Some(v) = value.to_f64() {
                sum += v;
                count += 1;
            }
        }

        RasterStatistics {
            min,
            max,
            mean: (count > 0).then(|| sum / count as f64),
            valid_count: count,
            nodata_count: self.len() - count,
        }
    }
}

impl Raster<u8> {
    /// Number of cells holding each of the 256 possible byte values
    pub fn value_counts(&self) -> [usize; 256] {
        let mut counts = [0usize; 256];
        for &v in self.data.iter() {
            counts[v as usize] += 1;
        }
        counts
    }
}

/// Basic statistics for a raster
#[derive(Debug, Clone)]
pub struct RasterStatistics<T> {
    pub min: Option<T>,
    pub max: Option<T>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    pub nodata_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_grid<T: RasterElement>(mut r: Raster<T>) -> Raster<T> {
        r.set_transform(GeoTransform::new(600000.0, 3400020.0, 10.0, -10.0));
        r.set_crs(Some(CRS::from_epsg(32636)));
        r
    }

    #[test]
    fn test_raster_creation() {
        let raster: Raster<f32> = Raster::new(100, 200);
        assert_eq!(raster.rows(), 100);
        assert_eq!(raster.cols(), 200);
        assert_eq!(raster.shape(), (100, 200));
    }

    #[test]
    fn test_from_vec_rejects_wrong_length() {
        let result = Raster::<u16>::from_vec(vec![0; 5], 2, 3);
        assert!(matches!(result, Err(Error::InvalidDimensions { width: 3, height: 2 })));
    }

    #[test]
    fn test_raster_access() {
        let mut raster: Raster<u8> = Raster::new(10, 10);
        raster.set(5, 5, 4).unwrap();
        assert_eq!(raster.get(5, 5).unwrap(), 4);
        assert!(raster.get(10, 0).is_err());
        assert!(raster.set(0, 10, 1).is_err());
    }

    #[test]
    fn test_with_same_meta_keeps_georeference() {
        let src = on_grid(Raster::<f64>::filled(3, 4, 0.5));
        let out: Raster<u8> = src.with_same_meta(3, 4);
        assert_eq!(out.transform(), src.transform());
        assert_eq!(out.crs(), src.crs());
        assert_eq!(out.get(2, 3).unwrap(), 0);
    }

    #[test]
    fn test_same_grid_accepts_different_cell_types() {
        let a = on_grid(Raster::<f64>::new(4, 4));
        let b = on_grid(Raster::<u8>::new(4, 4));
        assert!(a.ensure_same_grid(&b, "b").is_ok());
    }

    #[test]
    fn test_same_grid_rejects_shape() {
        let a = on_grid(Raster::<f64>::new(4, 4));
        let b = on_grid(Raster::<f64>::new(4, 5));
        assert!(matches!(a.ensure_same_grid(&b, "b"), Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn test_same_grid_rejects_transform() {
        let a = on_grid(Raster::<f64>::new(4, 4));
        let mut b = on_grid(Raster::<f64>::new(4, 4));
        b.set_transform(GeoTransform::new(600010.0, 3400020.0, 10.0, -10.0));
        assert!(matches!(a.ensure_same_grid(&b, "b"), Err(Error::TransformMismatch { .. })));
    }

    #[test]
    fn test_same_grid_rejects_crs() {
        let a = on_grid(Raster::<f64>::new(4, 4));
        let mut b = on_grid(Raster::<f64>::new(4, 4));
        b.set_crs(Some(CRS::from_epsg(32635)));
        assert!(matches!(a.ensure_same_grid(&b, "b"), Err(Error::CrsMismatch { .. })));

        b.set_crs(None);
        assert!(matches!(a.ensure_same_grid(&b, "b"), Err(Error::CrsMismatch { .. })));
    }

    #[test]
    fn test_raster_statistics() {
        let data: Vec<f32> = (0..100).map(|v| v as f32).collect();
        let mut raster = Raster::from_vec(data, 10, 10).unwrap();
        raster.set(0, 1, f32::NAN).unwrap();

        let stats = raster.statistics();
        assert_eq!(stats.min, Some(0.0));
        assert_eq!(stats.max, Some(99.0));
        assert_eq!(stats.valid_count, 99);
        assert_eq!(stats.nodata_count, 1);
    }

    #[test]
    fn test_value_counts() {
        let raster = Raster::from_vec(vec![0u8, 1, 1, 2, 2, 2], 2, 3).unwrap();
        let counts = raster.value_counts();
        assert_eq!(&counts[..3], &[1, 2, 3]);
        assert_eq!(counts.iter().sum::<usize>(), 6);
    }
}
