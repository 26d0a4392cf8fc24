use crate::types::{GeoTransform, ValidationResult};
use gdal::spatial_ref::SpatialRef;
use gdal::DriverManager;
use ndarray::Array2;
use std::path::Path;

/// Writes intermediate grids as single-band Float32 GeoTIFFs
pub struct GridWriter {
    geo_transform: GeoTransform,
    projection: String,
}

impl GridWriter {
    /// Writer for grids aligned with `geo_transform` in the given PROJ.4 projection
    pub fn new(geo_transform: GeoTransform, projection: impl Into<String>) -> Self {
        Self {
            geo_transform,
            projection: projection.into(),
        }
    }

    /// Write any numeric or boolean grid, converted to f32
    pub fn write<T, P>(&self, grid: &Array2<T>, output_path: P) -> ValidationResult<()>
    where
        T: Copy + Into<GridValue>,
        P: AsRef<Path>,
    {
        log::debug!("Writing grid {:?} to {}", grid.dim(), output_path.as_ref().display());

        let driver = DriverManager::get_driver_by_name("GTiff")?;
        let (height, width) = grid.dim();

        let mut dataset = driver.create_with_band_type::<f32, _>(
            output_path.as_ref(),
            width as isize,
            height as isize,
            1,
        )?;

        dataset.set_geo_transform(&self.geo_transform.to_gdal())?;
        let srs = SpatialRef::from_proj4(&self.projection)?;
        dataset.set_spatial_ref(&srs)?;

        let mut rasterband = dataset.rasterband(1)?;
        let flat_data: Vec<f32> = grid.iter().map(|v| Into::<GridValue>::into(*v).0).collect();
        let buffer = gdal::raster::Buffer::new((width, height), flat_data);
        rasterband.write((0, 0), (width, height), &buffer)?;

        Ok(())
    }
}

/// A grid cell value as stored in the GeoTIFF
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridValue(pub f32);

impl From<i16> for GridValue {
    fn from(v: i16) -> Self {
        GridValue(v as f32)
    }
}

impl From<bool> for GridValue {
    fn from(v: bool) -> Self {
        GridValue(if v { 1.0 } else { 0.0 })
    }
}

impl From<f32> for GridValue {
    fn from(v: f32) -> Self {
        GridValue(v)
    }
}
