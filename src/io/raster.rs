use crate::config::ProductSpec;
use crate::types::{GeoTransform, RasterLayer, ValidationError, ValidationResult};
use gdal::Dataset;
use ndarray::Array2;
use std::path::Path;

/// Classification and confidence layers of the operational product
#[derive(Debug, Clone)]
pub struct OperationalLayers {
    pub classification: RasterLayer,
    pub confidence: RasterLayer,
}

/// Opens ice edge products and their sub-layers through GDAL
pub struct ProductReader;

impl ProductReader {
    /// GDAL connection string for a sub-layer of a NetCDF product
    pub fn layer_path<P: AsRef<Path>>(path: P, layer: Option<&str>) -> String {
        match layer {
            Some(name) => format!("NETCDF:\"{}\":{}", path.as_ref().display(), name),
            None => path.as_ref().display().to_string(),
        }
    }

    /// Read one layer and attach the projection and geotransform from `spec`
    pub fn read_layer<P: AsRef<Path>>(
        path: P,
        layer: Option<&str>,
        spec: &ProductSpec,
    ) -> ValidationResult<RasterLayer> {
        let source = Self::layer_path(path.as_ref(), layer);
        log::info!("Reading raster layer: {}", source);

        let dataset = Dataset::open(Path::new(&source))
            .map_err(|e| ValidationError::Input(format!("Cannot open {}: {}", source, e)))?;

        let (width, height) = dataset.raster_size();
        if width == 0 || height == 0 {
            return Err(ValidationError::Input(format!(
                "Layer {} has invalid dimensions: {}x{}",
                source, width, height
            )));
        }
        log::debug!("Layer size: {}x{}", width, height);

        let geo_transform = match spec.geo_transform {
            Some(gt) => {
                log::debug!("Using configured geotransform: {:?}", gt.to_gdal());
                gt
            }
            None => {
                let gt = dataset.geo_transform().map_err(|e| {
                    ValidationError::Input(format!("Layer {} has no geotransform: {}", source, e))
                })?;
                log::debug!("Layer geotransform: {:?}", gt);
                GeoTransform::from_gdal(gt)
            }
        };

        let rasterband = dataset
            .rasterband(1)
            .map_err(|e| ValidationError::Input(format!("Cannot access band of {}: {}", source, e)))?;
        let nodata = rasterband.no_data_value();
        let band_data = rasterband
            .read_as::<i16>((0, 0), (width, height), (width, height), None)
            .map_err(|e| ValidationError::Input(format!("Cannot read {}: {}", source, e)))?;

        let data = Array2::from_shape_vec((height, width), band_data.data)
            .map_err(|e| ValidationError::Input(format!("Failed to reshape {}: {}", source, e)))?;

        Ok(RasterLayer {
            data,
            projection: spec.projection.clone(),
            geo_transform,
            nodata,
        })
    }

    /// Read the classification layer of the high-resolution reference product
    pub fn read_reference<P: AsRef<Path>>(path: P, spec: &ProductSpec) -> ValidationResult<RasterLayer> {
        Self::read_layer(path, spec.layer.as_deref(), spec)
    }

    /// Read the classification and confidence layers of the operational product
    pub fn read_operational<P: AsRef<Path>>(
        path: P,
        spec: &ProductSpec,
    ) -> ValidationResult<OperationalLayers> {
        let confidence_layer = spec.confidence_layer.as_deref().ok_or_else(|| {
            ValidationError::Config("Operational product needs a confidence layer".to_string())
        })?;

        let classification = Self::read_layer(path.as_ref(), spec.layer.as_deref(), spec)?;
        let confidence = Self::read_layer(path.as_ref(), Some(confidence_layer), spec)?;

        if classification.data.dim() != confidence.data.dim() {
            return Err(ValidationError::Input(format!(
                "Confidence layer shape {:?} differs from classification layer shape {:?}",
                confidence.data.dim(),
                classification.data.dim()
            )));
        }

        Ok(OperationalLayers { classification, confidence })
    }
}
