//! Run configuration for the comparison pipeline

use crate::core::aggregate::AggregationParams;
use crate::types::{GeoTransform, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Polar stereographic projection of the high-resolution reference product
pub const REFERENCE_PROJ4: &str =
    "+proj=stere +a=6371000.0 +b=6371000.0 +lat_0=-90.0 +lat_ts=-90.0 +lon_0=0.0";

/// Polar stereographic projection of the operational product
pub const OPERATIONAL_PROJ4: &str = "+proj=stere +lat_0=-90 +lat_ts=-70 +lon_0=0 +k=1 +x_0=0 +y_0=0 +a=6378273 +b=6356889.44891 +units=m +no_defs";

/// Geotransform of the operational 10 km grid, absent from its files
pub const OPERATIONAL_GEO_TRANSFORM: [f64; 6] =
    [-3950000.0, 10000.0, 0.0, 4350000.0, 0.0, -10000.0];

/// How to open one product and which georeferencing to attach to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSpec {
    /// Classification sub-layer name (`None` reads band 1 of a plain raster)
    pub layer: Option<String>,
    /// Confidence sub-layer name, operational product only
    #[serde(default)]
    pub confidence_layer: Option<String>,
    /// PROJ.4 definition of the product's projection
    pub projection: String,
    /// Overrides the geotransform stored in the file
    #[serde(default)]
    pub geo_transform: Option<GeoTransform>,
}

impl ProductSpec {
    pub fn reference() -> Self {
        Self {
            layer: Some("ice_edge".to_string()),
            confidence_layer: None,
            projection: REFERENCE_PROJ4.to_string(),
            geo_transform: None,
        }
    }

    pub fn operational() -> Self {
        Self {
            layer: Some("ice_edge".to_string()),
            confidence_layer: Some("confidence_level".to_string()),
            projection: OPERATIONAL_PROJ4.to_string(),
            geo_transform: Some(GeoTransform::from_gdal(OPERATIONAL_GEO_TRANSFORM)),
        }
    }
}

/// Complete configuration for one comparison run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    pub reference: ProductSpec,
    pub operational: ProductSpec,
    /// Pixel spacing of the reprojected reference grid, in target units
    pub reprojection_spacing: f64,
    pub aggregation: AggregationParams,
    /// When set, intermediate grids are written here as GeoTIFF
    #[serde(default)]
    pub debug_output_dir: Option<PathBuf>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            reference: ProductSpec::reference(),
            operational: ProductSpec::operational(),
            reprojection_spacing: 1000.0,
            aggregation: AggregationParams::default(),
            debug_output_dir: None,
        }
    }
}

impl ValidationConfig {
    /// Load a configuration from a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ValidationResult<Self> {
        log::info!("Loading validation config from: {}", path.as_ref().display());
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if !(self.reprojection_spacing > 0.0) {
            return Err(ValidationError::Config(format!(
                "Reprojection spacing must be positive, got {}",
                self.reprojection_spacing
            )));
        }
        if self.operational.confidence_layer.is_none() {
            return Err(ValidationError::Config(
                "Operational product needs a confidence layer".to_string(),
            ));
        }
        self.aggregation.validate()
    }
}
