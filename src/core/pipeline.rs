use crate::config::ValidationConfig;
use crate::core::agreement::{calculate_stratified_agreement, AgreementStats, CONFIDENCE_LEVELS};
use crate::core::aggregate::Aggregator;
use crate::core::crop::{crop_to_window, CropKind};
use crate::core::distance::distance_transform;
use crate::core::edge::find_edge;
use crate::core::mask::{generate_mask, generate_nodata_mask};
use crate::core::mean_distance::extract_mean_distance;
use crate::core::projection::{compute_bounding_window, PointTransform, ProjectionPair};
use crate::core::reproject::Reprojector;
use crate::io::naming::reference_date;
use crate::io::{GridWriter, ProductReader};
use crate::types::{
    BoolGrid, BoundingWindow, ClassGrid, DistanceGrid, GeoTransform, RasterLayer,
    ValidationResult,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

/// Statistics from one comparison run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsBundle {
    pub reference_file: Option<String>,
    pub operational_file: Option<String>,
    pub reference_date: Option<NaiveDate>,
    /// Agreement over every jointly valid cell
    pub agreement: AgreementStats,
    /// Mean distance in operational grid cells from the operational edge
    /// to the reference edge
    pub average_pixel_dist: f64,
    /// Agreement restricted to each operational confidence level
    pub confidence: [AgreementStats; CONFIDENCE_LEVELS],
}

impl StatsBundle {
    /// Flat key/value view; undefined rates map to `null`
    pub fn to_flat_map(&self) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        let table = &self.agreement.table;
        map.insert("water_water".to_string(), Value::from(table.water_water));
        map.insert("ice_ice".to_string(), Value::from(table.ice_ice));
        map.insert("water_ice".to_string(), Value::from(table.water_ice));
        map.insert("ice_water".to_string(), Value::from(table.ice_water));
        map.insert("relevant".to_string(), Value::from(self.agreement.relevant));
        map.insert("agree".to_string(), rate_value(self.agreement.agree));
        map.insert("osi_over".to_string(), rate_value(self.agreement.osi_over));
        map.insert("osi_under".to_string(), rate_value(self.agreement.osi_under));
        map.insert("average_pixel_dist".to_string(), Value::from(self.average_pixel_dist));
        for (level, stats) in self.confidence.iter().enumerate() {
            map.insert(format!("agreeConf{}", level), rate_value(stats.agree));
        }
        map
    }

    /// The flat mapping as a JSON object string
    pub fn to_json(&self) -> ValidationResult<String> {
        let object: Map<String, Value> = self.to_flat_map().into_iter().collect();
        Ok(serde_json::to_string_pretty(&Value::Object(object))?)
    }
}

fn rate_value(rate: Option<f64>) -> Value {
    rate.map(Value::from).unwrap_or(Value::Null)
}

/// Every intermediate grid of a comparison run, on the operational grid
#[derive(Debug, Clone)]
pub struct ComparisonProducts {
    pub window: BoundingWindow,
    pub operational: ClassGrid,
    pub confidence: ClassGrid,
    pub reprojected: ClassGrid,
    pub reference: ClassGrid,
    pub mask: BoolGrid,
    pub nodata_mask: BoolGrid,
    pub operational_edge: BoolGrid,
    pub reference_edge: BoolGrid,
    pub reference_edge_distance: DistanceGrid,
    pub nodata_distance: DistanceGrid,
}

/// Runs the full comparison of a reference product against an operational product
pub struct EdgeValidator {
    config: ValidationConfig,
}

impl EdgeValidator {
    pub fn new(config: ValidationConfig) -> ValidationResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Validator with the standard product definitions
    pub fn standard() -> Self {
        Self {
            config: ValidationConfig::default(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Open both products and compare them
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        reference_path: P,
        operational_path: Q,
    ) -> ValidationResult<StatsBundle> {
        log::info!(
            "Validating {} against {}",
            operational_path.as_ref().display(),
            reference_path.as_ref().display()
        );

        let reference = ProductReader::read_reference(reference_path.as_ref(), &self.config.reference)?;
        let operational = ProductReader::read_operational(operational_path.as_ref(), &self.config.operational)?;
        let projections = ProjectionPair::from_proj4(&reference.projection, &operational.classification.projection)?;

        let (products, mut bundle) = self.compare_layers(
            &reference,
            &operational.classification,
            &operational.confidence,
            projections.forward.as_ref(),
            projections.inverse.as_ref(),
        )?;

        bundle.reference_file = file_name(reference_path.as_ref());
        bundle.operational_file = file_name(operational_path.as_ref());
        bundle.reference_date = reference_date(reference_path.as_ref());

        if let Some(dir) = &self.config.debug_output_dir {
            self.write_products(&products, &operational.classification, dir)?;
        }

        log::info!("Validation run complete");
        Ok(bundle)
    }

    /// Compare already loaded layers.
    ///
    /// `forward` maps reference coordinates into the operational projection
    /// and `inverse` maps them back.
    pub fn compare_layers(
        &self,
        reference: &RasterLayer,
        operational: &RasterLayer,
        confidence: &RasterLayer,
        forward: &dyn PointTransform,
        inverse: &dyn PointTransform,
    ) -> ValidationResult<(ComparisonProducts, StatsBundle)> {
        log::info!("Step 1: Computing bounding window");
        let window = compute_bounding_window(&reference.geo_transform, reference.raster_size(), forward)?;

        log::info!("Step 2: Cropping operational layers");
        let operational_crop = crop_to_window(operational, &window, CropKind::Classification)?;
        let confidence_crop = crop_to_window(confidence, &window, CropKind::Confidence)?;

        let aggregator = Aggregator::new(self.config.aggregation.clone())?;
        aggregator.validate_resolution_ratio(
            self.config.reprojection_spacing,
            operational.geo_transform.pixel_width,
        )?;

        log::info!("Step 3: Reprojecting reference product");
        let reprojector = Reprojector::new(self.config.reprojection_spacing);
        let reprojected = reprojector.reproject(reference, &window, inverse)?;

        log::info!("Step 4: Aggregating reference product to the operational grid");
        let aggregated = aggregator.aggregate(&reprojected, operational_crop.dim())?;

        log::info!("Step 5: Building masks");
        let nodata_mask = generate_nodata_mask(&aggregated);
        let mask = generate_mask(&aggregated, &operational_crop)?;

        log::info!("Step 6: Detecting ice edges");
        let operational_edge = find_edge(&operational_crop);
        let reference_edge = find_edge(&aggregated);

        log::info!("Step 7: Measuring edge distances");
        let reference_edge_distance = distance_transform(&reference_edge);
        let nodata_distance = distance_transform(&nodata_mask);
        let average_pixel_dist =
            extract_mean_distance(&operational_edge, &reference_edge_distance, &nodata_distance, &mask)?;

        log::info!("Step 8: Calculating agreement");
        let stratified = calculate_stratified_agreement(&aggregated, &operational_crop, &mask, &confidence_crop)?;

        let bundle = StatsBundle {
            reference_file: None,
            operational_file: None,
            reference_date: None,
            agreement: stratified.all,
            average_pixel_dist,
            confidence: stratified.levels,
        };

        let products = ComparisonProducts {
            window,
            operational: operational_crop,
            confidence: confidence_crop,
            reprojected,
            reference: aggregated,
            mask,
            nodata_mask,
            operational_edge,
            reference_edge,
            reference_edge_distance,
            nodata_distance,
        };

        Ok((products, bundle))
    }

    /// Write the operational-grid intermediates as GeoTIFFs into `dir`
    pub fn write_products<P: AsRef<Path>>(
        &self,
        products: &ComparisonProducts,
        operational: &RasterLayer,
        dir: P,
    ) -> ValidationResult<()> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;
        log::info!("Writing intermediate grids to {}", dir.display());

        let grid_transform = GeoTransform::north_up(
            products.window.ulx,
            products.window.uly,
            operational.geo_transform.pixel_width,
        );
        let writer = GridWriter::new(grid_transform, operational.projection.clone());

        writer.write(&products.reference, dir.join("reference_aggregated.tif"))?;
        writer.write(&products.operational, dir.join("operational_crop.tif"))?;
        writer.write(&products.mask, dir.join("mask.tif"))?;
        writer.write(&products.reference_edge, dir.join("reference_edge.tif"))?;
        writer.write(&products.operational_edge, dir.join("operational_edge.tif"))?;
        writer.write(&products.reference_edge_distance, dir.join("reference_edge_distance.tif"))?;
        writer.write(&products.nodata_distance, dir.join("nodata_distance.tif"))?;
        Ok(())
    }
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}
