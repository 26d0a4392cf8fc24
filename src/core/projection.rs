use crate::types::{BoundingWindow, GeoTransform, ValidationError, ValidationResult};
use gdal::spatial_ref::{CoordTransform, SpatialRef};

/// Maps batches of points from one projection into another, in place
pub trait PointTransform {
    fn transform_points(&self, xs: &mut [f64], ys: &mut [f64]) -> ValidationResult<()>;

    fn transform_point(&self, x: f64, y: f64) -> ValidationResult<(f64, f64)> {
        let mut xs = [x];
        let mut ys = [y];
        self.transform_points(&mut xs, &mut ys)?;
        Ok((xs[0], ys[0]))
    }
}

/// Coordinate transformation backed by GDAL/PROJ
pub struct GdalPointTransform {
    transform: CoordTransform,
}

impl GdalPointTransform {
    /// Build a transform between two PROJ.4 definitions
    pub fn from_proj4(source: &str, target: &str) -> ValidationResult<Self> {
        let source_srs = Self::spatial_ref(source)?;
        let target_srs = Self::spatial_ref(target)?;
        let transform = CoordTransform::new(&source_srs, &target_srs).map_err(|e| {
            ValidationError::Projection(format!("Cannot create coordinate transform: {}", e))
        })?;
        Ok(Self { transform })
    }

    fn spatial_ref(proj4: &str) -> ValidationResult<SpatialRef> {
        let mut srs = SpatialRef::from_proj4(proj4).map_err(|e| {
            ValidationError::Projection(format!("Invalid projection '{}': {}", proj4, e))
        })?;
        // Keep easting/northing order regardless of the authority definition
        srs.set_axis_mapping_strategy(
            gdal_sys::OSRAxisMappingStrategy::OAMS_TRADITIONAL_GIS_ORDER,
        );
        Ok(srs)
    }
}

impl PointTransform for GdalPointTransform {
    fn transform_points(&self, xs: &mut [f64], ys: &mut [f64]) -> ValidationResult<()> {
        let mut zs = vec![0.0; xs.len()];
        self.transform
            .transform_coords(xs, ys, &mut zs)
            .map_err(|e| ValidationError::Projection(format!("Point transformation failed: {}", e)))
    }
}

/// Forward (reference -> operational) and inverse transforms for one run
pub struct ProjectionPair {
    pub forward: Box<dyn PointTransform>,
    pub inverse: Box<dyn PointTransform>,
}

impl ProjectionPair {
    pub fn from_proj4(reference: &str, operational: &str) -> ValidationResult<Self> {
        log::debug!("Reference projection: {}", reference);
        log::debug!("Operational projection: {}", operational);
        Ok(Self {
            forward: Box::new(GdalPointTransform::from_proj4(reference, operational)?),
            inverse: Box::new(GdalPointTransform::from_proj4(operational, reference)?),
        })
    }
}

/// Window of the reference raster expressed in the target projection.
///
/// The upper-left corner and the corner one raster size away along the
/// pixel axes are transformed; rotation terms are not used.
pub fn compute_bounding_window(
    geo_transform: &GeoTransform,
    raster_size: (usize, usize),
    transform: &dyn PointTransform,
) -> ValidationResult<BoundingWindow> {
    let (x_size, y_size) = raster_size;

    let (ulx, uly) = transform.transform_point(geo_transform.top_left_x, geo_transform.top_left_y)?;
    let (lrx, lry) = transform.transform_point(
        geo_transform.top_left_x + geo_transform.pixel_width * x_size as f64,
        geo_transform.top_left_y + geo_transform.pixel_height * y_size as f64,
    )?;

    if ![ulx, uly, lrx, lry].iter().all(|v| v.is_finite()) {
        return Err(ValidationError::Projection(format!(
            "Window corners are not finite: ({}, {}) ({}, {})",
            ulx, uly, lrx, lry
        )));
    }

    let window = BoundingWindow { ulx, uly, lrx, lry };
    log::info!("Bounding window in target projection: {:?}", window);
    Ok(window)
}

/// Transforms used by tests and synthetic runs
pub mod synthetic {
    use super::PointTransform;
    use crate::types::ValidationResult;

    /// Leaves coordinates unchanged
    pub struct IdentityTransform;

    impl PointTransform for IdentityTransform {
        fn transform_points(&self, _xs: &mut [f64], _ys: &mut [f64]) -> ValidationResult<()> {
            Ok(())
        }
    }

    /// Adds a constant offset to every point
    pub struct ShiftTransform {
        pub dx: f64,
        pub dy: f64,
    }

    impl PointTransform for ShiftTransform {
        fn transform_points(&self, xs: &mut [f64], ys: &mut [f64]) -> ValidationResult<()> {
            xs.iter_mut().for_each(|x| *x += self.dx);
            ys.iter_mut().for_each(|y| *y += self.dy);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::synthetic::{IdentityTransform, ShiftTransform};
    use super::*;
    use crate::config::{OPERATIONAL_PROJ4, REFERENCE_PROJ4};
    use approx::assert_relative_eq;

    #[test]
    fn test_window_with_shift() {
        let gt = GeoTransform::north_up(1000.0, 5000.0, 100.0);
        let shift = ShiftTransform { dx: 10.0, dy: -20.0 };
        let window = compute_bounding_window(&gt, (30, 20), &shift).unwrap();

        assert_relative_eq!(window.ulx, 1010.0);
        assert_relative_eq!(window.uly, 4980.0);
        assert_relative_eq!(window.lrx, 4010.0);
        assert_relative_eq!(window.lry, 2980.0);
    }

    #[test]
    fn test_window_identity_matches_extent() {
        let gt = GeoTransform::north_up(-50.0, 50.0, 1.0);
        let window = compute_bounding_window(&gt, (100, 100), &IdentityTransform).unwrap();
        assert_eq!(window, BoundingWindow { ulx: -50.0, uly: 50.0, lrx: 50.0, lry: -50.0 });
    }

    #[test]
    fn test_pole_maps_to_origin() {
        let tx = GdalPointTransform::from_proj4(REFERENCE_PROJ4, OPERATIONAL_PROJ4).unwrap();
        let (x, y) = tx.transform_point(0.0, 0.0).unwrap();
        assert!(x.abs() < 1e-6);
        assert!(y.abs() < 1e-6);
    }

    #[test]
    fn test_invalid_projection() {
        let result = GdalPointTransform::from_proj4("+proj=nonsense", OPERATIONAL_PROJ4);
        assert!(matches!(result, Err(ValidationError::Projection(_))));
    }
}
