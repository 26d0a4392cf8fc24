use crate::core::projection::PointTransform;
use crate::types::{
    BoundingWindow, ClassCode, ClassGrid, GeoTransform, RasterLayer, ValidationError,
    ValidationResult,
};
use ndarray::Array2;

/// Nearest-neighbour reprojection of a classified raster onto a regular grid
/// anchored at a bounding window.
pub struct Reprojector {
    /// Output pixel spacing in target projection units
    pixel_spacing: f64,
}

impl Reprojector {
    pub fn new(pixel_spacing: f64) -> Self {
        Self { pixel_spacing }
    }

    /// Output grid size (rows, cols); partial pixels at the far edges are dropped
    pub fn output_shape(&self, window: &BoundingWindow) -> ValidationResult<(usize, usize)> {
        if !(self.pixel_spacing > 0.0) {
            return Err(ValidationError::Config(format!(
                "Reprojection pixel spacing must be positive, got {}",
                self.pixel_spacing
            )));
        }

        let cols = (window.width() / self.pixel_spacing).floor();
        let rows = (window.height() / self.pixel_spacing).floor();
        if !(cols >= 1.0 && rows >= 1.0) {
            return Err(ValidationError::Bounds(format!(
                "Window {:?} is smaller than one {} unit pixel",
                window, self.pixel_spacing
            )));
        }
        Ok((rows as usize, cols as usize))
    }

    /// Geotransform of the reprojected grid
    pub fn output_transform(&self, window: &BoundingWindow) -> GeoTransform {
        GeoTransform::north_up(window.ulx, window.uly, self.pixel_spacing)
    }

    /// Reproject `source` into the target grid.
    ///
    /// `inverse` maps target projection coordinates back into the source
    /// projection. Each output cell centre takes the class of the source
    /// pixel containing it, or no-data outside the source.
    pub fn reproject(
        &self,
        source: &RasterLayer,
        window: &BoundingWindow,
        inverse: &dyn PointTransform,
    ) -> ValidationResult<ClassGrid> {
        let (rows, cols) = self.output_shape(window)?;
        let target_gt = self.output_transform(window);
        let (src_rows, src_cols) = source.data.dim();

        log::info!(
            "Reprojecting {}x{} source onto {}x{} grid at {} unit spacing",
            src_rows, src_cols, rows, cols, self.pixel_spacing
        );

        let mut output = Array2::from_elem((rows, cols), ClassCode::NoData.code());
        let mut xs = vec![0.0; cols];
        let mut ys = vec![0.0; cols];
        let mut sampled = 0usize;

        for row in 0..rows {
            for col in 0..cols {
                let (x, y) = target_gt.pixel_to_geo(col as f64 + 0.5, row as f64 + 0.5);
                xs[col] = x;
                ys[col] = y;
            }
            inverse.transform_points(&mut xs, &mut ys)?;

            for col in 0..cols {
                let (src_col, src_row) = source.geo_transform.geo_to_pixel(xs[col], ys[col])?;
                if !(src_col.is_finite() && src_row.is_finite()) {
                    continue;
                }
                let (src_col, src_row) = (src_col.floor(), src_row.floor());
                if src_col < 0.0 || src_row < 0.0 {
                    continue;
                }
                let (src_col, src_row) = (src_col as usize, src_row as usize);
                if src_col < src_cols && src_row < src_rows {
                    output[[row, col]] = source.data[[src_row, src_col]];
                    sampled += 1;
                }
            }
        }

        log::debug!("Sampled {} of {} output cells from the source", sampled, rows * cols);
        Ok(output)
    }
}

impl Default for Reprojector {
    fn default() -> Self {
        Self::new(1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::projection::synthetic::{IdentityTransform, ShiftTransform};

    fn source() -> RasterLayer {
        // 4x4 source at 100 unit spacing: value = row * 4 + col
        let data = Array2::from_shape_fn((4, 4), |(r, c)| (r * 4 + c) as i16);
        RasterLayer::new(data, "", GeoTransform::north_up(0.0, 400.0, 100.0))
    }

    #[test]
    fn test_output_shape_truncates() {
        let reprojector = Reprojector::new(1000.0);
        let window = BoundingWindow { ulx: 0.0, uly: 5500.0, lrx: 10999.0, lry: 0.0 };
        assert_eq!(reprojector.output_shape(&window).unwrap(), (5, 10));
    }

    #[test]
    fn test_identity_reprojection_upsamples_nearest() {
        let reprojector = Reprojector::new(50.0);
        let window = BoundingWindow { ulx: 0.0, uly: 400.0, lrx: 400.0, lry: 0.0 };
        let output = reprojector.reproject(&source(), &window, &IdentityTransform).unwrap();

        assert_eq!(output.dim(), (8, 8));
        for r in 0..8 {
            for c in 0..8 {
                assert_eq!(output[[r, c]], ((r / 2) * 4 + c / 2) as i16);
            }
        }
    }

    #[test]
    fn test_cells_outside_source_are_nodata() {
        let reprojector = Reprojector::new(100.0);
        let window = BoundingWindow { ulx: 200.0, uly: 400.0, lrx: 600.0, lry: 200.0 };
        let output = reprojector.reproject(&source(), &window, &IdentityTransform).unwrap();

        assert_eq!(output.dim(), (2, 4));
        assert_eq!(output[[0, 0]], 2);
        assert_eq!(output[[1, 1]], 7);
        assert_eq!(output[[0, 2]], 0);
        assert_eq!(output[[1, 3]], 0);
    }

    #[test]
    fn test_shifted_source() {
        // Target coordinates sit 100 units east of the source coordinates
        let reprojector = Reprojector::new(100.0);
        let window = BoundingWindow { ulx: 100.0, uly: 400.0, lrx: 500.0, lry: 0.0 };
        let inverse = ShiftTransform { dx: -100.0, dy: 0.0 };
        let output = reprojector.reproject(&source(), &window, &inverse).unwrap();
        assert_eq!(output, source().data);
    }

    #[test]
    fn test_tiny_window_rejected() {
        let reprojector = Reprojector::new(1000.0);
        let window = BoundingWindow { ulx: 0.0, uly: 500.0, lrx: 500.0, lry: 0.0 };
        assert!(matches!(
            reprojector.output_shape(&window),
            Err(ValidationError::Bounds(_))
        ));
    }
}
