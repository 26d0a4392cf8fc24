use crate::types::{BoundingWindow, ClassCode, ClassGrid, RasterLayer, ValidationError, ValidationResult};
use ndarray::{s, Array2};

/// Which kind of layer is being cropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropKind {
    /// Class codes; the edge class is folded into ice
    Classification,
    /// Per-pixel confidence levels, returned untouched
    Confidence,
}

/// Pixel window of a crop in source raster coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    pub x_off: i64,
    pub y_off: i64,
    pub width: usize,
    pub height: usize,
}

impl PixelWindow {
    /// Pixel window for a projected window, rounded the way `gdal_translate -projwin` does
    pub fn from_bounds(layer: &RasterLayer, window: &BoundingWindow) -> ValidationResult<Self> {
        let gt = &layer.geo_transform;
        if gt.rotation_x != 0.0 || gt.rotation_y != 0.0 {
            return Err(ValidationError::Bounds(
                "Cannot crop a rotated raster to a projected window".to_string(),
            ));
        }

        let x_off = ((window.ulx - gt.top_left_x) / gt.pixel_width + 0.001).floor();
        let y_off = ((window.uly - gt.top_left_y) / gt.pixel_height + 0.001).floor();
        let width = ((window.lrx - window.ulx) / gt.pixel_width + 0.5).trunc();
        let height = ((window.lry - window.uly) / gt.pixel_height + 0.5).trunc();

        if !(width >= 1.0 && height >= 1.0) {
            return Err(ValidationError::Bounds(format!(
                "Crop window {:?} is empty at pixel size {}",
                window, gt.pixel_width
            )));
        }

        Ok(Self {
            x_off: x_off as i64,
            y_off: y_off as i64,
            width: width as usize,
            height: height as usize,
        })
    }
}

/// Clip a target-projection layer to `window` at source resolution
pub fn crop_to_window(
    layer: &RasterLayer,
    window: &BoundingWindow,
    kind: CropKind,
) -> ValidationResult<ClassGrid> {
    let pixels = PixelWindow::from_bounds(layer, window)?;
    let (rows, cols) = layer.data.dim();
    log::debug!("Crop pixel window: {:?} of {}x{} raster", pixels, cols, rows);

    // Overlap of the requested window with the raster, in source pixels
    let col_start = pixels.x_off.max(0);
    let row_start = pixels.y_off.max(0);
    let col_end = (pixels.x_off + pixels.width as i64).min(cols as i64);
    let row_end = (pixels.y_off + pixels.height as i64).min(rows as i64);

    if col_start >= col_end || row_start >= row_end {
        return Err(ValidationError::Bounds(format!(
            "Crop window {:?} lies entirely outside the {}x{} raster",
            window, cols, rows
        )));
    }

    let fill = layer.nodata.map(|v| v as i16).unwrap_or(ClassCode::NoData.code());
    let mut output = Array2::from_elem((pixels.height, pixels.width), fill);

    let covered = (col_end - col_start) as usize * (row_end - row_start) as usize;
    if covered < pixels.width * pixels.height {
        log::warn!(
            "Crop window only partially covers the raster ({} of {} pixels), padding with {}",
            covered,
            pixels.width * pixels.height,
            fill
        );
    }

    let dst_row = (row_start - pixels.y_off) as usize;
    let dst_col = (col_start - pixels.x_off) as usize;
    let n_rows = (row_end - row_start) as usize;
    let n_cols = (col_end - col_start) as usize;

    output
        .slice_mut(s![dst_row..dst_row + n_rows, dst_col..dst_col + n_cols])
        .assign(&layer.data.slice(s![
            row_start as usize..row_end as usize,
            col_start as usize..col_end as usize
        ]));

    if kind == CropKind::Classification {
        let edge = ClassCode::EdgeVariant.code();
        let ice = ClassCode::Ice.code();
        output.mapv_inplace(|v| if v == edge { ice } else { v });
    }

    log::info!("Cropped {:?} layer to {}x{}", kind, pixels.height, pixels.width);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoTransform;

    fn layer() -> RasterLayer {
        let data = Array2::from_shape_fn((10, 10), |(r, c)| ((r * 10 + c) % 4) as i16);
        RasterLayer::new(data, "", GeoTransform::north_up(0.0, 100.0, 10.0))
    }

    #[test]
    fn test_crop_inside_collapses_edge_class() {
        let window = BoundingWindow { ulx: 20.0, uly: 80.0, lrx: 60.0, lry: 50.0 };
        let cropped = crop_to_window(&layer(), &window, CropKind::Classification).unwrap();

        assert_eq!(cropped.dim(), (3, 4));
        assert!(cropped.iter().all(|&v| v != 3));
        // Source pixel (row 2, col 2) holds 22 % 4 = 2
        assert_eq!(cropped[[0, 0]], 2);
        // Source pixel (row 2, col 3) holds 23 % 4 = 3, collapsed to 2
        assert_eq!(cropped[[0, 1]], 2);
    }

    #[test]
    fn test_confidence_not_collapsed() {
        let window = BoundingWindow { ulx: 20.0, uly: 80.0, lrx: 60.0, lry: 50.0 };
        let cropped = crop_to_window(&layer(), &window, CropKind::Confidence).unwrap();
        assert_eq!(cropped[[0, 1]], 3);
    }

    #[test]
    fn test_partial_window_is_padded() {
        let mut source = layer();
        source.nodata = Some(-1.0);
        let window = BoundingWindow { ulx: -20.0, uly: 100.0, lrx: 20.0, lry: 80.0 };
        let cropped = crop_to_window(&source, &window, CropKind::Confidence).unwrap();

        assert_eq!(cropped.dim(), (2, 4));
        assert_eq!(cropped[[0, 0]], -1);
        assert_eq!(cropped[[0, 1]], -1);
        assert_eq!(cropped[[0, 2]], 0);
        assert_eq!(cropped[[1, 3]], 11 % 4);
    }

    #[test]
    fn test_window_outside_raster() {
        let window = BoundingWindow { ulx: 500.0, uly: 100.0, lrx: 600.0, lry: 0.0 };
        let result = crop_to_window(&layer(), &window, CropKind::Classification);
        assert!(matches!(result, Err(ValidationError::Bounds(_))));
    }

    #[test]
    fn test_empty_window() {
        let window = BoundingWindow { ulx: 20.0, uly: 80.0, lrx: 21.0, lry: 79.0 };
        let result = crop_to_window(&layer(), &window, CropKind::Classification);
        assert!(matches!(result, Err(ValidationError::Bounds(_))));
    }
}
