use crate::types::{
    ensure_same_shape, BoolGrid, DistanceGrid, ValidationError, ValidationResult,
};

/// Mean distance from the edge pixels of one product to the edge of the other.
///
/// With `edge` the edge raster of the product measured from and
/// `edge_distance` the distance to the other product's edge, a cell counts
/// when it is valid in `mask`, lies on `edge`, and is no further from the
/// other edge than from the other product's no-data area. Cells with a
/// non-finite distance never count.
pub fn extract_mean_distance(
    edge: &BoolGrid,
    edge_distance: &DistanceGrid,
    nodata_distance: &DistanceGrid,
    mask: &BoolGrid,
) -> ValidationResult<f64> {
    ensure_same_shape("edge vs edge distance", edge, edge_distance)?;
    ensure_same_shape("edge vs no-data distance", edge, nodata_distance)?;
    ensure_same_shape("edge vs mask", edge, mask)?;

    let mut sum = 0.0f64;
    let mut count = 0usize;

    for (((&on_edge, &delta), &nodata), &valid) in edge
        .iter()
        .zip(edge_distance.iter())
        .zip(nodata_distance.iter())
        .zip(mask.iter())
    {
        if valid && on_edge && delta.is_finite() && delta <= nodata {
            sum += delta as f64;
            count += 1;
        }
    }

    if count == 0 {
        return Err(ValidationError::InsufficientData(
            "No valid edge pixels to measure edge distance from".to_string(),
        ));
    }

    let mean = sum / count as f64;
    log::info!("Mean edge distance {:.3} pixels over {} edge pixels", mean, count);
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_all_false_mask_is_insufficient() {
        let edge = BoolGrid::from_elem((3, 3), true);
        let distance = DistanceGrid::zeros((3, 3));
        let nodata = DistanceGrid::from_elem((3, 3), 5.0);
        let mask = BoolGrid::from_elem((3, 3), false);
        assert!(matches!(
            extract_mean_distance(&edge, &distance, &nodata, &mask),
            Err(ValidationError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_eligibility_rule() {
        let edge = array![[true, true, true, false]];
        let distance = array![[1.0f32, 3.0, 6.0, 0.5]];
        let nodata = array![[2.0f32, 3.0, 5.0, 9.0]];
        let mask = array![[true, true, true, true]];
        // Third cell is closer to no-data, fourth is not an edge
        let mean = extract_mean_distance(&edge, &distance, &nodata, &mask).unwrap();
        assert_relative_eq!(mean, 2.0);
    }

    #[test]
    fn test_infinite_distances_ignored() {
        let edge = array![[true, true]];
        let distance = array![[f32::INFINITY, 4.0]];
        let nodata = array![[f32::INFINITY, f32::INFINITY]];
        let mask = array![[true, true]];
        let mean = extract_mean_distance(&edge, &distance, &nodata, &mask).unwrap();
        assert_relative_eq!(mean, 4.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let edge = BoolGrid::from_elem((2, 2), true);
        let distance = DistanceGrid::zeros((2, 3));
        let mask = BoolGrid::from_elem((2, 2), true);
        assert!(matches!(
            extract_mean_distance(&edge, &distance, &distance, &mask),
            Err(ValidationError::Shape(_))
        ));
    }
}
