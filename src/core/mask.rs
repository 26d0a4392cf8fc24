use crate::types::{
    ensure_same_shape, BoolGrid, ClassCode, ClassGrid, ValidationResult, OPERATIONAL_NODATA,
};
use ndarray::Zip;

/// Cells where both products carry comparable data.
///
/// A cell is excluded when the operational grid is no-data or the
/// aggregated reference grid is no-data or land.
pub fn generate_mask(reference: &ClassGrid, operational: &ClassGrid) -> ValidationResult<BoolGrid> {
    ensure_same_shape("validity mask inputs", reference, operational)?;

    let land = ClassCode::Land.code();
    let mask = Zip::from(reference)
        .and(operational)
        .map_collect(|&fine, &coarse| {
            !(coarse == OPERATIONAL_NODATA || fine == land || ClassCode::is_nodata_code(fine))
        });

    log::debug!(
        "Validity mask: {} of {} cells valid",
        mask.iter().filter(|&&v| v).count(),
        mask.len()
    );
    Ok(mask)
}

/// Cells where the reference grid is no-data; the inverse of its validity grid
pub fn generate_nodata_mask(reference: &ClassGrid) -> BoolGrid {
    let mask = reference.mapv(ClassCode::is_nodata_code);
    log::debug!(
        "Reference no-data mask: {} of {} cells",
        mask.iter().filter(|&&v| v).count(),
        mask.len()
    );
    mask
}
