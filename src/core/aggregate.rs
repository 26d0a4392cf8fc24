use crate::types::{ClassCode, ClassGrid, ValidationError, ValidationResult};
use ndarray::{s, Array2, ArrayView2};
use serde::{Deserialize, Serialize};

/// Block aggregation parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationParams {
    /// Fine cells per coarse cell along each axis
    pub factor: usize,
    /// A block is no-data when more than this percentage of it is no-data
    pub max_nodata_percent: u32,
}

impl Default for AggregationParams {
    fn default() -> Self {
        Self {
            factor: 10,
            max_nodata_percent: 10,
        }
    }
}

impl AggregationParams {
    pub fn validate(&self) -> ValidationResult<()> {
        if self.factor == 0 {
            return Err(ValidationError::Config(
                "Aggregation factor must be positive".to_string(),
            ));
        }
        if self.max_nodata_percent > 100 {
            return Err(ValidationError::Config(format!(
                "No-data threshold must be a percentage, got {}",
                self.max_nodata_percent
            )));
        }
        Ok(())
    }
}

/// Per-class pixel counts of one aggregation block
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockTally {
    pub total: usize,
    pub nodata: usize,
    pub water: usize,
    pub ice: usize,
    pub land: usize,
}

impl BlockTally {
    pub fn from_block(block: &ArrayView2<i16>) -> Self {
        let mut tally = BlockTally {
            total: block.len(),
            ..Default::default()
        };
        for &v in block.iter() {
            match ClassCode::from_code(v) {
                Some(ClassCode::NoData) | Some(ClassCode::NoDataAlt) => tally.nodata += 1,
                Some(ClassCode::Water) => tally.water += 1,
                Some(ClassCode::Ice) => tally.ice += 1,
                Some(ClassCode::Land) => tally.land += 1,
                _ => {}
            }
        }
        tally
    }
}

/// Majority class among water, ice and land.
///
/// Candidates are ordered by (count, priority) and the largest wins, so
/// equal counts resolve Water > Ice > Land.
pub fn majority_class(water: usize, ice: usize, land: usize) -> ClassCode {
    let candidates = [
        (water, 3u8, ClassCode::Water),
        (land, 1u8, ClassCode::Land),
        (ice, 2u8, ClassCode::Ice),
    ];
    candidates
        .iter()
        .max_by_key(|(count, priority, _)| (*count, *priority))
        .map(|(_, _, class)| *class)
        .unwrap_or(ClassCode::NoData)
}

/// Degrades a fine classified grid to a coarse grid by block majority vote
pub struct Aggregator {
    params: AggregationParams,
}

impl Aggregator {
    pub fn new(params: AggregationParams) -> ValidationResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Aggregator with the standard 10x10 block and 10% no-data threshold
    pub fn standard() -> Self {
        Self {
            params: AggregationParams::default(),
        }
    }

    pub fn params(&self) -> &AggregationParams {
        &self.params
    }

    /// Check that the coarse grid spacing is exactly `factor` fine cells
    pub fn validate_resolution_ratio(&self, fine_spacing: f64, coarse_spacing: f64) -> ValidationResult<()> {
        let ratio = coarse_spacing.abs() / fine_spacing.abs();
        if !ratio.is_finite() || (ratio - self.params.factor as f64).abs() > 1e-6 {
            return Err(ValidationError::Config(format!(
                "Resolution ratio {} / {} = {} does not match aggregation factor {}",
                coarse_spacing, fine_spacing, ratio, self.params.factor
            )));
        }
        Ok(())
    }

    /// Class of one block, `None` when the block is empty
    pub fn classify_block(&self, block: &ArrayView2<i16>) -> Option<ClassCode> {
        let tally = BlockTally::from_block(block);
        if tally.total == 0 {
            return None;
        }

        // Integer form of `100 * nodata / total > threshold`
        if tally.nodata * 100 > self.params.max_nodata_percent as usize * tally.total {
            return Some(ClassCode::NoData);
        }

        Some(majority_class(tally.water, tally.ice, tally.land))
    }

    /// Aggregate `fine` into a grid of exactly `shape` (rows, cols).
    ///
    /// Blocks past the end of `fine` are clipped; blocks lying fully
    /// outside it stay no-data.
    pub fn aggregate(&self, fine: &ClassGrid, shape: (usize, usize)) -> ValidationResult<ClassGrid> {
        let (rows, cols) = shape;
        let factor = self.params.factor;
        let (fine_rows, fine_cols) = fine.dim();

        log::info!(
            "Aggregating {}x{} grid to {}x{} with {}x{} blocks",
            fine_rows, fine_cols, rows, cols, factor, factor
        );
        if fine_rows != rows * factor || fine_cols != cols * factor {
            log::warn!(
                "Fine grid {}x{} does not tile the {}x{} target exactly; edge blocks are clipped",
                fine_rows, fine_cols, rows * factor, cols * factor
            );
        }

        let row_values = |row: usize| -> Vec<i16> {
            (0..cols)
                .map(|col| {
                    let r0 = (row * factor).min(fine_rows);
                    let r1 = ((row + 1) * factor).min(fine_rows);
                    let c0 = (col * factor).min(fine_cols);
                    let c1 = ((col + 1) * factor).min(fine_cols);
                    let block = fine.slice(s![r0..r1, c0..c1]);
                    self.classify_block(&block)
                        .unwrap_or(ClassCode::NoData)
                        .code()
                })
                .collect()
        };

        #[cfg(feature = "parallel")]
        let values: Vec<i16> = {
            use rayon::prelude::*;
            (0..rows).into_par_iter().flat_map_iter(row_values).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let values: Vec<i16> = (0..rows).flat_map(row_values).collect();

        let output = Array2::from_shape_vec((rows, cols), values)
            .map_err(|e| ValidationError::Shape(format!("Aggregated grid: {}", e)))?;

        log::debug!(
            "Aggregated grid: {} no-data cells of {}",
            output.iter().filter(|&&v| v == ClassCode::NoData.code()).count(),
            rows * cols
        );
        Ok(output)
    }
}
