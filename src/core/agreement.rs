use crate::types::{ensure_same_shape, BoolGrid, ClassCode, ClassGrid, ValidationResult};
use ndarray::Zip;
use serde::{Deserialize, Serialize};

/// Number of operational confidence levels (0 to 5)
pub const CONFIDENCE_LEVELS: usize = 6;

/// 2x2 contingency table of reference vs operational classes.
///
/// Field names read reference first: `water_ice` is reference water
/// reported as ice by the operational product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyTable {
    pub water_water: u64,
    pub ice_ice: u64,
    pub water_ice: u64,
    pub ice_water: u64,
}

impl ContingencyTable {
    /// Count one cell; pairs involving other classes are ignored
    pub fn record(&mut self, reference: i16, operational: i16) {
        const WATER: i16 = ClassCode::Water.code();
        const ICE: i16 = ClassCode::Ice.code();
        match (reference, operational) {
            (WATER, WATER) => self.water_water += 1,
            (ICE, ICE) => self.ice_ice += 1,
            (WATER, ICE) => self.water_ice += 1,
            (ICE, WATER) => self.ice_water += 1,
            _ => {}
        }
    }

    pub fn relevant(&self) -> u64 {
        self.water_water + self.ice_ice + self.water_ice + self.ice_water
    }

    /// Derived rates; undefined (`None`) when no cell is relevant
    pub fn stats(&self) -> AgreementStats {
        let relevant = self.relevant();
        let rate = |n: u64| {
            if relevant == 0 {
                None
            } else {
                Some(n as f64 / relevant as f64)
            }
        };
        AgreementStats {
            table: *self,
            relevant,
            agree: rate(self.ice_ice + self.water_water),
            osi_over: rate(self.water_ice),
            osi_under: rate(self.ice_water),
        }
    }
}

/// Contingency counts with agreement and over/under-estimation rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgreementStats {
    #[serde(flatten)]
    pub table: ContingencyTable,
    pub relevant: u64,
    pub agree: Option<f64>,
    pub osi_over: Option<f64>,
    pub osi_under: Option<f64>,
}

/// Unconditional agreement plus one result per confidence level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceStratifiedStats {
    pub all: AgreementStats,
    pub levels: [AgreementStats; CONFIDENCE_LEVELS],
}

/// Agreement over the masked cells, optionally restricted to cells where
/// `confidence` equals a given level.
pub fn calculate_agreement(
    reference: &ClassGrid,
    operational: &ClassGrid,
    mask: &BoolGrid,
    confidence: Option<(&ClassGrid, i16)>,
) -> ValidationResult<AgreementStats> {
    ensure_same_shape("reference vs operational", reference, operational)?;
    ensure_same_shape("reference vs mask", reference, mask)?;

    let mut table = ContingencyTable::default();
    match confidence {
        Some((levels, level)) => {
            ensure_same_shape("reference vs confidence", reference, levels)?;
            Zip::from(reference)
                .and(operational)
                .and(mask)
                .and(levels)
                .for_each(|&r, &o, &valid, &c| {
                    if valid && c == level {
                        table.record(r, o);
                    }
                });
        }
        None => {
            Zip::from(reference)
                .and(operational)
                .and(mask)
                .for_each(|&r, &o, &valid| {
                    if valid {
                        table.record(r, o);
                    }
                });
        }
    }

    Ok(table.stats())
}

/// Unconditional and per-confidence-level agreement in a single pass.
///
/// Gives the same result as one [`calculate_agreement`] call per level.
/// Confidence values outside 0..=5 only contribute to the unconditional table.
pub fn calculate_stratified_agreement(
    reference: &ClassGrid,
    operational: &ClassGrid,
    mask: &BoolGrid,
    confidence: &ClassGrid,
) -> ValidationResult<ConfidenceStratifiedStats> {
    ensure_same_shape("reference vs operational", reference, operational)?;
    ensure_same_shape("reference vs mask", reference, mask)?;
    ensure_same_shape("reference vs confidence", reference, confidence)?;

    let mut all = ContingencyTable::default();
    let mut levels = [ContingencyTable::default(); CONFIDENCE_LEVELS];

    Zip::from(reference)
        .and(operational)
        .and(mask)
        .and(confidence)
        .for_each(|&r, &o, &valid, &c| {
            if !valid {
                return;
            }
            all.record(r, o);
            if (0..CONFIDENCE_LEVELS as i16).contains(&c) {
                levels[c as usize].record(r, o);
            }
        });

    let stats = ConfidenceStratifiedStats {
        all: all.stats(),
        levels: levels.map(|t| t.stats()),
    };

    log::info!(
        "Agreement {:?} over {} relevant cells",
        stats.all.agree,
        stats.all.relevant
    );
    for (level, s) in stats.levels.iter().enumerate() {
        log::debug!("Confidence level {}: agree {:?} over {} cells", level, s.agree, s.relevant);
    }
    Ok(stats)
}
