//! Business rules for geographic-unit records
//!
//! A record is accepted when:
//! 1. `anzsic06` is a known industry code
//! 2. `area` is a known area code
//! 3. the year parses as an integer within 2000..=2024
//! 4. `geo_count` parses as a non-negative integer
//! 5. `ec_count` parses as a non-negative integer
//!
//! A numeric field that does not parse rejects the record instead of failing
//! the run.

use crate::constants::{MAX_YEAR_RECORDED, MIN_YEAR_RECORDED};
use crate::models::{GeographicUnit, RejectionReason, ValidatedUnit};
use crate::reference::ReferenceCodes;
use std::collections::HashSet;

/// Validates records against the loaded reference code sets
#[derive(Debug, Clone)]
pub struct RecordValidator {
    anzsic06_codes: HashSet<String>,
    area_codes: HashSet<String>,
}

impl RecordValidator {
    pub fn new(anzsic06_codes: HashSet<String>, area_codes: HashSet<String>) -> Self {
        Self {
            anzsic06_codes,
            area_codes,
        }
    }

    pub fn from_reference(codes: ReferenceCodes) -> Self {
        Self::new(codes.anzsic06, codes.area)
    }

    /// True if the record passes all five rules
    pub fn validate(&self, unit: &GeographicUnit) -> bool {
        self.check(unit).is_ok()
    }

    /// Accept the record with its numeric fields parsed, or report the first
    /// rule it breaks
    pub fn check(&self, unit: &GeographicUnit) -> Result<ValidatedUnit, RejectionReason> {
        if !self.anzsic06_codes.contains(&unit.anzsic06) {
            return Err(RejectionReason::UnknownAnzsic06);
        }
        if !self.area_codes.contains(&unit.area) {
            return Err(RejectionReason::UnknownArea);
        }

        let year = parse_int(&unit.year_recorded)?;
        if !(MIN_YEAR_RECORDED..=MAX_YEAR_RECORDED).contains(&year) {
            return Err(RejectionReason::YearOutOfRange);
        }

        let geo_count = parse_int(&unit.geo_count)?;
        if geo_count < 0 {
            return Err(RejectionReason::NegativeGeoCount);
        }

        let ec_count = parse_int(&unit.ec_count)?;
        if ec_count < 0 {
            return Err(RejectionReason::NegativeEcCount);
        }

        Ok(ValidatedUnit {
            anzsic06: unit.anzsic06.clone(),
            area: unit.area.clone(),
            year,
            geo_count,
            ec_count,
        })
    }

    pub fn anzsic06_code_count(&self) -> usize {
        self.anzsic06_codes.len()
    }

    pub fn area_code_count(&self) -> usize {
        self.area_codes.len()
    }
}

fn parse_int(value: &str) -> Result<i32, RejectionReason> {
    value
        .parse::<i32>()
        .map_err(|_| RejectionReason::UnparseableNumber)
}
