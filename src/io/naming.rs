//! File naming conventions of the two ice edge products

use chrono::NaiveDate;
use regex::Regex;
use std::path::Path;

/// Acquisition date encoded in a reference product file name,
/// e.g. `ice_edge_hr_sh_20190129_043714_1.nc`
pub fn reference_date<P: AsRef<Path>>(path: P) -> Option<NaiveDate> {
    let name = path.as_ref().file_name()?.to_str()?;
    let pattern = Regex::new(r"^ice_edge_hr_[ns]h_(\d{8})_").ok()?;
    let captures = pattern.captures(name)?;
    NaiveDate::parse_from_str(&captures[1], "%Y%m%d").ok()
}

/// Name of the operational product issued for `date`
pub fn operational_file_name(date: NaiveDate) -> String {
    format!("ice_edge_sh_polstere-100_multi_{}1200.nc", date.format("%Y%m%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_date_from_path() {
        let date = reference_date("/data/final/ice_edge_hr_sh_20190129_043714_1.nc").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2019, 1, 29).unwrap());
    }

    #[test]
    fn test_unrecognised_names() {
        assert!(reference_date("ice_edge_sh_polstere-100_multi_201902251200.nc").is_none());
        assert!(reference_date("ice_edge_hr_sh_20191345_000000_1.nc").is_none());
    }

    #[test]
    fn test_operational_name_for_date() {
        let date = NaiveDate::from_ymd_opt(2019, 2, 25).unwrap();
        assert_eq!(
            operational_file_name(date),
            "ice_edge_sh_polstere-100_multi_201902251200.nc"
        );
    }
}
