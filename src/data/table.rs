//! Canonical long-format coverage observations and the pre-aggregated
//! regional rollups, as produced by the reshape step. Both tables are
//! immutable for the rest of the session; derived views borrow into them.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::data::vocab::VaccineCode;

/// One country-level coverage observation. At most one record exists per
/// (country, vaccine, year). `coverage` is a percentage in [0, 100];
/// `None` means the source reported no data, which is distinct from zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageRecord {
    pub country: String,
    pub iso3: String,
    pub vaccine: VaccineCode,
    pub region: String,
    /// January 1 of the observation year.
    pub date: NaiveDate,
    pub coverage: Option<f64>,
}

impl CoverageRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// One pre-aggregated rollup observation from the workbook's aggregate sheet.
/// Kept apart from [CoverageRecord]: these are regional/global estimates,
/// not country-level observations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummaryRecord {
    pub region: String,
    pub vaccine: VaccineCode,
    pub date: NaiveDate,
    pub coverage: Option<f64>,
}

impl RegionSummaryRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// The canonical long-format table for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CoverageTable {
    pub records: Vec<CoverageRecord>,
}

impl CoverageTable {
    /// Distinct years present, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self.records.iter().map(CoverageRecord::year).collect();
        years.sort_unstable();
        years.dedup();
        years
    }

    pub fn latest_year(&self) -> Option<i32> {
        self.records.iter().map(CoverageRecord::year).max()
    }

    /// Distinct country names, ascending.
    pub fn countries(&self) -> Vec<String> {
        let mut countries: Vec<String> =
            self.records.iter().map(|r| r.country.clone()).collect();
        countries.sort();
        countries.dedup();
        countries
    }
}

/// The aggregate-sheet rollup table for a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionSummaryTable {
    pub records: Vec<RegionSummaryRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(country: &str, year: i32, coverage: Option<f64>) -> CoverageRecord {
        CoverageRecord {
            country: country.to_string(),
            iso3: country[..3.min(country.len())].to_uppercase(),
            vaccine: VaccineCode::Dtp3,
            region: "Africa".to_string(),
            date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            coverage,
        }
    }

    #[test]
    fn years_are_distinct_and_sorted() {
        let table = CoverageTable {
            records: vec![
                record("Chad", 2021, Some(60.0)),
                record("Chad", 2019, Some(50.0)),
                record("Mali", 2019, None),
            ],
        };
        assert_eq!(table.years(), vec![2019, 2021]);
        assert_eq!(table.latest_year(), Some(2021));
    }

    #[test]
    fn countries_are_distinct_and_sorted() {
        let table = CoverageTable {
            records: vec![
                record("Mali", 2020, Some(40.0)),
                record("Chad", 2020, Some(50.0)),
                record("Mali", 2021, Some(45.0)),
            ],
        };
        assert_eq!(table.countries(), vec!["Chad", "Mali"]);
    }
}
