//! Pure filters over the canonical tables. Every function returns a new view
//! borrowing into the input; nothing mutates the canonical table, so filters
//! compose in any order with the same result. Filter members absent from the
//! data are silently ignored.

use std::error;
use std::fmt;

use crate::analysis::aggregate::RankingEntry;
use crate::data::table::{CoverageRecord, RegionSummaryRecord};
use crate::data::vocab::VaccineCode;

pub fn by_vaccine<'a>(
    records: &'a [CoverageRecord],
    vaccine: VaccineCode,
) -> Vec<&'a CoverageRecord> {
    records.iter().filter(|r| r.vaccine == vaccine).collect()
}

pub fn by_year<'a>(records: &'a [CoverageRecord], year: i32) -> Vec<&'a CoverageRecord> {
    records.iter().filter(|r| r.year() == year).collect()
}

pub fn by_iso3<'a>(records: &'a [CoverageRecord], codes: &[&str]) -> Vec<&'a CoverageRecord> {
    records
        .iter()
        .filter(|r| codes.iter().any(|code| r.iso3.eq_ignore_ascii_case(code)))
        .collect()
}

pub fn by_countries<'a>(
    records: &'a [CoverageRecord],
    countries: &[String],
) -> Vec<&'a CoverageRecord> {
    records
        .iter()
        .filter(|r| countries.iter().any(|c| *c == r.country))
        .collect()
}

/// Region filter for the aggregate rollup table.
pub fn by_region<'a>(
    records: &'a [RegionSummaryRecord],
    region: &str,
) -> Vec<&'a RegionSummaryRecord> {
    records
        .iter()
        .filter(|r| r.region.eq_ignore_ascii_case(region))
        .collect()
}

/// Re-filter an existing view. Views are plain vectors of borrows, so any
/// predicate chain is a set intersection over row predicates.
pub fn refine<'a, T>(view: &[&'a T], predicate: impl Fn(&T) -> bool) -> Vec<&'a T> {
    view.iter().copied().filter(|r| predicate(r)).collect()
}

/// The two ends of a descending ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Extremes {
    pub top: Vec<RankingEntry>,
    pub bottom: Vec<RankingEntry>,
}

/// Select floor(n/2) entries from each end of a descending ranking. An odd
/// `n` therefore selects n - 1 entries in total, never a duplicated middle.
/// When the ranking holds fewer than n entries the bottom side shrinks first
/// so the two sides stay disjoint.
pub fn extremes(ranking: &[RankingEntry], n: usize) -> Extremes {
    let side = n / 2;
    let top_len = side.min(ranking.len());
    let bottom_len = side.min(ranking.len() - top_len);
    Extremes {
        top: ranking[..top_len].to_vec(),
        bottom: ranking[ranking.len() - bottom_len..].to_vec(),
    }
}

/// A named filter produced zero rows; surfaced to the report author instead
/// of rendering an empty chart.
#[derive(Debug, Clone, PartialEq)]
pub struct EmptySelectionError {
    pub selection: String,
}

impl fmt::Display for EmptySelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "selection '{}' matched no rows", self.selection)
    }
}

impl error::Error for EmptySelectionError {}

/// Pass a non-empty view through, or surface which selection came up empty.
pub fn ensure_non_empty<T>(
    selection: &str,
    view: Vec<T>,
) -> Result<Vec<T>, EmptySelectionError> {
    if view.is_empty() {
        return Err(EmptySelectionError {
            selection: selection.to_string(),
        });
    }
    Ok(view)
}
