//! Ranking statistics over the canonical long table.
//!
//! The two rankings use different missing-value policies: the median ignores
//! missing observations (a country with no defined values is excluded), the
//! per-year total counts missing as zero. The policies are load-bearing:
//! they decide which countries appear in each ranking.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::table::CoverageTable;

/// One derived ranking row. Ephemeral; recomputed from the table on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingEntry {
    pub country: String,
    pub statistic: f64,
}

/// Median of each country's defined coverage values across vaccines and
/// years, sorted descending. Countries whose values are all missing have no
/// median and are excluded. Ties are broken by country name so the order is
/// deterministic.
pub fn median_coverage_by_country(table: &CoverageTable) -> Vec<RankingEntry> {
    let mut by_country: HashMap<&str, Vec<f64>> = HashMap::new();
    for record in &table.records {
        let values = by_country.entry(record.country.as_str()).or_default();
        if let Some(value) = record.coverage {
            values.push(value);
        }
    }

    let mut ranking: Vec<RankingEntry> = by_country
        .into_iter()
        .filter_map(|(country, mut values)| {
            median(&mut values).map(|statistic| RankingEntry {
                country: country.to_string(),
                statistic,
            })
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.statistic
            .total_cmp(&a.statistic)
            .then_with(|| a.country.cmp(&b.country))
    });
    ranking
}

/// Sum of coverage across vaccines per country for one year, missing values
/// counted as zero, sorted ascending. A country with records in the year but
/// no defined values therefore appears with a total of 0.
pub fn total_coverage_by_country_year(table: &CoverageTable, year: i32) -> Vec<RankingEntry> {
    let mut by_country: HashMap<&str, f64> = HashMap::new();
    for record in &table.records {
        if record.year() != year {
            continue;
        }
        *by_country.entry(record.country.as_str()).or_insert(0.0) +=
            record.coverage.unwrap_or(0.0);
    }

    let mut ranking: Vec<RankingEntry> = by_country
        .into_iter()
        .map(|(country, statistic)| RankingEntry {
            country: country.to_string(),
            statistic,
        })
        .collect();
    ranking.sort_by(|a, b| {
        a.statistic
            .total_cmp(&b.statistic)
            .then_with(|| a.country.cmp(&b.country))
    });
    ranking
}

/// Median of an unsorted slice; the mean of the two middle values for an
/// even count. `None` for an empty slice.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 1 {
        Some(values[mid])
    } else {
        Some((values[mid - 1] + values[mid]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_of_even_count_is_the_mean_of_the_middle_pair() {
        assert_eq!(median(&mut [10.0, 20.0]), Some(15.0));
        assert_eq!(median(&mut [40.0, 10.0, 30.0, 20.0]), Some(25.0));
    }

    #[test]
    fn median_of_odd_count_is_the_middle_value() {
        assert_eq!(median(&mut [30.0, 10.0, 20.0]), Some(20.0));
    }

    #[test]
    fn median_of_empty_slice_is_undefined() {
        assert_eq!(median(&mut []), None);
    }
}
