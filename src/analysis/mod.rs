pub mod aggregate;
pub mod select;

pub use aggregate::{median_coverage_by_country, total_coverage_by_country_year, RankingEntry};
pub use select::{
    by_countries, by_iso3, by_region, by_vaccine, by_year, ensure_non_empty, extremes, refine,
    EmptySelectionError, Extremes,
};
