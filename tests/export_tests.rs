use chrono::NaiveDate;
use vaxtrend::data::export::{write_long_csv, write_wide_csv};
use vaxtrend::data::table::{CoverageRecord, CoverageTable};
use vaxtrend::data::vocab::VaccineCode;

fn table() -> CoverageTable {
    let record = |year: i32, coverage: Option<f64>| CoverageRecord {
        country: "Chad".to_string(),
        iso3: "TCD".to_string(),
        vaccine: VaccineCode::Dtp3,
        region: "Africa".to_string(),
        date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
        coverage,
    };
    CoverageTable {
        records: vec![record(2019, Some(50.0)), record(2020, None), record(2021, Some(60.5))],
    }
}

#[test]
fn long_csv_writes_one_row_per_record_with_empty_missing_fields() {
    let mut out = Vec::new();
    let rows = write_long_csv(&table(), &mut out).expect("csv writes");
    assert_eq!(rows, 3);

    let text = String::from_utf8(out).expect("csv is utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "country,iso3,vaccine,region,year,coverage");
    assert_eq!(lines[1], "Chad,TCD,DTP3,Africa,2019,50");
    assert_eq!(lines[2], "Chad,TCD,DTP3,Africa,2020,");
    assert_eq!(lines[3], "Chad,TCD,DTP3,Africa,2021,60.5");
}

#[test]
fn wide_csv_spreads_years_back_into_columns() {
    let mut out = Vec::new();
    let rows = write_wide_csv(&table(), &mut out).expect("csv writes");
    assert_eq!(rows, 1, "one identifying group spreads to one row");

    let text = String::from_utf8(out).expect("csv is utf-8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "country,iso3,vaccine,region,2019,2020,2021");
    assert_eq!(lines[1], "Chad,TCD,DTP3,Africa,50,,60.5");
}
