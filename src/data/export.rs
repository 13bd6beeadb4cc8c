//! CSV export of the reshaped data: tidy long format by default, or the
//! re-pivoted wide layout. Missing coverage is written as an empty field.

use std::io;

use crate::data::reshape::pivot_wide;
use crate::data::table::CoverageTable;
use crate::data::workbook::Cell;

/// Write the long table as CSV. Returns the number of data rows written.
pub fn write_long_csv<W: io::Write>(
    table: &CoverageTable,
    writer: W,
) -> Result<usize, csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(["country", "iso3", "vaccine", "region", "year", "coverage"])?;
    for record in &table.records {
        let year = record.year().to_string();
        let coverage = record
            .coverage
            .map(|value| format!("{value}"))
            .unwrap_or_default();
        out.write_record([
            record.country.as_str(),
            record.iso3.as_str(),
            record.vaccine.as_str(),
            record.region.as_str(),
            year.as_str(),
            coverage.as_str(),
        ])?;
    }
    out.flush()?;
    Ok(table.records.len())
}

/// Write the re-pivoted wide layout as CSV. Returns the number of data rows.
pub fn write_wide_csv<W: io::Write>(
    table: &CoverageTable,
    writer: W,
) -> Result<usize, csv::Error> {
    let wide = pivot_wide(table);
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(&wide.header)?;
    for row in &wide.rows {
        let fields: Vec<String> = row.iter().map(Cell::label).collect();
        out.write_record(&fields)?;
    }
    out.flush()?;
    Ok(wide.rows.len())
}
