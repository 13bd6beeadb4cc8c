//! Wide-to-long reshape: union the per-vaccine sheets and melt their year
//! columns into (country, vaccine, year, coverage) observations. Melting a
//! table with R data rows and Y year columns yields exactly R x Y records;
//! missing cells become `coverage: None`, never zero.

use std::collections::HashMap;
use std::error;
use std::fmt;

use chrono::NaiveDate;

use crate::data::table::{
    CoverageRecord, CoverageTable, RegionSummaryRecord, RegionSummaryTable,
};
use crate::data::vocab::VaccineCode;
use crate::data::workbook::{Cell, SheetTable, AGGREGATE_ID_COLUMNS, WIDE_ID_COLUMNS};

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// The wide sheets do not share one column schema.
    ColumnMismatch {
        sheet: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    /// A sheet lost an identifying column between load and reshape.
    MissingColumn { sheet: String, column: &'static str },
    /// A vaccine cell holds a code outside the fixed vocabulary.
    UnknownVaccine { sheet: String, code: String },
    /// The workbook carried no wide sheets ahead of the aggregate sheet.
    NoWideSheets,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnMismatch {
                sheet,
                expected,
                found,
            } => write!(
                f,
                "sheet '{sheet}' columns [{}] do not match the first sheet's [{}]",
                found.join(", "),
                expected.join(", ")
            ),
            Self::MissingColumn { sheet, column } => {
                write!(f, "sheet '{sheet}' is missing column '{column}'")
            }
            Self::UnknownVaccine { sheet, code } => {
                write!(f, "sheet '{sheet}' has unknown vaccine code '{code}'")
            }
            Self::NoWideSheets => write!(f, "workbook has no wide coverage sheets"),
        }
    }
}

impl error::Error for FormatError {}

/// A year-labeled column header that is not a 4-digit year.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidYearError {
    pub sheet: String,
    pub label: String,
}

impl fmt::Display for InvalidYearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sheet '{}' year column '{}' is not a 4-digit year",
            self.sheet, self.label
        )
    }
}

impl error::Error for InvalidYearError {}

#[derive(Debug, Clone, PartialEq)]
pub enum ReshapeError {
    Format(FormatError),
    InvalidYear(InvalidYearError),
}

impl fmt::Display for ReshapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(err) => err.fmt(f),
            Self::InvalidYear(err) => err.fmt(f),
        }
    }
}

impl error::Error for ReshapeError {}

impl From<FormatError> for ReshapeError {
    fn from(err: FormatError) -> Self {
        Self::Format(err)
    }
}

impl From<InvalidYearError> for ReshapeError {
    fn from(err: InvalidYearError) -> Self {
        Self::InvalidYear(err)
    }
}

/// Concatenate the row sets of all wide sheets into one table. Every sheet
/// must share the first sheet's normalized header sequence.
pub fn concat_wide(sheets: &[SheetTable]) -> Result<SheetTable, FormatError> {
    let first = sheets.first().ok_or(FormatError::NoWideSheets)?;
    let expected: Vec<String> = normalized_header(first);

    let mut rows = Vec::new();
    for sheet in sheets {
        let found = normalized_header(sheet);
        if found != expected {
            return Err(FormatError::ColumnMismatch {
                sheet: sheet.name.clone(),
                expected,
                found,
            });
        }
        rows.extend(sheet.rows.iter().cloned());
    }

    Ok(SheetTable {
        name: first.name.clone(),
        header: first.header.clone(),
        rows,
    })
}

fn normalized_header(sheet: &SheetTable) -> Vec<String> {
    sheet
        .header
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect()
}

/// Melt a wide coverage table into the canonical long table.
pub fn melt(wide: &SheetTable) -> Result<CoverageTable, ReshapeError> {
    let country = id_column(wide, "country")?;
    let iso3 = id_column(wide, "iso3")?;
    let vaccine = id_column(wide, "vaccine")?;
    let region = id_column(wide, "region")?;
    let year_columns = year_columns(wide, &WIDE_ID_COLUMNS)?;

    let mut records = Vec::with_capacity(wide.rows.len() * year_columns.len());
    for row in &wide.rows {
        let code_label = cell_label(row, vaccine);
        let code = VaccineCode::parse(&code_label).ok_or_else(|| FormatError::UnknownVaccine {
            sheet: wide.name.clone(),
            code: code_label.clone(),
        })?;
        for (column, date) in &year_columns {
            records.push(CoverageRecord {
                country: cell_label(row, country),
                iso3: cell_label(row, iso3),
                vaccine: code,
                region: cell_label(row, region),
                date: *date,
                coverage: row.get(*column).and_then(Cell::to_number),
            });
        }
    }

    Ok(CoverageTable { records })
}

/// Melt the aggregate rollup sheet into the region summary table.
pub fn melt_region_summary(aggregate: &SheetTable) -> Result<RegionSummaryTable, ReshapeError> {
    let region = id_column(aggregate, "region")?;
    let vaccine = id_column(aggregate, "vaccine")?;
    let year_columns = year_columns(aggregate, &AGGREGATE_ID_COLUMNS)?;

    let mut records = Vec::with_capacity(aggregate.rows.len() * year_columns.len());
    for row in &aggregate.rows {
        let code_label = cell_label(row, vaccine);
        let code = VaccineCode::parse(&code_label).ok_or_else(|| FormatError::UnknownVaccine {
            sheet: aggregate.name.clone(),
            code: code_label.clone(),
        })?;
        for (column, date) in &year_columns {
            records.push(RegionSummaryRecord {
                region: cell_label(row, region),
                vaccine: code,
                date: *date,
                coverage: row.get(*column).and_then(Cell::to_number),
            });
        }
    }

    Ok(RegionSummaryTable { records })
}

/// Inverse pivot: spread the long table back into one wide row per
/// (country, iso3, vaccine, region) with one column per year, ascending.
/// Reproduces the melted source exactly when no substitution occurred.
pub fn pivot_wide(table: &CoverageTable) -> SheetTable {
    let years = table.years();
    let year_index: HashMap<i32, usize> = years
        .iter()
        .enumerate()
        .map(|(i, year)| (*year, i))
        .collect();

    let mut header: Vec<String> = WIDE_ID_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(years.iter().map(|y| y.to_string()));

    let mut row_index: HashMap<(String, String, VaccineCode, String), usize> = HashMap::new();
    let mut rows: Vec<Vec<Cell>> = Vec::new();

    for record in &table.records {
        let key = (
            record.country.clone(),
            record.iso3.clone(),
            record.vaccine,
            record.region.clone(),
        );
        let index = match row_index.get(&key) {
            Some(&i) => i,
            None => {
                let mut row = vec![
                    Cell::Text(record.country.clone()),
                    Cell::Text(record.iso3.clone()),
                    Cell::Text(record.vaccine.as_str().to_string()),
                    Cell::Text(record.region.clone()),
                ];
                row.resize(WIDE_ID_COLUMNS.len() + years.len(), Cell::Empty);
                row_index.insert(key, rows.len());
                rows.push(row);
                rows.len() - 1
            }
        };
        if let Some(&offset) = year_index.get(&record.year()) {
            rows[index][WIDE_ID_COLUMNS.len() + offset] = match record.coverage {
                Some(value) => Cell::Number(value),
                None => Cell::Empty,
            };
        }
    }

    SheetTable {
        name: "coverage_wide".to_string(),
        header,
        rows,
    }
}

fn id_column(sheet: &SheetTable, column: &'static str) -> Result<usize, FormatError> {
    sheet
        .column_index(column)
        .ok_or_else(|| FormatError::MissingColumn {
            sheet: sheet.name.clone(),
            column,
        })
}

/// Resolve the year columns of a sheet: every column whose header is not an
/// identifying column, parsed as a January-1 date.
fn year_columns(
    sheet: &SheetTable,
    id_columns: &[&str],
) -> Result<Vec<(usize, NaiveDate)>, InvalidYearError> {
    let mut columns = Vec::new();
    for (index, label) in sheet.header.iter().enumerate() {
        if id_columns.iter().any(|c| label.eq_ignore_ascii_case(c)) {
            continue;
        }
        columns.push((index, parse_year_label(&sheet.name, label)?));
    }
    Ok(columns)
}

fn parse_year_label(sheet: &str, label: &str) -> Result<NaiveDate, InvalidYearError> {
    let trimmed = label.trim();
    let invalid = || InvalidYearError {
        sheet: sheet.to_string(),
        label: label.to_string(),
    };
    if trimmed.len() != 4 || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let year: i32 = trimmed.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, 1, 1).ok_or_else(invalid)
}

fn cell_label(row: &[Cell], column: usize) -> String {
    row.get(column).map(Cell::label).unwrap_or_default()
}
