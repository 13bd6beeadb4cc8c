//! Workbook loading: read every worksheet into an in-memory table with its
//! header preserved. The last sheet of the workbook is the pre-aggregated
//! region/global rollup; all preceding sheets are wide per-vaccine coverage
//! tables sharing one identifying-column schema. That last-sheet convention
//! is the only positional lookup; columns are always resolved by name.

use std::error;
use std::fmt;
use std::fmt::Write as _;
use std::path::Path;

use calamine::Reader;

/// Identifying columns every wide coverage sheet must carry. The remaining
/// columns are year labels.
pub const WIDE_ID_COLUMNS: [&str; 4] = ["country", "iso3", "vaccine", "region"];

/// Identifying columns of the aggregate rollup sheet.
pub const AGGREGATE_ID_COLUMNS: [&str; 2] = ["region", "vaccine"];

/// A spreadsheet cell after coercion from the backing workbook format.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Cell rendered as a trimmed label. Numbers use plain Display, so an
    /// Excel header stored as the float 2019.0 reads back as "2019".
    pub fn label(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => format!("{n}"),
        }
    }

    /// Numeric value if the cell holds one, including numeric text.
    pub fn to_number(&self) -> Option<f64> {
        match self {
            Cell::Empty => None,
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn coerce_cell(data: &calamine::Data) -> Cell {
    match data {
        calamine::Data::Empty => Cell::Empty,
        calamine::Data::String(s) => Cell::Text(s.clone()),
        calamine::Data::Float(f) => Cell::Number(*f),
        calamine::Data::Int(i) => Cell::Number(*i as f64),
        calamine::Data::Bool(b) => Cell::Text(format!("{b}")),
        other => Cell::Text(format!("{other:?}")),
    }
}

/// One worksheet loaded into memory: header labels plus data rows, each row
/// padded or truncated to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl SheetTable {
    /// Case-insensitive column lookup by header name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header
            .iter()
            .position(|h| h.eq_ignore_ascii_case(name))
    }
}

/// The loaded workbook, split into wide coverage sheets and the aggregate
/// rollup sheet.
#[derive(Debug, Clone)]
pub struct WorkbookSheets {
    pub wide: Vec<SheetTable>,
    pub aggregate: SheetTable,
}

#[derive(Debug)]
pub enum LoadError {
    Open {
        path: String,
        source: calamine::Error,
    },
    NoSheets {
        path: String,
    },
    Sheet {
        sheet: String,
        source: calamine::Error,
    },
    EmptySheet {
        sheet: String,
    },
    MissingColumn {
        sheet: String,
        column: &'static str,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "failed to open workbook '{path}': {source}")
            }
            Self::NoSheets { path } => write!(f, "workbook '{path}' has no sheets"),
            Self::Sheet { sheet, source } => {
                write!(f, "failed to read sheet '{sheet}': {source}")
            }
            Self::EmptySheet { sheet } => write!(f, "sheet '{sheet}' has no data rows"),
            Self::MissingColumn { sheet, column } => {
                write!(f, "sheet '{sheet}' is missing identifying column '{column}'")
            }
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Sheet { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Load every sheet of the workbook at `path` and split off the aggregate
/// table. Wide sheets are checked for the identifying columns; the aggregate
/// sheet for its own.
pub fn load_workbook(path: &Path) -> Result<WorkbookSheets, LoadError> {
    let mut wb = calamine::open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;

    let names = wb.sheet_names();
    if names.is_empty() {
        return Err(LoadError::NoSheets {
            path: path.display().to_string(),
        });
    }

    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = wb.worksheet_range(name).map_err(|source| LoadError::Sheet {
            sheet: name.clone(),
            source,
        })?;
        sheets.push(sheet_from_range(name, &range)?);
    }

    let aggregate = sheets.pop().ok_or(LoadError::NoSheets {
        path: path.display().to_string(),
    })?;

    for sheet in &sheets {
        for column in WIDE_ID_COLUMNS {
            if sheet.column_index(column).is_none() {
                return Err(LoadError::MissingColumn {
                    sheet: sheet.name.clone(),
                    column,
                });
            }
        }
    }
    for column in AGGREGATE_ID_COLUMNS {
        if aggregate.column_index(column).is_none() {
            return Err(LoadError::MissingColumn {
                sheet: aggregate.name.clone(),
                column,
            });
        }
    }

    Ok(WorkbookSheets {
        wide: sheets,
        aggregate,
    })
}

/// Text description of every sheet: name, dimensions, first rows. Used by
/// the `inspect` command; performs no schema checks so it also works on
/// workbooks the loader would reject.
pub fn describe_workbook(path: &Path, preview_rows: usize) -> Result<String, LoadError> {
    let mut wb = calamine::open_workbook_auto(path).map_err(|source| LoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    let names = wb.sheet_names();
    if names.is_empty() {
        return Err(LoadError::NoSheets {
            path: path.display().to_string(),
        });
    }

    let mut out = String::new();
    let _ = writeln!(out, "Sheets ({}): {}", names.len(), names.join(", "));
    for name in &names {
        let range = wb.worksheet_range(name).map_err(|source| LoadError::Sheet {
            sheet: name.clone(),
            source,
        })?;
        let (height, width) = range.get_size();
        let _ = writeln!(out, "\n{name}: {height} rows x {width} cols");
        for (index, row) in range.rows().take(preview_rows).enumerate() {
            let cells: Vec<String> = row.iter().map(|c| coerce_cell(c).label()).collect();
            let _ = writeln!(out, "  {index}: {}", cells.join(" | "));
        }
    }
    Ok(out)
}

fn sheet_from_range(
    name: &str,
    range: &calamine::Range<calamine::Data>,
) -> Result<SheetTable, LoadError> {
    let mut rows = range.rows();
    let header_row = rows.next().ok_or_else(|| LoadError::EmptySheet {
        sheet: name.to_string(),
    })?;

    let mut header: Vec<String> = header_row.iter().map(|c| coerce_cell(c).label()).collect();
    while header.last().map_or(false, |label| label.is_empty()) {
        header.pop();
    }
    if header.is_empty() {
        return Err(LoadError::EmptySheet {
            sheet: name.to_string(),
        });
    }

    let width = header.len();
    let mut data_rows = Vec::new();
    for row in rows {
        let mut cells: Vec<Cell> = row.iter().take(width).map(coerce_cell).collect();
        if cells.iter().all(Cell::is_empty) {
            continue;
        }
        cells.resize(width, Cell::Empty);
        data_rows.push(cells);
    }

    if data_rows.is_empty() {
        return Err(LoadError::EmptySheet {
            sheet: name.to_string(),
        });
    }

    Ok(SheetTable {
        name: name.to_string(),
        header,
        rows: data_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_labels_render_numeric_headers_as_integers() {
        assert_eq!(Cell::Number(2019.0).label(), "2019");
        assert_eq!(Cell::Text("  2020 ".to_string()).label(), "2020");
        assert_eq!(Cell::Empty.label(), "");
    }

    #[test]
    fn to_number_accepts_numeric_text_and_rejects_prose() {
        assert_eq!(Cell::Number(55.5).to_number(), Some(55.5));
        assert_eq!(Cell::Text(" 60 ".to_string()).to_number(), Some(60.0));
        assert_eq!(Cell::Text("n/a".to_string()).to_number(), None);
        assert_eq!(Cell::Empty.to_number(), None);
    }

    #[test]
    fn column_index_is_case_insensitive() {
        let sheet = SheetTable {
            name: "BCG".to_string(),
            header: vec!["Country".to_string(), "ISO3".to_string()],
            rows: vec![vec![Cell::Text("Chad".to_string()), Cell::Text("TCD".to_string())]],
        };
        assert_eq!(sheet.column_index("country"), Some(0));
        assert_eq!(sheet.column_index("iso3"), Some(1));
        assert_eq!(sheet.column_index("year"), None);
    }

    #[test]
    fn missing_workbook_is_an_open_error() {
        let err = load_workbook(Path::new("/nonexistent/coverage.xlsx")).unwrap_err();
        match err {
            LoadError::Open { path, .. } => assert!(path.contains("coverage.xlsx")),
            other => panic!("expected Open error, got {other}"),
        }
    }
}
