pub mod export;
pub mod reshape;
pub mod table;
pub mod vocab;
pub mod workbook;

pub use export::{write_long_csv, write_wide_csv};
pub use reshape::{
    concat_wide, melt, melt_region_summary, pivot_wide, FormatError, InvalidYearError,
    ReshapeError,
};
pub use table::{CoverageRecord, CoverageTable, RegionSummaryRecord, RegionSummaryTable};
pub use vocab::{VaccineCode, CONFLICT_COUNTRIES, GLOBAL_REGION};
pub use workbook::{
    load_workbook, Cell, LoadError, SheetTable, WorkbookSheets, AGGREGATE_ID_COLUMNS,
    WIDE_ID_COLUMNS,
};
