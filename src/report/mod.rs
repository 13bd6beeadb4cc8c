//! Report generation: load -> reshape -> aggregate/filter -> render, one
//! synchronous pass per invocation. Any failure aborts the run with a
//! message naming the stage that failed.

pub mod chart;
pub mod html;
pub mod svg;

pub use chart::{render, Chart, ChartKind, ChartSpec, FieldValue, PlotRecord, RenderError};

use std::error;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::Serialize;

use crate::analysis::aggregate::{
    median_coverage_by_country, total_coverage_by_country_year,
};
use crate::analysis::select::{
    by_countries, by_iso3, by_region, by_year, ensure_non_empty, extremes, refine,
    EmptySelectionError,
};
use crate::data::reshape::{concat_wide, melt, melt_region_summary, ReshapeError};
use crate::data::table::CoverageTable;
use crate::data::vocab::{VaccineCode, CONFLICT_COUNTRIES, GLOBAL_REGION};
use crate::data::workbook::{load_workbook, LoadError, WorkbookSheets};
use crate::report::html::report_page;

#[derive(Debug)]
pub enum ReportError {
    Load(LoadError),
    Reshape(ReshapeError),
    Selection(EmptySelectionError),
    Render(RenderError),
    Write(io::Error),
}

impl ReportError {
    /// The pipeline stage the failure belongs to.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Reshape(_) => "reshape",
            Self::Selection(_) => "filter",
            Self::Render(_) => "render",
            Self::Write(_) => "write",
        }
    }
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = self.stage();
        match self {
            Self::Load(err) => write!(f, "{stage} stage: {err}"),
            Self::Reshape(err) => write!(f, "{stage} stage: {err}"),
            Self::Selection(err) => write!(f, "{stage} stage: {err}"),
            Self::Render(err) => write!(f, "{stage} stage: {err}"),
            Self::Write(err) => write!(f, "{stage} stage: {err}"),
        }
    }
}

impl error::Error for ReportError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Load(err) => Some(err),
            Self::Reshape(err) => Some(err),
            Self::Selection(err) => Some(err),
            Self::Render(err) => Some(err),
            Self::Write(err) => Some(err),
        }
    }
}

impl From<LoadError> for ReportError {
    fn from(err: LoadError) -> Self {
        Self::Load(err)
    }
}

impl From<ReshapeError> for ReportError {
    fn from(err: ReshapeError) -> Self {
        Self::Reshape(err)
    }
}

impl From<EmptySelectionError> for ReportError {
    fn from(err: EmptySelectionError) -> Self {
        Self::Selection(err)
    }
}

impl From<RenderError> for ReportError {
    fn from(err: RenderError) -> Self {
        Self::Render(err)
    }
}

/// Tunables for the report's chart selection.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Countries selected across the top/bottom median charts combined.
    pub extremes_count: usize,
    /// Vaccine tracked in the conflict-country trend chart.
    pub focus_vaccine: VaccineCode,
    /// Countries shown in the lowest-total stacked bar chart.
    pub stacked_countries: usize,
    /// Panels per row in the faceted charts.
    pub facet_columns: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            extremes_count: 8,
            focus_vaccine: VaccineCode::Dtp3,
            stacked_countries: 10,
            facet_columns: 4,
        }
    }
}

/// Counts and titles for the generated report, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub source: String,
    pub output: String,
    pub wide_sheets: usize,
    pub records: usize,
    pub region_records: usize,
    pub countries: usize,
    pub first_year: Option<i32>,
    pub last_year: Option<i32>,
    pub charts: Vec<String>,
}

/// A rendered report before it is written anywhere.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub page: String,
    pub chart_titles: Vec<String>,
    pub table: CoverageTable,
    pub wide_sheets: usize,
    pub region_records: usize,
}

/// Full pipeline: read the workbook, build the page, write it to
/// `output`. Returns the summary the CLI prints.
pub fn generate_report(
    workbook: &Path,
    output: &Path,
    options: &ReportOptions,
) -> Result<ReportSummary, ReportError> {
    let sheets = load_workbook(workbook)?;
    let built = build_report(&sheets, &workbook.display().to_string(), options)?;
    fs::write(output, &built.page).map_err(ReportError::Write)?;

    Ok(ReportSummary {
        source: workbook.display().to_string(),
        output: output.display().to_string(),
        wide_sheets: built.wide_sheets,
        records: built.table.records.len(),
        region_records: built.region_records,
        countries: built.table.countries().len(),
        first_year: built.table.years().first().copied(),
        last_year: built.table.latest_year(),
        charts: built.chart_titles,
    })
}

/// Reshape the loaded sheets and render every chart of the report. Kept
/// separate from [generate_report] so the pipeline can run without touching
/// the filesystem.
pub fn build_report(
    sheets: &WorkbookSheets,
    source: &str,
    options: &ReportOptions,
) -> Result<BuiltReport, ReportError> {
    let wide = concat_wide(&sheets.wide).map_err(ReshapeError::Format)?;
    let table = melt(&wide)?;
    let summary_table = melt_region_summary(&sheets.aggregate)?;

    let mut charts = Vec::new();

    // 1. Global trend per vaccine, from the pre-aggregated rollup sheet.
    let global = ensure_non_empty(
        &format!("region '{GLOBAL_REGION}' in sheet '{}'", sheets.aggregate.name),
        by_region(&summary_table.records, GLOBAL_REGION),
    )?;
    charts.push(render(
        &global,
        &ChartSpec {
            title: "Global coverage trend per vaccine".to_string(),
            kind: ChartKind::Line,
            x: "year",
            y: "coverage",
            color: "vaccine",
            facet: None,
            category_order: None,
        },
    )?);

    // 2 + 3. Extremes of the median ranking, one time-series panel per country.
    let ranking = ensure_non_empty(
        "countries with any defined coverage",
        median_coverage_by_country(&table),
    )?;
    let split = extremes(&ranking, options.extremes_count);
    for (entries, end) in [(&split.top, "Top"), (&split.bottom, "Bottom")] {
        let names: Vec<String> = entries.iter().map(|e| e.country.clone()).collect();
        let view = ensure_non_empty(
            &format!("{} {} countries by median coverage", end, names.len()),
            by_countries(&table.records, &names),
        )?;
        charts.push(render(
            &view,
            &ChartSpec {
                title: format!("{} {} countries by median coverage", end, names.len()),
                kind: ChartKind::FacetedLine {
                    columns: options.facet_columns,
                },
                x: "year",
                y: "coverage",
                color: "vaccine",
                facet: Some("country"),
                category_order: None,
            },
        )?);
    }

    // 4. Stacked per-vaccine coverage for the lowest-total countries in the
    // latest year; bar order is the ascending zero-filled total.
    let latest = table.latest_year().ok_or_else(|| EmptySelectionError {
        selection: "coverage records".to_string(),
    })?;
    let totals = total_coverage_by_country_year(&table, latest);
    let lowest: Vec<String> = totals
        .iter()
        .take(options.stacked_countries)
        .map(|e| e.country.clone())
        .collect();
    let latest_view = by_year(&table.records, latest);
    let stacked_view = ensure_non_empty(
        &format!("lowest-total countries in {latest}"),
        refine(&latest_view, |r| lowest.contains(&r.country)),
    )?;
    charts.push(render(
        &stacked_view,
        &ChartSpec {
            title: format!("Lowest total reported coverage, {latest}"),
            kind: ChartKind::StackedBar,
            x: "country",
            y: "coverage",
            color: "vaccine",
            facet: None,
            category_order: Some(lowest),
        },
    )?);

    // 5. Focus-vaccine trend across the conflict-country list.
    let conflict = by_iso3(&table.records, &CONFLICT_COUNTRIES);
    let focus = options.focus_vaccine;
    let focus_view = ensure_non_empty(
        &format!("{focus} in the conflict-country list"),
        refine(&conflict, |r| r.vaccine == focus),
    )?;
    charts.push(render(
        &focus_view,
        &ChartSpec {
            title: format!("{focus} coverage in conflict-affected countries"),
            kind: ChartKind::Line,
            x: "year",
            y: "coverage",
            color: "country",
            facet: None,
            category_order: None,
        },
    )?);

    // 6. Conflict-country small multiples across every vaccine.
    let conflict_view = ensure_non_empty("conflict-country list", conflict)?;
    charts.push(render(
        &conflict_view,
        &ChartSpec {
            title: "Conflict-affected countries, all vaccines".to_string(),
            kind: ChartKind::FacetedLine {
                columns: 3,
            },
            x: "year",
            y: "coverage",
            color: "vaccine",
            facet: Some("country"),
            category_order: None,
        },
    )?);

    let ranking_json =
        serde_json::to_string(&ranking).unwrap_or_else(|_| "[]".to_string());
    let generated = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    let page = report_page(
        "National vaccination coverage report",
        source,
        &generated,
        &charts,
        &ranking_json,
    );

    Ok(BuiltReport {
        page,
        chart_titles: charts.into_iter().map(|c| c.title).collect(),
        table,
        wide_sheets: sheets.wide.len(),
        region_records: summary_table.records.len(),
    })
}
