//! Chart construction: a [ChartSpec] plus a filtered view produce one
//! self-contained SVG chart. Marks carry their underlying row's fields both
//! as a `data-tip` attribute (for the page's tooltip layer) and as an SVG
//! `<title>`, so hovering works even without scripting.
//!
//! Missing y values are skipped outright: no interpolation and no zero
//! substitution happens here.

use std::error;
use std::fmt;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use crate::data::table::{CoverageRecord, RegionSummaryRecord};
use crate::report::svg::{color_for, escape_xml, fmt_number, nice_ticks, LinearScale};

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Line,
    StackedBar,
    FacetedLine { columns: usize },
}

/// One rendering request: a chart kind plus the encoding field names.
#[derive(Debug, Clone)]
pub struct ChartSpec {
    pub title: String,
    pub kind: ChartKind,
    pub x: &'static str,
    pub y: &'static str,
    /// Color for line charts, fill for stacked bars.
    pub color: &'static str,
    /// Panel field for [ChartKind::FacetedLine].
    pub facet: Option<&'static str>,
    /// Externally supplied x-category ordering for stacked bars. Categories
    /// present in the view but absent from the ordering are appended.
    pub category_order: Option<Vec<String>>,
}

/// A rendered chart, ready to embed in the report page.
#[derive(Debug, Clone)]
pub struct Chart {
    pub title: String,
    pub svg: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Date(NaiveDate),
    Number(f64),
    Text(String),
    Missing,
}

/// Field access for chart encodings, implemented by both record types.
pub trait PlotRecord {
    /// Value of a named field; `None` means the field does not exist.
    fn field(&self, name: &str) -> Option<FieldValue>;
    /// All fields of the row, for hover tooltips.
    fn tooltip(&self) -> Vec<(&'static str, String)>;
}

impl PlotRecord for CoverageRecord {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "country" => Some(FieldValue::Text(self.country.clone())),
            "iso3" => Some(FieldValue::Text(self.iso3.clone())),
            "vaccine" => Some(FieldValue::Text(self.vaccine.as_str().to_string())),
            "region" => Some(FieldValue::Text(self.region.clone())),
            "year" => Some(FieldValue::Date(self.date)),
            "coverage" => Some(match self.coverage {
                Some(value) => FieldValue::Number(value),
                None => FieldValue::Missing,
            }),
            _ => None,
        }
    }

    fn tooltip(&self) -> Vec<(&'static str, String)> {
        vec![
            ("country", self.country.clone()),
            ("iso3", self.iso3.clone()),
            ("vaccine", self.vaccine.as_str().to_string()),
            ("region", self.region.clone()),
            ("year", self.year().to_string()),
            (
                "coverage",
                self.coverage.map(fmt_number).unwrap_or_else(|| "no data".to_string()),
            ),
        ]
    }
}

impl PlotRecord for RegionSummaryRecord {
    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "region" => Some(FieldValue::Text(self.region.clone())),
            "vaccine" => Some(FieldValue::Text(self.vaccine.as_str().to_string())),
            "year" => Some(FieldValue::Date(self.date)),
            "coverage" => Some(match self.coverage {
                Some(value) => FieldValue::Number(value),
                None => FieldValue::Missing,
            }),
            _ => None,
        }
    }

    fn tooltip(&self) -> Vec<(&'static str, String)> {
        vec![
            ("region", self.region.clone()),
            ("vaccine", self.vaccine.as_str().to_string()),
            ("year", self.year().to_string()),
            (
                "coverage",
                self.coverage.map(fmt_number).unwrap_or_else(|| "no data".to_string()),
            ),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    EmptyView { chart: String },
    UnknownField { chart: String, field: String },
    NonNumericAxis { chart: String, field: String },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyView { chart } => write!(f, "chart '{chart}' has nothing to draw"),
            Self::UnknownField { chart, field } => {
                write!(f, "chart '{chart}' references unknown field '{field}'")
            }
            Self::NonNumericAxis { chart, field } => {
                write!(f, "chart '{chart}' needs numeric values in field '{field}'")
            }
        }
    }
}

impl error::Error for RenderError {}

/// Render a view through a spec into one SVG chart.
pub fn render<R: PlotRecord>(view: &[&R], spec: &ChartSpec) -> Result<Chart, RenderError> {
    if view.is_empty() {
        return Err(RenderError::EmptyView {
            chart: spec.title.clone(),
        });
    }
    let rows = plot_rows(view, spec)?;
    let svg = match spec.kind {
        ChartKind::Line => line_chart(&rows, spec)?,
        ChartKind::StackedBar => stacked_bar_chart(&rows, spec)?,
        ChartKind::FacetedLine { columns } => faceted_line_chart(&rows, spec, columns)?,
    };
    Ok(Chart {
        title: spec.title.clone(),
        svg,
    })
}

// ----- encoding extraction -----

struct PlotRow {
    x: FieldValue,
    /// None when the y field reported a missing value; the row is skipped.
    y: Option<f64>,
    series: String,
    facet: String,
    tip: String,
}

fn plot_rows<R: PlotRecord>(view: &[&R], spec: &ChartSpec) -> Result<Vec<PlotRow>, RenderError> {
    let mut rows = Vec::with_capacity(view.len());
    for record in view.iter().copied() {
        let x = lookup(record, spec.x, spec)?;
        let y = match lookup(record, spec.y, spec)? {
            FieldValue::Number(value) => Some(value),
            FieldValue::Missing => None,
            _ => {
                return Err(RenderError::NonNumericAxis {
                    chart: spec.title.clone(),
                    field: spec.y.to_string(),
                })
            }
        };
        let series = textual(&lookup(record, spec.color, spec)?);
        let facet = match spec.facet {
            Some(name) => textual(&lookup(record, name, spec)?),
            None => String::new(),
        };
        let tip = record
            .tooltip()
            .iter()
            .map(|(key, value)| format!("{key}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        rows.push(PlotRow {
            x,
            y,
            series,
            facet,
            tip,
        });
    }
    Ok(rows)
}

fn lookup<R: PlotRecord>(
    record: &R,
    field: &str,
    spec: &ChartSpec,
) -> Result<FieldValue, RenderError> {
    record.field(field).ok_or_else(|| RenderError::UnknownField {
        chart: spec.title.clone(),
        field: field.to_string(),
    })
}

fn numeric_x(row: &PlotRow, spec: &ChartSpec) -> Result<f64, RenderError> {
    match &row.x {
        FieldValue::Number(value) => Ok(*value),
        FieldValue::Date(date) => Ok(date.year() as f64),
        _ => Err(RenderError::NonNumericAxis {
            chart: spec.title.clone(),
            field: spec.x.to_string(),
        }),
    }
}

fn textual(value: &FieldValue) -> String {
    match value {
        FieldValue::Text(s) => s.trim().to_string(),
        FieldValue::Number(n) => fmt_number(*n),
        FieldValue::Date(d) => d.year().to_string(),
        FieldValue::Missing => String::new(),
    }
}

/// Distinct values in first-seen order.
fn first_seen(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

// ----- shared geometry -----

const WIDTH: f64 = 860.0;
const LEGEND_WIDTH: f64 = 170.0;
const MARGIN_LEFT: f64 = 54.0;
const MARGIN_TOP: f64 = 22.0;

/// Shared mark suffix: opens the tooltip attributes and embeds the SVG
/// `<title>`; the caller closes the element.
fn mark_suffix(tip: &str) -> String {
    let escaped = escape_xml(tip);
    format!("class=\"mark\" data-tip=\"{escaped}\"><title>{escaped}</title>")
}

fn legend(out: &mut String, series: &[String], x: f64, y: f64) {
    for (index, name) in series.iter().enumerate() {
        let sy = y + index as f64 * 18.0;
        let color = color_for(index);
        let _ = write!(
            out,
            "<rect x=\"{x}\" y=\"{sy}\" width=\"12\" height=\"12\" fill=\"{color}\"/>\
             <text x=\"{tx}\" y=\"{ty}\" class=\"lbl\">{name}</text>",
            tx = x + 17.0,
            ty = sy + 10.0,
            name = escape_xml(name),
        );
    }
}

fn y_axis(out: &mut String, scale: &LinearScale, max: f64, x0: f64, x1: f64) {
    for tick in nice_ticks(0.0, max, 5) {
        let y = scale.scale(tick);
        let _ = write!(
            out,
            "<line x1=\"{x0}\" y1=\"{y}\" x2=\"{x1}\" y2=\"{y}\" class=\"grid\"/>\
             <text x=\"{lx}\" y=\"{ly}\" class=\"lbl\" text-anchor=\"end\">{label}</text>",
            lx = x0 - 6.0,
            ly = y + 3.5,
            label = fmt_number(tick),
        );
    }
}

fn x_axis_years(out: &mut String, scale: &LinearScale, min: f64, max: f64, y: f64) {
    for tick in nice_ticks(min, max, 7) {
        let x = scale.scale(tick);
        let _ = write!(
            out,
            "<line x1=\"{x}\" y1=\"{y}\" x2=\"{x}\" y2=\"{y2}\" class=\"tick\"/>\
             <text x=\"{x}\" y=\"{ly}\" class=\"lbl\" text-anchor=\"middle\">{label}</text>",
            y2 = y + 5.0,
            ly = y + 18.0,
            label = fmt_number(tick),
        );
    }
}

// ----- line -----

fn line_chart(rows: &[PlotRow], spec: &ChartSpec) -> Result<String, RenderError> {
    let height = 360.0;
    let plot_right = WIDTH - LEGEND_WIDTH;
    let plot_bottom = height - 44.0;

    let series = first_seen(rows.iter().map(|r| r.series.clone()));
    let mut defined: Vec<(usize, f64, f64, &str)> = Vec::new();
    for row in rows {
        let x = numeric_x(row, spec)?;
        if let Some(y) = row.y {
            let index = series.iter().position(|s| *s == row.series).unwrap_or(0);
            defined.push((index, x, y, row.tip.as_str()));
        }
    }
    if defined.is_empty() {
        return Err(RenderError::EmptyView {
            chart: spec.title.clone(),
        });
    }

    let x_min = defined.iter().map(|d| d.1).fold(f64::INFINITY, f64::min);
    let x_max = defined.iter().map(|d| d.1).fold(f64::NEG_INFINITY, f64::max);
    let y_max = defined.iter().map(|d| d.2).fold(0.0, f64::max).max(1.0);

    let xs = LinearScale::new((x_min, x_max), (MARGIN_LEFT, plot_right));
    let ys = LinearScale::new((0.0, y_max * 1.05), (plot_bottom, MARGIN_TOP));

    let mut out = svg_open(WIDTH, height);
    y_axis(&mut out, &ys, y_max * 1.05, MARGIN_LEFT, plot_right);
    x_axis_years(&mut out, &xs, x_min, x_max, plot_bottom);
    let _ = write!(
        out,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{plot_bottom}\" x2=\"{plot_right}\" y2=\"{plot_bottom}\" class=\"axis\"/>"
    );

    for (index, _) in series.iter().enumerate() {
        let mut points: Vec<&(usize, f64, f64, &str)> =
            defined.iter().filter(|d| d.0 == index).collect();
        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        let color = color_for(index);
        if points.len() > 1 {
            let path: Vec<String> = points
                .iter()
                .map(|d| format!("{:.1},{:.1}", xs.scale(d.1), ys.scale(d.2)))
                .collect();
            let _ = write!(
                out,
                "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.8\"/>",
                path.join(" ")
            );
        }
        for d in points {
            let _ = write!(
                out,
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{color}\" {}</circle>",
                xs.scale(d.1),
                ys.scale(d.2),
                mark_suffix(d.3),
            );
        }
    }

    legend(&mut out, &series, plot_right + 18.0, MARGIN_TOP);
    out.push_str("</svg>");
    Ok(out)
}

// ----- stacked bar -----

fn stacked_bar_chart(rows: &[PlotRow], spec: &ChartSpec) -> Result<String, RenderError> {
    let height = 430.0;
    let plot_right = WIDTH - LEGEND_WIDTH;
    let plot_bottom = height - 96.0;

    let mut categories = spec.category_order.clone().unwrap_or_default();
    for row in rows {
        let category = textual(&row.x);
        if !categories.contains(&category) {
            categories.push(category);
        }
    }
    let series = first_seen(rows.iter().map(|r| r.series.clone()));

    // Stack totals drive the y domain.
    let mut totals = vec![0.0f64; categories.len()];
    for row in rows {
        let category = textual(&row.x);
        if let (Some(position), Some(y)) =
            (categories.iter().position(|c| *c == category), row.y)
        {
            totals[position] += y;
        }
    }
    let y_max = totals.iter().copied().fold(0.0, f64::max).max(1.0);
    let ys = LinearScale::new((0.0, y_max * 1.05), (plot_bottom, MARGIN_TOP));

    let slot = (plot_right - MARGIN_LEFT) / categories.len().max(1) as f64;
    let bar_width = slot * 0.68;

    let mut out = svg_open(WIDTH, height);
    y_axis(&mut out, &ys, y_max * 1.05, MARGIN_LEFT, plot_right);
    let _ = write!(
        out,
        "<line x1=\"{MARGIN_LEFT}\" y1=\"{plot_bottom}\" x2=\"{plot_right}\" y2=\"{plot_bottom}\" class=\"axis\"/>"
    );

    let mut cursor = vec![0.0f64; categories.len()];
    for (series_index, name) in series.iter().enumerate() {
        let color = color_for(series_index);
        for row in rows.iter().filter(|r| r.series == *name) {
            let category = textual(&row.x);
            let Some(position) = categories.iter().position(|c| *c == category) else {
                continue;
            };
            let Some(y) = row.y else { continue };
            let base = cursor[position];
            cursor[position] += y;
            let x = MARGIN_LEFT + position as f64 * slot + (slot - bar_width) / 2.0;
            let top = ys.scale(base + y);
            let bar_height = ys.scale(base) - top;
            let _ = write!(
                out,
                "<rect x=\"{x:.1}\" y=\"{top:.1}\" width=\"{bar_width:.1}\" height=\"{bar_height:.1}\" fill=\"{color}\" {}</rect>",
                mark_suffix(&row.tip),
            );
        }
    }

    for (position, category) in categories.iter().enumerate() {
        let x = MARGIN_LEFT + position as f64 * slot + slot / 2.0;
        let _ = write!(
            out,
            "<text x=\"{x:.1}\" y=\"{ly}\" class=\"lbl\" text-anchor=\"end\" transform=\"rotate(-40 {x:.1} {ly})\">{label}</text>",
            ly = plot_bottom + 14.0,
            label = escape_xml(category),
        );
    }

    legend(&mut out, &series, plot_right + 18.0, MARGIN_TOP);
    out.push_str("</svg>");
    Ok(out)
}

// ----- faceted line -----

fn faceted_line_chart(
    rows: &[PlotRow],
    spec: &ChartSpec,
    columns: usize,
) -> Result<String, RenderError> {
    let columns = columns.max(1);
    let facets = first_seen(rows.iter().map(|r| r.facet.clone()));
    let series = first_seen(rows.iter().map(|r| r.series.clone()));

    let mut defined: Vec<(usize, usize, f64, f64, &str)> = Vec::new();
    for row in rows {
        let x = numeric_x(row, spec)?;
        if let Some(y) = row.y {
            let facet = facets.iter().position(|f| *f == row.facet).unwrap_or(0);
            let serie = series.iter().position(|s| *s == row.series).unwrap_or(0);
            defined.push((facet, serie, x, y, row.tip.as_str()));
        }
    }
    if defined.is_empty() {
        return Err(RenderError::EmptyView {
            chart: spec.title.clone(),
        });
    }

    let x_min = defined.iter().map(|d| d.2).fold(f64::INFINITY, f64::min);
    let x_max = defined.iter().map(|d| d.2).fold(f64::NEG_INFINITY, f64::max);
    let y_max = defined.iter().map(|d| d.3).fold(0.0, f64::max).max(1.0);

    let grid_rows = (facets.len() + columns - 1) / columns;
    let panel_width = (WIDTH - LEGEND_WIDTH - MARGIN_LEFT - (columns as f64 - 1.0) * 16.0)
        / columns as f64;
    let panel_height = 150.0;
    let header = 18.0;
    let gap = 26.0;
    let height = MARGIN_TOP + grid_rows as f64 * (panel_height + header + gap);

    let mut out = svg_open(WIDTH, height);
    for (facet_index, facet) in facets.iter().enumerate() {
        let column = facet_index % columns;
        let row_index = facet_index / columns;
        let px = MARGIN_LEFT + column as f64 * (panel_width + 16.0);
        let py = MARGIN_TOP + row_index as f64 * (panel_height + header + gap) + header;

        let xs = LinearScale::new((x_min, x_max), (px + 4.0, px + panel_width - 4.0));
        let ys = LinearScale::new((0.0, y_max * 1.05), (py + panel_height, py));

        let _ = write!(
            out,
            "<text x=\"{tx:.1}\" y=\"{ty:.1}\" class=\"panel-title\" text-anchor=\"middle\">{label}</text>\
             <rect x=\"{px:.1}\" y=\"{py:.1}\" width=\"{panel_width:.1}\" height=\"{panel_height}\" class=\"panel\"/>",
            tx = px + panel_width / 2.0,
            ty = py - 5.0,
            label = escape_xml(facet),
        );
        let _ = write!(
            out,
            "<text x=\"{lx:.1}\" y=\"{ly:.1}\" class=\"lbl\" text-anchor=\"start\">{x0}</text>\
             <text x=\"{rx:.1}\" y=\"{ly:.1}\" class=\"lbl\" text-anchor=\"end\">{x1}</text>\
             <text x=\"{gx:.1}\" y=\"{gy:.1}\" class=\"lbl\" text-anchor=\"end\">{ymax}</text>",
            lx = px + 4.0,
            rx = px + panel_width - 4.0,
            ly = py + panel_height + 13.0,
            gx = px - 3.0,
            gy = py + 9.0,
            x0 = fmt_number(x_min),
            x1 = fmt_number(x_max),
            ymax = fmt_number(y_max * 1.05),
        );

        for (series_index, _) in series.iter().enumerate() {
            let mut points: Vec<&(usize, usize, f64, f64, &str)> = defined
                .iter()
                .filter(|d| d.0 == facet_index && d.1 == series_index)
                .collect();
            points.sort_by(|a, b| a.2.total_cmp(&b.2));
            let color = color_for(series_index);
            if points.len() > 1 {
                let path: Vec<String> = points
                    .iter()
                    .map(|d| format!("{:.1},{:.1}", xs.scale(d.2), ys.scale(d.3)))
                    .collect();
                let _ = write!(
                    out,
                    "<polyline points=\"{}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"1.4\"/>",
                    path.join(" ")
                );
            }
            for d in points {
                let _ = write!(
                    out,
                    "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"2.4\" fill=\"{color}\" {}</circle>",
                    xs.scale(d.2),
                    ys.scale(d.3),
                    mark_suffix(d.4),
                );
            }
        }
    }

    legend(&mut out, &series, WIDTH - LEGEND_WIDTH + 18.0, MARGIN_TOP);
    out.push_str("</svg>");
    Ok(out)
}

fn svg_open(width: f64, height: f64) -> String {
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"0 0 {width} {height}\" width=\"{width}\" height=\"{height}\" role=\"img\">"
    )
}
