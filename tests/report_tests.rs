//! Renderer and report assembly: chart SVG contents, stage tagging, and the
//! end-to-end page build over an in-memory workbook.

use chrono::NaiveDate;
use vaxtrend::data::table::CoverageRecord;
use vaxtrend::data::vocab::VaccineCode;
use vaxtrend::data::workbook::{Cell, SheetTable, WorkbookSheets};
use vaxtrend::report::{
    build_report, generate_report, render, ChartKind, ChartSpec, RenderError, ReportOptions,
};

fn record(country: &str, iso3: &str, year: i32, coverage: Option<f64>) -> CoverageRecord {
    CoverageRecord {
        country: country.to_string(),
        iso3: iso3.to_string(),
        vaccine: VaccineCode::Dtp3,
        region: "Africa".to_string(),
        date: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
        coverage,
    }
}

fn line_spec() -> ChartSpec {
    ChartSpec {
        title: "DTP3 trend".to_string(),
        kind: ChartKind::Line,
        x: "year",
        y: "coverage",
        color: "country",
        facet: None,
        category_order: None,
    }
}

#[test]
fn line_chart_skips_missing_points_without_substitution() {
    let records = vec![
        record("Chad", "TCD", 2019, Some(50.0)),
        record("Chad", "TCD", 2020, None),
        record("Chad", "TCD", 2021, Some(60.0)),
    ];
    let view: Vec<&CoverageRecord> = records.iter().collect();

    let chart = render(&view, &line_spec()).expect("line chart renders");
    assert_eq!(chart.svg.matches("<circle").count(), 2, "the missing year draws no mark");
    assert!(chart.svg.contains("data-tip=\"country: Chad"));
    assert!(chart.svg.contains("<title>"));
}

#[test]
fn rendering_an_empty_view_is_an_error() {
    let view: Vec<&CoverageRecord> = Vec::new();
    match render(&view, &line_spec()) {
        Err(RenderError::EmptyView { chart }) => assert_eq!(chart, "DTP3 trend"),
        other => panic!("expected EmptyView, got {other:?}"),
    }
}

#[test]
fn unknown_encoding_fields_are_reported() {
    let records = vec![record("Chad", "TCD", 2021, Some(60.0))];
    let view: Vec<&CoverageRecord> = records.iter().collect();
    let spec = ChartSpec {
        x: "decade",
        ..line_spec()
    };

    match render(&view, &spec) {
        Err(RenderError::UnknownField { field, .. }) => assert_eq!(field, "decade"),
        other => panic!("expected UnknownField, got {other:?}"),
    }
}

#[test]
fn stacked_bars_follow_the_supplied_category_order() {
    let records = vec![
        record("Chad", "TCD", 2021, Some(60.0)),
        record("Mali", "MLI", 2021, Some(20.0)),
        record("Peru", "PER", 2021, Some(90.0)),
    ];
    let view: Vec<&CoverageRecord> = records.iter().collect();
    let spec = ChartSpec {
        title: "Totals".to_string(),
        kind: ChartKind::StackedBar,
        x: "country",
        y: "coverage",
        color: "vaccine",
        facet: None,
        category_order: Some(vec![
            "Mali".to_string(),
            "Chad".to_string(),
            "Peru".to_string(),
        ]),
    };

    let chart = render(&view, &spec).expect("stacked bar renders");
    let mali = chart.svg.find(">Mali</text>").expect("Mali label present");
    let chad = chart.svg.find(">Chad</text>").expect("Chad label present");
    let peru = chart.svg.find(">Peru</text>").expect("Peru label present");
    assert!(mali < chad && chad < peru, "labels follow the supplied order");
    assert_eq!(chart.svg.matches("class=\"mark\"").count(), 3);
}

#[test]
fn faceted_lines_draw_one_panel_per_facet_value() {
    let records = vec![
        record("Chad", "TCD", 2020, Some(50.0)),
        record("Chad", "TCD", 2021, Some(55.0)),
        record("Mali", "MLI", 2020, Some(40.0)),
        record("Mali", "MLI", 2021, Some(42.0)),
    ];
    let view: Vec<&CoverageRecord> = records.iter().collect();
    let spec = ChartSpec {
        title: "Per country".to_string(),
        kind: ChartKind::FacetedLine { columns: 2 },
        x: "year",
        y: "coverage",
        color: "vaccine",
        facet: Some("country"),
        category_order: None,
    };

    let chart = render(&view, &spec).expect("faceted chart renders");
    assert_eq!(chart.svg.matches("panel-title").count(), 2);
    assert_eq!(chart.svg.matches("<circle").count(), 4);
}

// ----- report assembly -----

fn wide_fixture() -> SheetTable {
    let countries: [(&str, &str, f64); 10] = [
        ("Afghanistan", "AFG", 60.0),
        ("Iraq", "IRQ", 55.0),
        ("Syria", "SYR", 45.0),
        ("Chad", "TCD", 40.0),
        ("Mali", "MLI", 35.0),
        ("Peru", "PER", 85.0),
        ("Brazil", "BRA", 88.0),
        ("Kenya", "KEN", 75.0),
        ("India", "IND", 82.0),
        ("Japan", "JPN", 97.0),
    ];

    let mut header: Vec<String> = ["country", "iso3", "vaccine", "region"]
        .iter()
        .map(|c| c.to_string())
        .collect();
    header.extend(["2019", "2020", "2021"].iter().map(|y| y.to_string()));

    let rows = countries
        .iter()
        .map(|(country, iso3, base)| {
            vec![
                Cell::Text(country.to_string()),
                Cell::Text(iso3.to_string()),
                Cell::Text("DTP3".to_string()),
                Cell::Text("Africa".to_string()),
                Cell::Number(*base),
                Cell::Number(*base + 1.0),
                Cell::Number(*base + 2.0),
            ]
        })
        .collect();

    SheetTable {
        name: "DTP3".to_string(),
        header,
        rows,
    }
}

fn aggregate_fixture(region: &str) -> SheetTable {
    SheetTable {
        name: "regional_global".to_string(),
        header: vec![
            "region".to_string(),
            "vaccine".to_string(),
            "2019".to_string(),
            "2020".to_string(),
            "2021".to_string(),
        ],
        rows: vec![vec![
            Cell::Text(region.to_string()),
            Cell::Text("DTP3".to_string()),
            Cell::Number(78.0),
            Cell::Number(79.0),
            Cell::Number(80.0),
        ]],
    }
}

#[test]
fn build_report_renders_every_chart_into_the_page() {
    let sheets = WorkbookSheets {
        wide: vec![wide_fixture()],
        aggregate: aggregate_fixture("Global"),
    };

    let built = build_report(&sheets, "coverage.xlsx", &ReportOptions::default())
        .expect("fixture workbook builds a report");

    assert_eq!(built.chart_titles.len(), 6);
    assert_eq!(built.table.records.len(), 10 * 3);
    assert_eq!(built.region_records, 3);
    for title in &built.chart_titles {
        assert!(built.page.contains(title.as_str()), "page should embed '{title}'");
    }
    assert!(built.page.contains("id=\"ranking-data\""));
    assert!(built.page.contains("Japan"), "ranking payload lists the top country");

    // Top/bottom split of the default 8: Japan ranks top, Mali bottom.
    assert!(built.chart_titles.contains(&"Top 4 countries by median coverage".to_string()));
    assert!(built
        .chart_titles
        .contains(&"Bottom 4 countries by median coverage".to_string()));
    assert!(built
        .chart_titles
        .contains(&"Lowest total reported coverage, 2021".to_string()));
}

#[test]
fn missing_global_rows_fail_at_the_filter_stage() {
    let sheets = WorkbookSheets {
        wide: vec![wide_fixture()],
        aggregate: aggregate_fixture("AFR"),
    };

    let err = build_report(&sheets, "coverage.xlsx", &ReportOptions::default()).unwrap_err();
    assert_eq!(err.stage(), "filter");
    assert!(err.to_string().contains("Global"));
}

#[test]
fn mismatched_wide_sheets_fail_at_the_reshape_stage() {
    let mut odd = wide_fixture();
    odd.name = "MCV1".to_string();
    odd.header.push("2022".to_string());

    let sheets = WorkbookSheets {
        wide: vec![wide_fixture(), odd],
        aggregate: aggregate_fixture("Global"),
    };

    let err = build_report(&sheets, "coverage.xlsx", &ReportOptions::default()).unwrap_err();
    assert_eq!(err.stage(), "reshape");
}

#[test]
fn missing_workbooks_fail_at_the_load_stage() {
    let err = generate_report(
        std::path::Path::new("/nonexistent/coverage.xlsx"),
        std::path::Path::new("/tmp/should-not-exist.html"),
        &ReportOptions::default(),
    )
    .unwrap_err();
    assert_eq!(err.stage(), "load");
}
