use std::fs::File;
use std::path::Path;

use crate::data::export::{write_long_csv, write_wide_csv};
use crate::data::reshape::{concat_wide, melt, ReshapeError};
use crate::data::workbook::{describe_workbook, load_workbook};
use crate::report::{generate_report, ReportOptions};

pub const DEFAULT_REPORT_OUTPUT: &str = "coverage_report.html";
pub const DEFAULT_EXPORT_OUTPUT: &str = "coverage_long.csv";

const INSPECT_PREVIEW_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Report,
    Inspect,
    Export,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("report") => Some(Command::Report),
        Some("inspect") => Some(Command::Inspect),
        Some("export") => Some(Command::Export),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    match parse_command(args) {
        Some(Command::Report) => handle_report(args),
        Some(Command::Inspect) => handle_inspect(args),
        Some(Command::Export) => handle_export(args),
        None => {
            eprintln!("usage: vaxtrend <report|inspect|export>");
            2
        }
    }
}

fn handle_report(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: vaxtrend report <workbook.xlsx> [output.html]");
        return 2;
    };
    let output = args
        .get(3)
        .map(String::as_str)
        .unwrap_or(DEFAULT_REPORT_OUTPUT);

    match generate_report(Path::new(path), Path::new(output), &ReportOptions::default()) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(payload) => {
                println!("{payload}");
                0
            }
            Err(err) => {
                eprintln!("failed to serialize report summary: {err}");
                1
            }
        },
        Err(err) => {
            eprintln!("report generation failed at {err}");
            1
        }
    }
}

fn handle_inspect(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: vaxtrend inspect <workbook.xlsx>");
        return 2;
    };

    match describe_workbook(Path::new(path), INSPECT_PREVIEW_ROWS) {
        Ok(description) => {
            println!("{description}");
            0
        }
        Err(err) => {
            eprintln!("inspect failed: {err}");
            1
        }
    }
}

fn handle_export(args: &[String]) -> i32 {
    let Some(path) = args.get(2) else {
        eprintln!("usage: vaxtrend export <workbook.xlsx> [out.csv] [--wide]");
        return 2;
    };
    let wide_layout = args.iter().any(|arg| arg == "--wide");
    let output = args
        .get(3)
        .filter(|arg| !arg.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(DEFAULT_EXPORT_OUTPUT);

    match run_export(path, output, wide_layout) {
        Ok(rows) => {
            println!("exported {rows} rows to {output}");
            0
        }
        Err(err) => {
            eprintln!("export failed: {err}");
            1
        }
    }
}

fn run_export(
    path: &str,
    output: &str,
    wide_layout: bool,
) -> Result<usize, Box<dyn std::error::Error>> {
    let sheets = load_workbook(Path::new(path))?;
    let wide = concat_wide(&sheets.wide).map_err(ReshapeError::Format)?;
    let table = melt(&wide)?;

    let file = File::create(output)?;
    let rows = if wide_layout {
        write_wide_csv(&table, file)?
    } else {
        write_long_csv(&table, file)?
    };
    Ok(rows)
}
