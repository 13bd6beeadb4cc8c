use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_vaxtrend")
}

#[test]
fn bare_invocation_prints_usage_and_exits_2() {
    let output = Command::new(bin()).output().expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: vaxtrend <report|inspect|export>"));
}

#[test]
fn unknown_commands_exit_2() {
    let output = Command::new(bin())
        .arg("serve")
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn report_without_a_workbook_path_exits_2() {
    let output = Command::new(bin())
        .arg("report")
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("usage: vaxtrend report"));
}

#[test]
fn report_on_a_missing_workbook_fails_at_the_load_stage() {
    let output = Command::new(bin())
        .args(["report", "/nonexistent/coverage.xlsx", "/tmp/vaxtrend-report-test.html"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("report generation failed"));
    assert!(stderr.contains("load stage"));
}

#[test]
fn inspect_on_a_missing_workbook_exits_1() {
    let output = Command::new(bin())
        .args(["inspect", "/nonexistent/coverage.xlsx"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("inspect failed"));
}

#[test]
fn export_on_a_missing_workbook_exits_1() {
    let output = Command::new(bin())
        .args(["export", "/nonexistent/coverage.xlsx", "/tmp/vaxtrend-export-test.csv"])
        .output()
        .expect("binary should run");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("export failed"));
}
