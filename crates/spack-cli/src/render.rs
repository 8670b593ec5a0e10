//! Console rendering for `spatialpack validate`.

use std::fmt::Write as _;
use std::path::Path;

use spack_core::Finding;
use spack_pack::{ConformanceReport, ReportStatus};

const HEADERS: [&str; 3] = ["Rule", "Message", "Path"];

/// Header printed before validation starts.
pub fn render_header(pack_path: &Path, run_id: &str) -> String {
    format!("Validating pack: {}\nRun ID: {run_id}\n", pack_path.display())
}

/// Status banner, findings tables, and summary line.
pub fn render_report(report: &ConformanceReport) -> String {
    let mut out = String::new();
    let banner = match report.status {
        ReportStatus::Pass => "PASS All checks passed",
        ReportStatus::Warn => "WARN Validation passed with warnings",
        ReportStatus::Fail => "FAIL Validation failed",
    };
    let _ = writeln!(out, "{banner}\n");

    if !report.errors.is_empty() {
        out.push_str(&render_table("Errors", &report.errors));
        out.push('\n');
    }
    if !report.warnings.is_empty() {
        out.push_str(&render_table("Warnings", &report.warnings));
        out.push('\n');
    }

    let summary = &report.summary;
    let _ = writeln!(
        out,
        "Summary: {} errors, {} warnings, {} layers validated",
        summary.errors, summary.warnings, summary.layers_validated
    );
    out
}

/// A titled three-column table, columns padded to their widest cell.
pub fn render_table(title: &str, findings: &[Finding]) -> String {
    let rows: Vec<[&str; 3]> = findings
        .iter()
        .map(|f| [f.rule.as_str(), f.message.as_str(), f.path.as_str()])
        .collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    push_row(&mut out, &HEADERS, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let _ = writeln!(out, "{}", rule.join("  "));
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out
}

fn push_row(out: &mut String, cells: &[&str; 3], widths: &[usize; 3]) {
    let line = format!(
        "{:<w0$}  {:<w1$}  {}",
        cells[0],
        cells[1],
        cells[2],
        w0 = widths[0],
        w1 = widths[1]
    );
    let _ = writeln!(out, "{}", line.trim_end());
}
