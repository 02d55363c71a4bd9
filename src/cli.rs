//! Text output for the covnorm binary.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::fmt::Write;

use crate::model::Coverage;
use crate::report::{format_ranges, Report};

/// `hits/total (pct%)`, or `n/a` when there is nothing to measure.
fn cell(coverage: Coverage) -> String {
    match coverage.percent() {
        Some(pct) => format!("{}/{} ({pct:.1}%)", coverage.hits, coverage.total),
        None => "n/a".to_string(),
    }
}

fn rating(coverage: Coverage) -> &'static str {
    coverage.rating().map_or("", |r| r.as_str())
}

pub fn cmd_summary(report: &Report) -> String {
    let mut out = String::new();
    writeln!(out, "{}", report.title).unwrap();
    if let Some(id) = &report.src_id {
        writeln!(out, "Source ID:  {id}").unwrap();
    }
    if let Some(id) = &report.test_id {
        writeln!(out, "Test ID:    {id}").unwrap();
    }
    writeln!(out, "Files:      {}", report.files.len()).unwrap();
    for (label, coverage) in [
        ("Lines:", report.lines),
        ("Functions:", report.funcs),
        ("Branches:", report.branches),
        ("Regions:", report.regions),
    ] {
        writeln!(out, "{label:<11} {:<24} {}", cell(coverage), rating(coverage))
            .unwrap();
    }
    out
}

pub fn cmd_files(report: &Report) -> String {
    let mut out = String::new();
    writeln!(
        out,
        "{:<50} {:>20} {:>20} {:>20} {:>20}  MISSED",
        "FILE", "LINES", "FUNCTIONS", "BRANCHES", "REGIONS"
    )
    .unwrap();
    writeln!(out, "{}", "-".repeat(141)).unwrap();

    for f in &report.files {
        writeln!(
            out,
            "{:<50} {:>20} {:>20} {:>20} {:>20}  {}",
            f.name,
            cell(f.lines),
            cell(f.funcs),
            cell(f.branches),
            cell(f.regions),
            format_ranges(&f.missed)
        )
        .unwrap();
    }
    out
}

pub fn cmd_functions(report: &Report) -> String {
    if report.functions.is_empty() {
        return "No function data.\n".to_string();
    }

    let mut out = String::new();
    writeln!(out, "{:<40} {:<50} {:>6} {:>10}", "FUNCTION", "FILE", "LINE", "HITS").unwrap();
    writeln!(out, "{}", "-".repeat(109)).unwrap();
    for f in &report.functions {
        let marker = if f.hit_count > 0 { "✓" } else { "✗" };
        writeln!(
            out,
            "{:<40} {:<50} {:>6} {:>10} {marker}",
            f.name, f.filename, f.start_line, f.hit_count
        )
        .unwrap();
    }
    out
}
