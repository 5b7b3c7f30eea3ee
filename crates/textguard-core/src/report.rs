//! 报告渲染（文本 / JSON）
use std::fmt::Write as _;

use anyhow::Result;
use serde::Serialize;

use crate::types::{DirectoryReport, FileReport, FixReport, FixSummary, Issue, Severity};

fn severity_label(s: Severity) -> &'static str {
    match s {
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn write_issue(out: &mut String, issue: &Issue) {
    let sev = severity_label(issue.severity());
    let _ = match issue {
        Issue::Encoding { label } => writeln!(out, "  {sev}: not valid UTF-8 (detected: {label})"),
        Issue::Bom { kind } => writeln!(out, "  {sev}: byte order mark present ({kind})"),
        Issue::Emoji { occurrences } => {
            let _ = writeln!(out, "  {sev}: emoji found on {} line(s)", occurrences.len());
            for o in occurrences {
                let _ = writeln!(out, "    line {}: {}", o.line_number, o.line_text);
            }
            Ok(())
        }
        Issue::MissingDeclaration => writeln!(out, "  {sev}: missing encoding declaration at top of file"),
        Issue::Unreadable { reason } => writeln!(out, "  {sev}: unreadable: {reason}"),
    };
}

fn write_issues(out: &mut String, path: &std::path::Path, issues: &[Issue]) {
    let _ = writeln!(out, "[FAIL] {}", path.display());
    for issue in issues {
        write_issue(out, issue);
    }
}

pub fn render_file(report: &FileReport) -> String {
    let mut out = String::new();
    if report.passed {
        let _ = writeln!(out, "[PASS] {}", report.path.display());
    } else {
        write_issues(&mut out, &report.path, &report.issues);
    }
    out
}

pub fn render_directory(report: &DirectoryReport) -> String {
    let mut out = String::new();
    for (path, issues) in &report.invalid {
        write_issues(&mut out, path, issues);
    }
    let _ = writeln!(
        out,
        "checked {} file(s): {} valid, {} invalid",
        report.total,
        report.valid_paths.len(),
        report.invalid.len()
    );
    out
}

fn describe_changes(r: &FixReport) -> String {
    let mut parts = Vec::new();
    if !r.bom_removed.is_none() {
        parts.push(format!("remove {} BOM", r.bom_removed));
    }
    if r.emoji_replaced > 0 {
        parts.push(format!("replace {} emoji", r.emoji_replaced));
    }
    parts.join(", ")
}

pub fn render_fix(report: &FixReport) -> String {
    let path = report.path.display();
    match (&report.error, report.changed, report.written) {
        (Some(err), _, _) => format!("[ERROR] {path}: {err}\n"),
        (None, false, _) => format!("[UNCHANGED] {path}\n"),
        (None, true, true) => format!("[FIXED] {path}: {}\n", describe_changes(report)),
        (None, true, false) => format!("[PREVIEW] {path}: {}\n", describe_changes(report)),
    }
}

pub fn render_fix_summary(summary: &FixSummary) -> String {
    let mut out = String::new();
    for r in summary.reports.values().filter(|r| r.changed || r.error.is_some()) {
        out.push_str(&render_fix(r));
    }
    let _ = writeln!(
        out,
        "processed {} file(s): {} changed, {} failed",
        summary.total, summary.changed, summary.failed
    );
    out
}

/// 以格式化 JSON 输出任意报告
pub fn render_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}
