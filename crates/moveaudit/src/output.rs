//! Output rendering
//!
//! stdout carries exactly one result document. The raw completion and all
//! other diagnostics go to stderr.

use anyhow::Result;
use moveaudit_common::scoring::{risk_level, security_score, SeverityCounts};
use moveaudit_common::{AuditOutcome, Issue, Severity};
use owo_colors::OwoColorize;
use std::fmt;
use std::io::{self, Write as _};
use tracing::debug;

const RULE: &str =
    "────────────────────────────────────────────────────────────────────────────────";

/// Print the raw backend completion to stderr, framed
pub fn print_raw_response(backend: &str, raw: &str) {
    let mut stderr = std::io::stderr().lock();
    if let Err(e) = write_raw_frame(&mut stderr, backend, raw).and_then(|_| stderr.flush()) {
        debug!("Raw response not printed: {}", e);
    }
}

fn write_raw_frame(w: &mut impl io::Write, backend: &str, raw: &str) -> io::Result<()> {
    writeln!(w, "{}", RULE)?;
    writeln!(w, "[{}] raw response ({} chars)", backend, raw.chars().count())?;
    writeln!(w, "{}", RULE)?;
    for line in raw.lines() {
        writeln!(w, "  {}", line)?;
    }
    writeln!(w, "{}", RULE)
}

/// Audit result as pretty JSON (2-space indentation)
pub fn render_json(outcome: &AuditOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// Human-readable audit report
pub fn render_text(
    outcome: &AuditOutcome,
    contract_name: Option<&str>,
    color: bool,
) -> Result<String> {
    let mut out = String::new();
    write_report(&mut out, outcome, contract_name, color)?;
    Ok(out)
}

fn write_report(
    out: &mut impl fmt::Write,
    outcome: &AuditOutcome,
    contract_name: Option<&str>,
    color: bool,
) -> fmt::Result {
    let name = contract_name.unwrap_or("(unnamed contract)");

    writeln!(out, "{}\n", heading("AUDIT REPORT", color))?;
    writeln!(out, "Contract: {}", name)?;

    if let AuditOutcome::Failure(failure) = outcome {
        writeln!(out, "Result: {}", failure.reason)?;
        writeln!(out, "\n{}\n", heading("SUMMARY", color))?;
        return writeln!(out, "{}", failure.summary);
    }

    let issues = outcome.issues();
    let counts = SeverityCounts::from_issues(issues);
    writeln!(
        out,
        "Security Score: {}/100 ({} risk)",
        security_score(issues),
        risk_level(&counts)
    )?;
    writeln!(
        out,
        "Issues Found: {} ({} critical, {} high, {} medium, {} low, {} other)",
        counts.total(),
        counts.critical,
        counts.high,
        counts.medium,
        counts.low,
        counts.other
    )?;

    writeln!(out, "\n{}\n", heading("SUMMARY", color))?;
    writeln!(out, "{}", outcome.summary())?;

    if issues.is_empty() {
        return Ok(());
    }

    writeln!(out, "\n{}", heading("FINDINGS", color))?;
    for (label, group) in group_by_severity(issues) {
        let title = format!("{} Severity Issues ({})", label, group.len());
        writeln!(out, "\n{}", paint_severity(&title, group[0].severity.as_ref(), color))?;
        for (i, issue) in group.iter().enumerate() {
            writeln!(out, "\n{}. {}", i + 1, issue.title)?;
            if !issue.description.is_empty() {
                writeln!(out, "   {}", issue.description)?;
            }
            if let Some(snippet) = &issue.code_snippet {
                writeln!(out, "   Code:")?;
                write_indented(out, snippet)?;
            }
            if let Some(fix) = &issue.suggested_fix {
                writeln!(out, "   Suggested fix:")?;
                write_indented(out, fix)?;
            }
        }
    }
    Ok(())
}

fn severity_label(severity: Option<&Severity>) -> String {
    severity.map_or_else(|| "Unrated".to_string(), |s| s.to_string())
}

/// Issues grouped Critical, High, Medium, Low, then everything else
fn group_by_severity(issues: &[Issue]) -> Vec<(String, Vec<&Issue>)> {
    let mut sorted: Vec<&Issue> = issues.iter().collect();
    sorted.sort_by_key(|i| {
        let rank = i.severity.as_ref().map_or(u8::MAX, Severity::rank);
        (rank, severity_label(i.severity.as_ref()))
    });

    let mut groups: Vec<(String, Vec<&Issue>)> = Vec::new();
    for issue in sorted {
        let label = severity_label(issue.severity.as_ref());
        if let Some((last, members)) = groups.last_mut() {
            if *last == label {
                members.push(issue);
                continue;
            }
        }
        groups.push((label, vec![issue]));
    }
    groups
}

fn write_indented(out: &mut impl fmt::Write, text: &str) -> fmt::Result {
    for line in text.lines() {
        writeln!(out, "      {}", line)?;
    }
    Ok(())
}

fn heading(text: &str, color: bool) -> String {
    if color {
        text.bold().to_string()
    } else {
        text.to_string()
    }
}

fn paint_severity(text: &str, severity: Option<&Severity>, color: bool) -> String {
    if !color {
        return text.to_string();
    }
    match severity {
        Some(Severity::Critical) => text.red().bold().to_string(),
        Some(Severity::High) => text.truecolor(255, 165, 0).bold().to_string(),
        Some(Severity::Medium) => text.yellow().bold().to_string(),
        Some(Severity::Low) => text.blue().bold().to_string(),
        Some(Severity::Other(_)) | None => text.dimmed().to_string(),
    }
}
