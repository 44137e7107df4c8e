//! Security score and risk level for an audit report
//!
//! Score starts at 100 and loses points per finding:
//! Critical 25, High 15, Medium 10, Low 5, Info 1. Unknown and missing
//! severities cost nothing. Floor is 0.

use serde::Serialize;
use std::fmt;

use crate::types::{Issue, Severity};

const PERFECT_SCORE: u32 = 100;

/// The one non-standard severity that still costs a point
const INFO: &str = "Info";

/// Per-severity finding counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    /// Informational or unrecognised severities, including missing ones
    pub other: usize,
}

impl SeverityCounts {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut counts = Self::default();
        for issue in issues {
            match issue.severity {
                Some(Severity::Critical) => counts.critical += 1,
                Some(Severity::High) => counts.high += 1,
                Some(Severity::Medium) => counts.medium += 1,
                Some(Severity::Low) => counts.low += 1,
                Some(Severity::Other(_)) | None => counts.other += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.critical + self.high + self.medium + self.low + self.other
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        };
        f.write_str(s)
    }
}

fn deduction(severity: Option<&Severity>) -> u32 {
    match severity {
        Some(Severity::Critical) => 25,
        Some(Severity::High) => 15,
        Some(Severity::Medium) => 10,
        Some(Severity::Low) => 5,
        Some(Severity::Other(s)) if s.trim().eq_ignore_ascii_case(INFO) => 1,
        Some(Severity::Other(_)) | None => 0,
    }
}

/// 0..=100, higher is safer
pub fn security_score(issues: &[Issue]) -> u32 {
    let lost: u32 = issues
        .iter()
        .map(|i| deduction(i.severity.as_ref()))
        .sum();
    PERFECT_SCORE.saturating_sub(lost)
}

pub fn risk_level(counts: &SeverityCounts) -> RiskLevel {
    if counts.critical > 0 || counts.high > 1 {
        RiskLevel::High
    } else if counts.high == 1 || counts.medium > 1 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
