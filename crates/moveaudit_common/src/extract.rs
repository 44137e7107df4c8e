//! Result extraction from raw model completions
//!
//! Models do not reliably honor output-format instructions, so both
//! extractors trade precision for robustness and never fail:
//!
//! Audit, first match wins:
//! 1. interior of the first "```json" fenced block
//! 2. otherwise a brace span picked by [`BraceStrategy`]
//! 3. parse the candidate as a JSON object, kept unchanged as an
//!    [`AnalysisReport`] whatever its fields contain
//! 4. anything else yields [`ExtractionFailure`]
//!
//! Generation: everything from the first `"module "` marker, or the whole
//! completion when the marker is absent.
//!
//! The greedy brace span is the default and keeps its known weakness:
//! literal braces in prose around the object widen the candidate and the
//! parse falls back to a failure. The balanced scan is an explicit opt-in
//! occupying the same step.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::types::{AnalysisReport, AuditOutcome, ExtractionFailure, GeneratedCode};

/// Opening marker of a labeled JSON fence (label compared case-insensitively)
const FENCE: &str = "```";
const JSON_LABEL: &str = "json";

/// Marker that begins a Move top-level module declaration
pub const MODULE_MARKER: &str = "module ";

/// How the brace-span fallback picks its candidate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BraceStrategy {
    /// First `{` to last `}` in the whole text, inclusive
    #[default]
    Greedy,
    /// First nesting-balanced `{...}` span that is valid JSON
    Balanced,
}

impl BraceStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BraceStrategy::Greedy => "greedy",
            BraceStrategy::Balanced => "balanced",
        }
    }

    fn candidate<'a>(&self, text: &'a str) -> Option<&'a str> {
        match self {
            BraceStrategy::Greedy => greedy_brace_span(text),
            BraceStrategy::Balanced => balanced_brace_span(text),
        }
    }
}

impl FromStr for BraceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "greedy" => Ok(BraceStrategy::Greedy),
            "balanced" => Ok(BraceStrategy::Balanced),
            other => Err(format!(
                "unknown extraction strategy '{}' (expected greedy or balanced)",
                other
            )),
        }
    }
}

/// Recover an audit report from a completion
pub fn extract_analysis(raw: &str, strategy: BraceStrategy) -> AuditOutcome {
    let candidate = match fenced_json(raw) {
        Some(body) => {
            debug!("Extractor: using labeled json fence ({} bytes)", body.len());
            Some(body)
        }
        None => {
            let span = strategy.candidate(raw);
            if let Some(s) = span {
                debug!(
                    "Extractor: using {} brace span ({} bytes)",
                    strategy.as_str(),
                    s.len()
                );
            }
            span
        }
    };

    let Some(candidate) = candidate else {
        warn!("Extractor: no JSON-like content in completion");
        return AuditOutcome::Failure(ExtractionFailure::default());
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(document) if document.is_object() => {
            let report = AnalysisReport::from_document(document);
            info!("Extractor: parsed report with {} issues", report.issues.len());
            AuditOutcome::Report(report)
        }
        Ok(other) => {
            warn!("Extractor: candidate is JSON but not an object: {}", json_kind(&other));
            AuditOutcome::Failure(ExtractionFailure::default())
        }
        Err(e) => {
            warn!("Extractor: candidate did not parse: {}", e);
            AuditOutcome::Failure(ExtractionFailure::default())
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Recover generated source from a completion
pub fn extract_code(raw: &str) -> GeneratedCode {
    match raw.find(MODULE_MARKER) {
        Some(start) => {
            debug!("Extractor: module marker at byte {}", start);
            GeneratedCode(raw[start..].to_string())
        }
        None => {
            warn!("Extractor: no module marker, returning completion unmodified");
            GeneratedCode(raw.to_string())
        }
    }
}

/// Interior of the first "```json" block, if it is closed
///
/// An unterminated labeled fence produces no candidate.
fn fenced_json(text: &str) -> Option<&str> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(FENCE) {
        let open = from + rel;
        let after = &text[open + FENCE.len()..];
        let labeled = after
            .get(..JSON_LABEL.len())
            .is_some_and(|l| l.eq_ignore_ascii_case(JSON_LABEL))
            && after[JSON_LABEL.len()..]
                .chars()
                .next()
                .map_or(true, |c| c.is_whitespace() || c == '{');

        if labeled {
            let body = &after[JSON_LABEL.len()..];
            let close = body.find(FENCE)?;
            return Some(body[..close].trim());
        }
        from = open + FENCE.len();
    }
    None
}

fn greedy_brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn balanced_brace_span(text: &str) -> Option<&str> {
    text.match_indices('{').find_map(|(start, _)| {
        let end = matching_close(&text[start..])?;
        let span = &text[start..=start + end];
        serde_json::from_str::<Value>(span)
            .ok()
            .filter(|v| v.is_object())
            .map(|_| span)
    })
}

/// Byte offset of the `}` closing the `{` at offset 0, string-aware
fn matching_close(s: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, b) in s.bytes().enumerate() {
        if in_string {
            match b {
                _ if escaped => escaped = false,
                b'\\' => escaped = true,
                b'"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
