//! Result types shared by the audit and generation pipelines
//!
//! Everything here is created per invocation and dropped after printing.
//! A completion that parses as a JSON object is kept as-is; typed fields
//! are read from it leniently, defaulting to empty or absent.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::fmt;

/// Fixed reason carried by every extraction failure
pub const EXTRACTION_FAILURE_REASON: &str = "could not parse model output";

/// Summary text printed alongside an extraction failure
pub const EXTRACTION_FAILURE_SUMMARY: &str = "Analysis failed";

/// Finding severity as reported by the model
///
/// Known levels are matched case-insensitively. Anything else is kept
/// verbatim so a report round-trips without schema enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other(String),
}

impl Severity {
    /// Display order used by the text report
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::High => 1,
            Severity::Medium => 2,
            Severity::Low => 3,
            Severity::Other(_) => 4,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::Other(s) => s,
        }
    }
}

impl From<String> for Severity {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Other(s),
        }
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        match s {
            Severity::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit finding
///
/// A read-only view over one element of the report's `issues` array. Fields
/// with an unexpected JSON type read as empty or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_fix: Option<String>,
}

impl Issue {
    /// Lenient view of one `issues` element
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                title: string_field(map, "title").unwrap_or_default(),
                severity: string_field(map, "severity").map(Severity::from),
                description: string_field(map, "description").unwrap_or_default(),
                code_snippet: string_field(map, "codeSnippet"),
                suggested_fix: string_field(map, "suggestedFix"),
            },
            Value::String(title) => Self {
                title: title.clone(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Structured audit result recovered from a completion
///
/// `document` is the parsed object exactly as the model produced it and is
/// what gets serialised. `summary` and `issues` are lenient views over it
/// used for scoring and the text report.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub summary: String,
    pub issues: Vec<Issue>,
    document: Value,
}

impl AnalysisReport {
    /// Build a report from typed parts
    pub fn new(summary: impl Into<String>, issues: Vec<Issue>) -> Self {
        let summary = summary.into();
        let document = json!({
            "summary": summary,
            "issues": issues,
        });
        Self {
            summary,
            issues,
            document,
        }
    }

    /// Wrap a parsed completion object without reshaping it
    pub fn from_document(document: Value) -> Self {
        let summary = document
            .get("summary")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let issues = document
            .get("issues")
            .and_then(Value::as_array)
            .map(|items| items.iter().map(Issue::from_value).collect())
            .unwrap_or_default();
        Self {
            summary,
            issues,
            document,
        }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }
}

impl Default for AnalysisReport {
    fn default() -> Self {
        Self::new(String::new(), Vec::new())
    }
}

impl Serialize for AnalysisReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Sentinel outcome for a completion that could not be parsed
///
/// This is a normal result, printed like a report, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractionFailure {
    #[serde(rename = "error")]
    pub reason: String,
    pub summary: String,
    pub issues: Vec<Issue>,
}

impl Default for ExtractionFailure {
    fn default() -> Self {
        Self {
            reason: EXTRACTION_FAILURE_REASON.to_string(),
            summary: EXTRACTION_FAILURE_SUMMARY.to_string(),
            issues: Vec::new(),
        }
    }
}

/// Terminal result of the audit pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AuditOutcome {
    Report(AnalysisReport),
    Failure(ExtractionFailure),
}

impl AuditOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, AuditOutcome::Failure(_))
    }

    pub fn summary(&self) -> &str {
        match self {
            AuditOutcome::Report(r) => &r.summary,
            AuditOutcome::Failure(f) => &f.summary,
        }
    }

    pub fn issues(&self) -> &[Issue] {
        match self {
            AuditOutcome::Report(r) => &r.issues,
            AuditOutcome::Failure(f) => &f.issues,
        }
    }
}

/// Source text produced by the generation pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCode(pub String);

impl GeneratedCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for GeneratedCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
