//! Logging for moveaudit invocations
//!
//! Diagnostics go to stderr through `tracing`. When `$MOVEAUDIT_LOG_FILE` is
//! set, each invocation also appends one JSON line to that file.

use serde::Serialize;
use std::fs::OpenOptions;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use crate::errors::CliError;

/// Environment variable holding a tracing filter directive
pub const LOG_FILTER_ENV: &str = "MOVEAUDIT_LOG";

/// Environment variable naming the invocation log file
pub const LOG_FILE_ENV: &str = "MOVEAUDIT_LOG_FILE";

/// Install the stderr subscriber
pub fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .try_init();
}

/// Log entry for each moveaudit invocation
#[derive(Debug, Serialize)]
pub struct InvocationLog {
    /// ISO 8601 timestamp
    pub ts: String,

    /// Request ID (UUID)
    pub req_id: String,

    pub command: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    pub exit_code: i32,

    pub duration_ms: u64,

    pub ok: bool,

    /// `report`, `extraction_failure` or `code`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetails>,

    #[serde(skip)]
    started: Option<Instant>,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
}

impl InvocationLog {
    pub fn start(command: &str) -> Self {
        Self {
            ts: chrono::Utc::now().to_rfc3339(),
            req_id: uuid::Uuid::new_v4().to_string(),
            command: command.to_string(),
            backend: None,
            model: None,
            exit_code: 0,
            duration_ms: 0,
            ok: true,
            outcome: None,
            error: None,
            started: Some(Instant::now()),
        }
    }

    pub fn record_error(&mut self, err: &CliError) {
        self.ok = false;
        self.error = Some(ErrorDetails {
            code: err.code_name().to_string(),
            message: format!("{:#}", err),
        });
    }

    /// Stamp exit code and duration, then append to `$MOVEAUDIT_LOG_FILE` if set
    pub fn finish(mut self, exit_code: i32) {
        self.exit_code = exit_code;
        self.ok = self.ok && exit_code == 0;
        if let Some(started) = self.started {
            self.duration_ms = started.elapsed().as_millis() as u64;
        }

        if let Some(path) = std::env::var_os(LOG_FILE_ENV).filter(|p| !p.is_empty()) {
            // A broken log file never changes the command's outcome
            if let Err(e) = self.write_to(Path::new(&path)) {
                tracing::debug!("Invocation log not written: {}", e);
            }
        }
    }

    /// Append this entry as one JSON line
    pub fn write_to(&self, path: &Path) -> Result<(), std::io::Error> {
        let json = serde_json::to_string(self)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moveaudit_common::InferenceError;

    #[test]
    fn test_entry_appended_as_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/moveaudit.jsonl");

        let mut first = InvocationLog::start("audit");
        first.outcome = Some("report".to_string());
        first.write_to(&path).unwrap();

        let mut second = InvocationLog::start("generate");
        second.record_error(&CliError::from(InferenceError::BackendUnavailable(
            "refused".to_string(),
        )));
        second.write_to(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["command"], "audit");
        assert_eq!(lines[0]["outcome"], "report");
        assert!(lines[0].get("error").is_none());
        assert_eq!(lines[1]["ok"], false);
        assert_eq!(lines[1]["error"]["code"], "BackendUnavailable");
        assert_ne!(lines[0]["req_id"], lines[1]["req_id"]);
    }
}
