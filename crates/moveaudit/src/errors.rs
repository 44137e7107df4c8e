//! Error categories and exit status for moveaudit
//!
//! Exit codes follow sysexits.h where one fits.

use moveaudit_common::{ConfigError, InferenceError};

/// Exit code for success, including an unparseable completion
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for configuration and I/O errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Exit code when the backend returned a malformed or error response
pub const EXIT_BACKEND_ERROR: i32 = 65;

/// Exit code when no input was supplied
pub const EXIT_NO_INPUT: i32 = 66;

/// Exit code when the backend could not be reached
pub const EXIT_BACKEND_UNAVAILABLE: i32 = 70;

/// Fatal failures, reported on stderr at the CLI boundary
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("no input: pass contract code or a description as an argument, a file path, or on stdin")]
    NoInput,

    #[error(transparent)]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::NoInput => EXIT_NO_INPUT,
            CliError::Inference(InferenceError::BackendUnavailable(_)) => EXIT_BACKEND_UNAVAILABLE,
            CliError::Inference(InferenceError::BackendError(_)) => EXIT_BACKEND_ERROR,
            CliError::Config(_) | CliError::Other(_) => EXIT_GENERAL_ERROR,
        }
    }

    /// Stable identifier for the invocation log
    pub fn code_name(&self) -> &'static str {
        match self {
            CliError::NoInput => "NoInput",
            CliError::Inference(InferenceError::BackendUnavailable(_)) => "BackendUnavailable",
            CliError::Inference(InferenceError::BackendError(_)) => "BackendError",
            CliError::Config(_) => "Config",
            CliError::Other(_) => "Other",
        }
    }
}
