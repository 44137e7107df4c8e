//! Input resolution: file path, literal argument, or stdin

use anyhow::Context;
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::CliError;

/// Where the content came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    File(PathBuf),
    Argument,
    Stdin,
}

#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub content: String,
    pub source: InputSource,
}

impl ResolvedInput {
    /// File stem for file inputs, used as the contract name in reports
    pub fn contract_name(&self) -> Option<String> {
        match &self.source {
            InputSource::File(path) => path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned()),
            _ => None,
        }
    }
}

/// Resolve input from the positional argument or the process stdin
pub fn resolve(arg: Option<&str>) -> Result<ResolvedInput, CliError> {
    let stdin = std::io::stdin();
    let is_terminal = stdin.is_terminal();
    resolve_from(arg, stdin.lock(), is_terminal)
}

/// Resolution with an injectable stdin
///
/// An argument naming an existing file wins over its literal text. Blank
/// content from any source is `NoInput`.
pub fn resolve_from<R: Read>(
    arg: Option<&str>,
    mut stdin: R,
    stdin_is_terminal: bool,
) -> Result<ResolvedInput, CliError> {
    let resolved = match arg {
        Some(a) if Path::new(a).is_file() => {
            let path = PathBuf::from(a);
            if path.extension().and_then(|e| e.to_str()) != Some("move") {
                warn!("Input {} does not have a .move extension", path.display());
            }
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            ResolvedInput {
                content,
                source: InputSource::File(path),
            }
        }
        Some(a) => ResolvedInput {
            content: a.to_string(),
            source: InputSource::Argument,
        },
        None if stdin_is_terminal => return Err(CliError::NoInput),
        None => {
            let mut content = String::new();
            stdin
                .read_to_string(&mut content)
                .context("failed to read stdin")?;
            ResolvedInput {
                content,
                source: InputSource::Stdin,
            }
        }
    };

    if resolved.content.trim().is_empty() {
        return Err(CliError::NoInput);
    }
    debug!(
        "Input: {} bytes from {:?}",
        resolved.content.len(),
        resolved.source
    );
    Ok(resolved)
}
