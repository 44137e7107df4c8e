//! Audit and generation pipelines: prompt, complete, extract

use tracing::debug;

use crate::extract::{self, BraceStrategy};
use crate::inference::{InferenceClient, InferenceError, SamplingParams};
use crate::prompts::{self, Task};
use crate::types::{AuditOutcome, GeneratedCode};

/// Extracted result together with the raw completion it came from
#[derive(Debug, Clone)]
pub struct Completion<T> {
    pub raw: String,
    pub result: T,
}

/// Audit `code`; only backend failures are errors
pub fn audit(
    client: &dyn InferenceClient,
    sampling: &SamplingParams,
    code: &str,
    strategy: BraceStrategy,
) -> Result<Completion<AuditOutcome>, InferenceError> {
    let prompt = prompts::build(Task::Audit, code);
    debug!("Audit: prompt {} bytes via {}", prompt.len(), client.describe());

    let raw = client.complete(&prompt, sampling)?;
    let result = extract::extract_analysis(&raw, strategy);
    Ok(Completion { raw, result })
}

/// Generate a contract from `description`
pub fn generate(
    client: &dyn InferenceClient,
    sampling: &SamplingParams,
    description: &str,
) -> Result<Completion<GeneratedCode>, InferenceError> {
    let prompt = prompts::build(Task::Generate, description);
    debug!("Generate: prompt {} bytes via {}", prompt.len(), client.describe());

    let raw = client.complete(&prompt, sampling)?;
    let result = extract::extract_code(&raw);
    Ok(Completion { raw, result })
}
