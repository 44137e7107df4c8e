//! Inference client abstraction
//!
//! One capability, `complete(prompt) -> completion`, with interchangeable
//! backends selected by configuration. Calls are blocking and never retried.

use std::sync::Mutex;

use crate::config::{BackendConfig, BackendKind};
use crate::local::LocalRunnerClient;
use crate::ollama::OllamaClient;

/// Sampling parameters sent with every request
#[derive(Debug, Clone, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.95,
            max_tokens: 1024,
        }
    }
}

/// Inference failures; both are terminal for the current invocation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InferenceError {
    #[error("inference backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("inference backend error: {0}")]
    BackendError(String),
}

/// A model backend able to produce one raw completion for a prompt
pub trait InferenceClient {
    /// Send `prompt` and return the raw completion text
    fn complete(&self, prompt: &str, sampling: &SamplingParams) -> Result<String, InferenceError>;

    /// Short label for diagnostics, e.g. `http deepseek-coder:1.3b`
    fn describe(&self) -> String;
}

/// Build the backend named by `config`
pub fn client_from_config(config: &BackendConfig) -> Result<Box<dyn InferenceClient>, InferenceError> {
    tracing::debug!("Inference: selecting {} backend", config.kind.as_str());
    match config.kind {
        BackendKind::Http => Ok(Box::new(OllamaClient::from_config(config)?)),
        BackendKind::Local => Ok(Box::new(LocalRunnerClient::from_config(config)?)),
    }
}

/// Scripted client for tests
///
/// Responses are handed out in order; the last one repeats.
pub struct FakeInferenceClient {
    responses: Mutex<Vec<Result<String, InferenceError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeInferenceClient {
    pub fn new(responses: Vec<Result<String, InferenceError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `text`
    pub fn always(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    /// Always fail with `error`
    pub fn always_error(error: InferenceError) -> Self {
        Self::new(vec![Err(error)])
    }

    /// Number of `complete` calls made so far
    pub fn call_count(&self) -> usize {
        self.prompts.lock().map(|p| p.len()).unwrap_or(0)
    }

    /// Prompts received so far, oldest first
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl InferenceClient for FakeInferenceClient {
    fn complete(&self, prompt: &str, _sampling: &SamplingParams) -> Result<String, InferenceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }

        let mut responses = self
            .responses
            .lock()
            .map_err(|_| InferenceError::BackendError("fake client poisoned".to_string()))?;

        match responses.len() {
            0 => Err(InferenceError::BackendError("no scripted response".to_string())),
            1 => responses[0].clone(),
            _ => responses.remove(0),
        }
    }

    fn describe(&self) -> String {
        "fake".to_string()
    }
}
