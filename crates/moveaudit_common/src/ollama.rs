//! Ollama-style HTTP inference backend
//!
//! Endpoint used:
//! - POST /api/generate - non-streaming generation
//!
//! Request body is `{model, prompt, stream: false, options}`, the completion
//! is the `response` field of the reply.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::BackendConfig;
use crate::inference::{InferenceClient, InferenceError, SamplingParams};

/// Default Ollama API endpoint
pub const OLLAMA_DEFAULT_URL: &str = "http://127.0.0.1:11434";

/// Request for /api/generate
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<GenerateOptions>,
}

/// Generation options
#[derive(Debug, Clone, Serialize, Default)]
pub struct GenerateOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl From<&SamplingParams> for GenerateOptions {
    fn from(s: &SamplingParams) -> Self {
        Self {
            temperature: Some(s.temperature),
            top_p: Some(s.top_p),
            num_predict: Some(s.max_tokens),
        }
    }
}

/// Response from /api/generate (non-streaming)
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    pub response: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub eval_count: u32,
}

/// Blocking client for an Ollama-compatible service
pub struct OllamaClient {
    base_url: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn from_config(config: &BackendConfig) -> Result<Self, InferenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| InferenceError::BackendError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            client,
        })
    }

    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }
}

impl InferenceClient for OllamaClient {
    fn complete(&self, prompt: &str, sampling: &SamplingParams) -> Result<String, InferenceError> {
        let request = GenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            options: Some(sampling.into()),
        };

        let url = self.generate_url();
        debug!("Ollama: POST {} ({} byte prompt)", url, prompt.len());

        let resp = self.client.post(&url).json(&request).send().map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                InferenceError::BackendUnavailable(format!("{}: {}", self.base_url, e))
            } else {
                InferenceError::BackendError(format!("request failed: {}", e))
            }
        })?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| InferenceError::BackendError(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(InferenceError::BackendError(format!(
                "status {}: {}",
                status,
                body.trim()
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| InferenceError::BackendError(format!("malformed response: {}", e)))?;

        debug!(
            "Ollama: model={} done={} eval_count={}",
            parsed.model, parsed.done, parsed.eval_count
        );
        Ok(parsed.response)
    }

    fn describe(&self) -> String {
        format!("http {} @ {}", self.model, self.base_url)
    }
}
