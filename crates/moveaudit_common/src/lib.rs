//! moveaudit common - model-backed audit and generation for Move contracts
//!
//! Prompt building, inference backends and the extraction protocol that
//! turns unreliable completions into printable results.

pub mod config;
pub mod extract;
pub mod inference;
pub mod local;
pub mod ollama;
pub mod pipeline;
pub mod prompts;
pub mod scoring;
pub mod types;

pub use config::{BackendConfig, BackendKind, Config, ConfigError};
pub use extract::BraceStrategy;
pub use inference::{InferenceClient, InferenceError, SamplingParams};
pub use types::*;
