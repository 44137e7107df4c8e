//! moveaudit configuration
//!
//! Settings live in a TOML file, looked up in this order:
//! 1. an explicit path (`--config`)
//! 2. `$MOVEAUDIT_CONFIG`
//! 3. `<config_dir>/moveaudit/config.toml`
//!
//! Only the last location may be absent, in which case defaults apply.
//! Every field has a default, so a partial file is valid.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::extract::BraceStrategy;
use crate::inference::SamplingParams;
use crate::ollama::OLLAMA_DEFAULT_URL;
use crate::prompts::Task;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "MOVEAUDIT_CONFIG";

const CONFIG_DIR_NAME: &str = "moveaudit";
const CONFIG_FILE: &str = "config.toml";

/// Default model identifier for both backends
pub const DEFAULT_MODEL: &str = "deepseek-coder:1.3b";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Which inference backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ollama-compatible HTTP service
    #[default]
    Http,
    /// Locally installed runner process
    Local,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Http => "http",
            BackendKind::Local => "local",
        }
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "http" | "ollama" => Ok(BackendKind::Http),
            "local" => Ok(BackendKind::Local),
            other => Err(format!("unknown backend '{}' (expected http or local)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// HTTP request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Local runner argv; the model is appended as the last argument
    #[serde(default = "default_command")]
    pub command: Vec<String>,
}

fn default_endpoint() -> String {
    OLLAMA_DEFAULT_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    120 // small local models on CPU are slow
}

fn default_command() -> Vec<String> {
    vec!["ollama".to_string(), "run".to_string()]
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            kind: BackendKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            command: default_command(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_audit_max_tokens")]
    pub audit_max_tokens: u32,

    #[serde(default = "default_generate_max_tokens")]
    pub generate_max_tokens: u32,
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.95
}

fn default_audit_max_tokens() -> u32 {
    1024
}

fn default_generate_max_tokens() -> u32 {
    512
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            top_p: default_top_p(),
            audit_max_tokens: default_audit_max_tokens(),
            generate_max_tokens: default_generate_max_tokens(),
        }
    }
}

impl SamplingConfig {
    /// Sampling parameters for one pipeline
    pub fn for_task(&self, task: Task) -> SamplingParams {
        let max_tokens = match task {
            Task::Audit => self.audit_max_tokens,
            Task::Generate => self.generate_max_tokens,
        };
        SamplingParams {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractConfig {
    #[serde(default)]
    pub strategy: BraceStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub sampling: SamplingConfig,

    #[serde(default)]
    pub extract: ExtractConfig,
}

impl Config {
    /// Load configuration using the lookup order above
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
            return Self::load_from(Path::new(&path));
        }
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a specific file; a missing file is an error
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// `<config_dir>/moveaudit/config.toml`, if a config dir is known
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
}
