//! CLI - Command-line argument parsing
//!
//! Defines the CLI structure using clap.
//! Keeps argument parsing separate from execution logic.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use moveaudit_common::{BackendKind, BraceStrategy, Config};
use std::path::PathBuf;

/// moveaudit CLI
#[derive(Parser, Debug)]
#[command(name = "moveaudit")]
#[command(about = "Audit and generate Move smart contracts with a language model", long_about = None)]
#[command(version = env!("MOVEAUDIT_VERSION"))]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $MOVEAUDIT_CONFIG and the default location)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Inference backend: http or local
    #[arg(long, global = true)]
    pub backend: Option<BackendKind>,

    /// HTTP backend base URL
    #[arg(long, global = true, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Model identifier
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Sampling temperature
    #[arg(long, global = true)]
    pub temperature: Option<f32>,

    /// Nucleus-sampling threshold
    #[arg(long, global = true)]
    pub top_p: Option<f32>,

    /// Maximum output tokens
    #[arg(long, global = true)]
    pub max_tokens: Option<u32>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Audit a contract and print structured findings
    Audit {
        /// Contract source, or a path to a .move file (stdin if omitted)
        input: Option<String>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Also write the JSON report to FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Brace-span fallback: greedy or balanced
        #[arg(long)]
        strategy: Option<BraceStrategy>,
    },

    /// Generate a contract from a natural-language description
    Generate {
        /// Description, or a path to a file containing it (stdin if omitted)
        input: Option<String>,

        /// Also write the generated code to FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Audit { .. } => "audit",
            Commands::Generate { .. } => "generate",
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed JSON document
    Json,
    /// Human-readable report
    Text,
}

impl Cli {
    /// Apply command-line overrides on top of file configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(kind) = self.backend {
            config.backend.kind = kind;
        }
        if let Some(endpoint) = &self.endpoint {
            config.backend.endpoint = endpoint.clone();
        }
        if let Some(model) = &self.model {
            config.backend.model = model.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.backend.timeout_secs = secs;
        }
        if let Some(t) = self.temperature {
            config.sampling.temperature = t;
        }
        if let Some(p) = self.top_p {
            config.sampling.top_p = p;
        }
        if let Some(n) = self.max_tokens {
            config.sampling.audit_max_tokens = n;
            config.sampling.generate_max_tokens = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "moveaudit",
            "audit",
            "Token.move",
            "--endpoint",
            "http://10.0.0.2:11434",
            "--strategy",
            "balanced",
        ])
        .unwrap();
        assert_eq!(cli.endpoint.as_deref(), Some("http://10.0.0.2:11434"));
        match cli.command {
            Commands::Audit {
                input, strategy, format, ..
            } => {
                assert_eq!(input.as_deref(), Some("Token.move"));
                assert_eq!(strategy, Some(BraceStrategy::Balanced));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let cli = Cli::try_parse_from([
            "moveaudit",
            "--backend",
            "local",
            "--model",
            "codellama:7b",
            "--max-tokens",
            "64",
            "generate",
        ])
        .unwrap();
        let mut config = Config::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.backend.kind, BackendKind::Local);
        assert_eq!(config.backend.model, "codellama:7b");
        assert_eq!(config.sampling.audit_max_tokens, 64);
        assert_eq!(config.sampling.generate_max_tokens, 64);
        assert_eq!(config.sampling.temperature, 0.7);
    }

    #[test]
    fn test_unknown_backend_rejected() {
        assert!(Cli::try_parse_from(["moveaudit", "--backend", "grpc", "audit"]).is_err());
    }
}
