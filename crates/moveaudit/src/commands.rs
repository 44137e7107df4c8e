//! Command execution: input → prompt → completion → extraction → output

use anyhow::Context;
use moveaudit_common::inference::client_from_config;
use moveaudit_common::pipeline;
use moveaudit_common::prompts::Task;
use moveaudit_common::{BraceStrategy, Config};
use std::io::{IsTerminal, Write};
use std::path::Path;
use tracing::info;

use crate::cli::{Cli, Commands, OutputFormat};
use crate::errors::CliError;
use crate::input;
use crate::logging::InvocationLog;
use crate::output;

/// Run the parsed command; every fatal failure comes back as `CliError`
pub fn run(cli: &Cli, log: &mut InvocationLog) -> Result<(), CliError> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    log.backend = Some(config.backend.kind.as_str().to_string());
    log.model = Some(config.backend.model.clone());

    match &cli.command {
        Commands::Audit {
            input,
            format,
            output,
            strategy,
        } => {
            let strategy = strategy.unwrap_or(config.extract.strategy);
            audit(&config, input.as_deref(), *format, output.as_deref(), strategy, log)
        }
        Commands::Generate { input, output } => {
            generate(&config, input.as_deref(), output.as_deref(), log)
        }
    }
}

fn audit(
    config: &Config,
    arg: Option<&str>,
    format: OutputFormat,
    output_file: Option<&Path>,
    strategy: BraceStrategy,
    log: &mut InvocationLog,
) -> Result<(), CliError> {
    // Input first: no inference call without content
    let input = input::resolve(arg)?;
    let client = client_from_config(&config.backend)?;
    let sampling = config.sampling.for_task(Task::Audit);

    let done = pipeline::audit(client.as_ref(), &sampling, &input.content, strategy)?;
    output::print_raw_response(&client.describe(), &done.raw);

    let failed = done.result.is_failure();
    log.outcome = Some(if failed { "extraction_failure" } else { "report" }.to_string());
    info!(
        "Audit finished: {} issues{}",
        done.result.issues().len(),
        if failed { " (extraction failed)" } else { "" }
    );

    let json = output::render_json(&done.result)?;
    if let Some(path) = output_file {
        write_file(path, &json)?;
    }

    let rendered = match format {
        OutputFormat::Json => json,
        OutputFormat::Text => {
            let color = std::io::stdout().is_terminal();
            output::render_text(&done.result, input.contract_name().as_deref(), color)?
        }
    };
    print_stdout(&rendered)
}

fn generate(
    config: &Config,
    arg: Option<&str>,
    output_file: Option<&Path>,
    log: &mut InvocationLog,
) -> Result<(), CliError> {
    let input = input::resolve(arg)?;
    let client = client_from_config(&config.backend)?;
    let sampling = config.sampling.for_task(Task::Generate);

    let done = pipeline::generate(client.as_ref(), &sampling, &input.content)?;
    output::print_raw_response(&client.describe(), &done.raw);
    log.outcome = Some("code".to_string());

    let code = done.result.into_inner();
    if let Some(path) = output_file {
        write_file(path, &code)?;
    }
    print_stdout(&code)
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    std::fs::write(path, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// Write the result document, newline-terminated
fn print_stdout(text: &str) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    write!(stdout, "{}{}", text, newline)
        .and_then(|_| stdout.flush())
        .context("failed to write to stdout")?;
    Ok(())
}
