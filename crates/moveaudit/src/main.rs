//! moveaudit - model-backed audit and generation for Move smart contracts
//!
//! All failures are caught here and turned into a stderr message plus an
//! exit code; stdout only ever carries a result document.

use clap::Parser;
use moveaudit::cli::Cli;
use moveaudit::commands;
use moveaudit::errors::EXIT_SUCCESS;
use moveaudit::logging::{self, InvocationLog};

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let mut log = InvocationLog::start(cli.command.name());
    let code = match commands::run(&cli, &mut log) {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("moveaudit: {:#}", e);
            log.record_error(&e);
            e.exit_code()
        }
    };
    log.finish(code);

    std::process::exit(code);
}
