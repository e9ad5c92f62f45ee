// stepper - Step into function and macro calls
// Copyright (c) 2025 Tom Waddington. MIT licensed.

mod cli;
mod logging;
mod repl;
mod session;

use std::process::ExitCode;

use clap::Parser;
use stepper_runtime::Runtime;

use crate::cli::Cli;
use crate::session::{Session, SessionError};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref());

    let runtime = match Runtime::with_options(cli.runtime_options()) {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let session = Session::new(runtime, cli.step_options());

    for path in &cli.files {
        if let Err(e) = session.load_file(path) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    }

    match &cli.expr {
        Some(source) => match step_once(&session, &cli, source) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        None => {
            repl::run_repl(&session);
            ExitCode::SUCCESS
        }
    }
}

/// Rewrite `source`, print it, and with `--eval` print its value.
fn step_once(session: &Session, cli: &Cli, source: &str) -> Result<(), SessionError> {
    let rewritten = session.rewrite(cli.mode, source)?;
    println!("{}", rewritten);
    if cli.eval {
        let value = session.run(&rewritten)?;
        println!("{}", value);
    }
    Ok(())
}
