//! Recordbook command-line tool.
//!
//! Usage:
//!   recordbook --db phonebook.csv --key Phone create --fields Name,Surname,Phone
//!   recordbook --db phonebook.csv --key Phone add Name=Anna Surname=Li Phone=89990001111
//!   recordbook --db phonebook.csv --key Phone list
//!
//! Logs go to stderr; `RECORDBOOK_LOG` takes an `EnvFilter` directive.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use recordbook_cli::{Args, exit_code, run};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let args = Args::parse();
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("RECORDBOOK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();

    let stdout = io::stdout();
    match run(&args, &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}
