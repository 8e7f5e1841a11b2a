//! fieldops - inventory client for network concentrators
//!
//! Runs one command against the inventory API, or an interactive shell that
//! keeps a single request cache alive across commands.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

use fieldops::app::{App, AppError};
use fieldops::cli::{Cli, Command, Settings};
use fieldops::shell;

/// Logs go to stderr so `--json` output stays parseable
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let settings = Settings::from_cli(&cli)?;
    let app = App::new(&settings);

    if cli.command == Command::Shell {
        let stdin = BufReader::new(tokio::io::stdin());
        let mut stdout = io::stdout();
        return shell::run(&app, stdin, &mut stdout, cli.json).await;
    }

    let report = app.execute(&cli.command).await?;
    println!("{}", report.render(cli.json));
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
