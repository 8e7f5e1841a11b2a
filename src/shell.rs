//! Interactive session
//!
//! Reads commands line by line and runs them against one [`App`], so every
//! command shares the same request cache until `exit` or `logout`.

use std::io::Write;

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::app::{App, AppError};
use crate::cli::{split_words, Command, ShellLine};

const PROMPT: &str = "fieldops> ";

/// Runs the shell until end of input or `exit`/`quit`
///
/// Command failures are printed and the session continues; only I/O errors on
/// `input` or `out` end it early.
pub async fn run<R, W>(app: &App, input: R, out: &mut W, json: bool) -> Result<(), AppError>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let words = match split_words(&line) {
            Ok(words) => words,
            Err(e) => {
                writeln!(out, "error: {}", e)?;
                continue;
            }
        };

        match words.first().map(String::as_str) {
            None => continue,
            Some("exit") | Some("quit") => break,
            Some(_) => {}
        }

        let command = match ShellLine::try_parse_from(&words) {
            Ok(ShellLine { command }) => command,
            Err(e) => {
                // Also covers `help` and `--help`, which clap reports as errors.
                write!(out, "{}", e.render())?;
                continue;
            }
        };

        if command == Command::Shell {
            writeln!(out, "error: {}", AppError::NestedShell)?;
            continue;
        }

        debug!(?command, "shell command");
        match app.execute(&command).await {
            Ok(report) => writeln!(out, "{}", report.render(json))?,
            Err(e) => writeln!(out, "error: {}", e)?,
        }
    }

    Ok(())
}
