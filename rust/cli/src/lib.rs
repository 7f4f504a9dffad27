//! # potledger CLI Library
//!
//! Command-line front end for [`potledger_engine`]: reads a hand history,
//! reconstructs the chip ledger and prints summaries, per-hand detail or the
//! running-result series.
//!
//! ## Main Entry Point
//!
//! The primary entry point is the [`run`] function, which parses command-line
//! arguments and executes the appropriate subcommand.
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::io;
//! let args = vec!["potledger", "summary", "--input", "friday.txt", "--buyins"];
//! let code = potledger_cli::run(args, &mut io::stdout(), &mut io::stderr());
//! assert_eq!(code, 0);
//! ```
//!
//! ## Available Subcommands
//!
//! - `summary`: Per-player totals, missed hands, sum mismatches, buy-ins
//! - `verbose`: Hand-by-hand ledger, optionally for a single player
//! - `dynamics`: Running results as CSV/TSV
//! - `convert`: Rewrite a play-money history into the dollar dialect
//! - `cfg`: Display current configuration settings

use clap::Parser;
use std::io::Write;
pub mod cli;
mod commands;
pub mod config;
mod error;
pub mod exit_code;
pub mod formatters;
pub mod io_utils;
pub mod logging;
mod macros;
pub mod ui;

use cli::{Commands, PotledgerCli};
use commands::{
    SummaryOptions, handle_cfg_command, handle_convert_command, handle_dynamics_command,
    handle_summary_command, handle_verbose_command,
};

pub use commands::convert_line;
pub use error::CliError;

const COMMANDS: &[&str] = &["summary", "verbose", "dynamics", "convert", "cfg"];

/// Main entry point for the CLI application.
///
/// # Arguments
///
/// * `args` - Iterator over command-line arguments (typically `std::env::args()`)
/// * `out` - Output stream for normal output (typically `stdout`)
/// * `err` - Output stream for error messages (typically `stderr`)
///
/// # Returns
///
/// Exit code: `0` for success, `2` for errors
///
/// # Example
///
/// ```
/// use std::io;
/// let code = potledger_cli::run(["potledger", "cfg"], &mut io::sink(), &mut io::sink());
/// assert_eq!(code, 0);
/// ```
pub fn run<I, S>(args: I, out: &mut dyn Write, err: &mut dyn Write) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let argv: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

    let cli = match PotledgerCli::try_parse_from(&argv) {
        Ok(cli) => cli,
        Err(e) => {
            use clap::error::ErrorKind;

            // Help and version should print to stdout and exit 0
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) {
                if write!(out, "{}", e).is_err() {
                    return exit_code::ERROR;
                }
                return exit_code::SUCCESS;
            }
            write_or_exit!(err, "{}", e);
            write_or_exit!(err, "Usage: potledger <command> [options]\n");
            write_or_exit!(err, "Commands:");
            for c in COMMANDS {
                write_or_exit!(err, "  {}", c);
            }
            write_or_exit!(err, "\nFor full help, run: potledger --help");
            return exit_code::ERROR;
        }
    };

    let name = cli.cmd.name();
    tracing::debug!(command = name, "dispatching");
    let result = dispatch(cli.cmd, out, err);
    match result {
        Ok(()) => exit_code::SUCCESS,
        // cfg reports its own configuration errors
        Err(CliError::Config(_)) if name == "cfg" => exit_code::ERROR,
        Err(e) => {
            let _ = ui::write_error(err, &e.to_string());
            exit_code::ERROR
        }
    }
}

fn dispatch(cmd: Commands, out: &mut dyn Write, err: &mut dyn Write) -> Result<(), CliError> {
    match cmd {
        Commands::Cfg => handle_cfg_command(out, err),
        Commands::Convert { input, output } => {
            handle_convert_command(&input, output.as_deref(), out)
        }
        Commands::Summary {
            input,
            buyins,
            unknown_lines,
            json,
        } => {
            let config = config::load()?;
            let options = SummaryOptions {
                buyins,
                unknown_lines,
                json,
            };
            handle_summary_command(&input, options, &config, out, err)
        }
        Commands::Verbose { input, trace } => {
            let config = config::load()?;
            handle_verbose_command(&input, trace.as_deref(), &config, out, err)
        }
        Commands::Dynamics { input, tabs } => {
            let config = config::load()?;
            handle_dynamics_command(&input, tabs, &config, out, err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn run_capture(args: &[&str]) -> (i32, String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let code = run(args.iter().copied(), &mut out, &mut err);
        (
            code,
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[test]
    fn help_goes_to_stdout() {
        let (code, out, err) = run_capture(&["potledger", "--help"]);
        assert_eq!(code, exit_code::SUCCESS);
        assert!(out.contains("summary"));
        assert!(err.is_empty());
    }

    #[test]
    fn unknown_command_lists_commands() {
        let (code, out, err) = run_capture(&["potledger", "play"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(out.is_empty());
        for c in COMMANDS {
            assert!(err.contains(c), "missing {c} in {err}");
        }
    }

    #[test]
    #[serial]
    fn missing_input_is_an_error() {
        let (code, _, err) = run_capture(&["potledger", "summary", "--input", "/no/such/file.txt"]);
        assert_eq!(code, exit_code::ERROR);
        assert!(err.starts_with("Error: Invalid input: /no/such/file.txt"));
    }

    #[test]
    fn command_names_match_clap() {
        let names: Vec<_> = [
            Commands::Cfg,
            Commands::Convert {
                input: String::new(),
                output: None,
            },
        ]
        .iter()
        .map(Commands::name)
        .collect();
        assert_eq!(names, ["cfg", "convert"]);
        assert!(names.iter().all(|n| COMMANDS.contains(n)));
    }
}
