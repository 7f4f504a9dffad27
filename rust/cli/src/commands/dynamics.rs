use std::io::Write;

use crate::commands::load_report;
use crate::config::{Config, Separator};
use crate::error::CliError;

/// Writes every player's running result after each hand as CSV, or TSV with
/// `tabs`, ready to be plotted.
pub fn handle_dynamics_command(
    input: &str,
    tabs: bool,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let report = load_report(input, config, err)?;
    let separator = if tabs {
        Separator::Tab
    } else {
        config.dynamics_separator
    };
    write!(out, "{}", report.dynamics().to_delimited(separator.as_char()))?;
    Ok(())
}
