//! Command handler modules for the potledger CLI.
//!
//! Each command lives in its own module and exposes
//! `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`. Output
//! streams are passed in as `&mut dyn Write` so tests can capture them.

mod cfg;
mod convert;
mod dynamics;
mod summary;
mod verbose;

pub use cfg::handle_cfg_command;
pub use convert::{convert_line, handle_convert_command};
pub use dynamics::handle_dynamics_command;
pub use summary::{handle_summary_command, SummaryOptions};
pub use verbose::handle_verbose_command;

use std::io::Write;

use potledger_engine::parser::parse_lines;
use potledger_engine::report::Report;
use potledger_engine::stats::Stats;

use crate::config::Config;
use crate::error::CliError;
use crate::io_utils::read_text_auto;
use crate::ui;

/// Reads and parses a hand history into a finished report.
///
/// The number of unrecognized lines is announced on `err`; an aborted parse
/// becomes [`CliError::Engine`].
pub(crate) fn load_report(
    input: &str,
    config: &Config,
    err: &mut dyn Write,
) -> Result<Report, CliError> {
    let text = read_text_auto(input).map_err(CliError::InvalidInput)?;
    let mut stats = Stats::with_config(config.stats_config());
    let outcome = parse_lines(text.lines(), &mut stats);
    if !outcome.success {
        return Err(CliError::Engine(
            outcome.error.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    if !outcome.unknown_lines.is_empty() {
        ui::display_warning(
            err,
            &format!("{} unknown lines found", outcome.unknown_lines.len()),
        )?;
    }
    tracing::info!(
        input,
        hands = outcome.hands,
        unknown = outcome.unknown_lines.len(),
        "hand history parsed"
    );
    Ok(Report::build(&stats, &outcome))
}
