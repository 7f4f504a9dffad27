//! Hand-by-hand ledger dump, used to track down where a history stops
//! adding up.

use std::io::Write;

use potledger_engine::report::Report;
use potledger_engine::stats::SettledHand;

use crate::commands::load_report;
use crate::commands::summary::{write_mismatches, write_missed_hands, write_totals};
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{
    chip_columns, format_chips, format_percent, left_align, name_width, right_align, COLUMN_WIDTH,
};
use crate::ui;

pub fn handle_verbose_command(
    input: &str,
    trace: Option<&str>,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let report = load_report(input, config, err)?;
    if let Some(name) = trace
        && !report.players.iter().any(|p| p.player == name)
    {
        return Err(CliError::InvalidInput(format!(
            "player '{}' does not appear in {}",
            name, input
        )));
    }

    let width = name_width(report.players.iter().map(|p| p.player.as_str()), "player");
    write_totals(out, &report)?;
    for settled in &report.hands {
        if trace.is_some_and(|name| settled.outcome(name).is_none()) {
            continue;
        }
        write_hand(out, settled, trace, width)?;
    }
    write_running_totals(out, &report, trace, width)?;
    if !report.missed_hands.is_empty() {
        write_missed_hands(out, &report, width)?;
    }
    if !report.mismatches.is_empty() {
        write_mismatches(out, &report, width)?;
    }
    if !report.unknown_lines.is_empty() {
        writeln!(out)?;
        ui::write_heading(out, "Unknown lines")?;
        for line in &report.unknown_lines {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn write_hand(
    out: &mut dyn Write,
    settled: &SettledHand,
    trace: Option<&str>,
    width: usize,
) -> std::io::Result<()> {
    let hand = &settled.hand;
    writeln!(out)?;
    writeln!(
        out,
        "Hand #{} ({}) blinds {}/{}, pot {}, rake {}",
        hand.id,
        hand.timestamp,
        format_chips(hand.small_blind),
        format_chips(hand.big_blind),
        format_chips(hand.total_pot),
        format_chips(hand.rake)
    )?;
    let headers: String = [
        "expected", "initial", "blinds", "payed", "collect", "rake", "chips", "result", "total",
    ]
    .iter()
    .map(|h| right_align(h, COLUMN_WIDTH))
    .collect();
    writeln!(out, "{} {}  flags", left_align("player", width), headers)?;
    for (gp, outcome) in settled.entries() {
        if trace.is_some_and(|name| name != gp.name) {
            continue;
        }
        let mut flags = Vec::new();
        if gp.vpip {
            flags.push("vpip");
        }
        if gp.allin {
            flags.push("all-in");
        }
        if gp.joined_table {
            flags.push("joined");
        }
        writeln!(
            out,
            "{} {}  {}",
            left_align(&gp.name, width),
            chip_columns(&[
                outcome.prev_chip_count,
                gp.initial_chip_count,
                gp.blinds,
                gp.payed,
                gp.collected,
                gp.rake,
                gp.ending_stack(),
                gp.hand_result(),
                outcome.aggregated_result,
            ]),
            flags.join(",")
        )?;
    }
    Ok(())
}

fn write_running_totals(
    out: &mut dyn Write,
    report: &Report,
    trace: Option<&str>,
    width: usize,
) -> std::io::Result<()> {
    writeln!(out)?;
    ui::write_heading(out, "Players")?;
    for row in report
        .players
        .iter()
        .filter(|row| trace.is_none_or(|name| name == row.player))
    {
        writeln!(
            out,
            "{} played {} vpip {} won {} all-in {} | payed {} collected {} | buyin {} cashout {} rake {} gross {} | last hand #{}",
            left_align(&row.player, width),
            row.hands_played,
            format_percent(row.vpip_percent),
            row.hands_won,
            row.hands_all_in,
            format_chips(row.chips_payed),
            format_chips(row.chips_won),
            format_chips(row.buyin),
            format_chips(row.cashout),
            format_chips(row.rake),
            format_chips(row.gross),
            row.last_hand_id.as_deref().unwrap_or("-")
        )?;
    }
    writeln!(out, "Session sum: {}", format_chips(report.total_sum))
}
