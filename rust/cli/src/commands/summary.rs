//! Session summary: one row per player, followed by the diagnostics that
//! point at an incomplete or mis-parsed history.

use std::io::Write;

use potledger_engine::chips::Chips;
use potledger_engine::report::Report;

use crate::commands::load_report;
use crate::config::Config;
use crate::error::CliError;
use crate::formatters::{
    chip_columns, format_chips, format_gap, format_percent, format_signed, left_align,
    name_width, right_align, COLUMN_WIDTH,
};
use crate::ui;

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    pub buyins: bool,
    pub unknown_lines: bool,
    pub json: bool,
}

pub fn handle_summary_command(
    input: &str,
    options: SummaryOptions,
    config: &Config,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> Result<(), CliError> {
    let report = load_report(input, config, err)?;
    if options.json {
        let json = serde_json::to_string_pretty(&report).map_err(std::io::Error::other)?;
        writeln!(out, "{}", json)?;
        return Ok(());
    }

    let width = name_width(report.players.iter().map(|p| p.player.as_str()), "Player");
    write_totals(out, &report)?;
    write_player_table(out, &report, width)?;
    if !report.missed_hands.is_empty() {
        write_missed_hands(out, &report, width)?;
    }
    if !report.mismatches.is_empty() {
        write_mismatches(out, &report, width)?;
    }
    if options.buyins || config.show_buyins {
        write_buyins(out, &report, width)?;
    }
    if options.unknown_lines && !report.unknown_lines.is_empty() {
        writeln!(out)?;
        ui::write_heading(out, "Unknown lines")?;
        for line in &report.unknown_lines {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

pub(crate) fn write_totals(out: &mut dyn Write, report: &Report) -> std::io::Result<()> {
    writeln!(
        out,
        "Hands played: {}, Total bank: {}, Total rake: {}",
        report.hands_played,
        format_chips(report.total_bank),
        format_chips(report.total_rake)
    )
}

fn write_player_table(out: &mut dyn Write, report: &Report, width: usize) -> std::io::Result<()> {
    writeln!(out)?;
    let money: String = ["buyin", "cashout", "net", "rake", "gross"]
        .iter()
        .map(|h| right_align(h, COLUMN_WIDTH))
        .collect();
    writeln!(
        out,
        "{} {:>6} {:>5} {:>5} {:>6} {:>6}{}",
        left_align("Player", width),
        "played",
        "vpip",
        "won",
        "won %",
        "all-in",
        money
    )?;
    for row in &report.players {
        writeln!(
            out,
            "{} {:>6} {:>5} {:>5} {:>6} {:>6}{}",
            left_align(&row.player, width),
            row.hands_played,
            format_percent(row.vpip_percent),
            row.hands_won,
            format_percent(row.won_percent),
            row.hands_all_in,
            chip_columns(&[row.buyin, row.cashout, row.net, row.rake, row.gross])
        )?;
    }
    Ok(())
}

pub(crate) fn write_missed_hands(
    out: &mut dyn Write,
    report: &Report,
    width: usize,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Some hands are likely missed in the history!")?;
    writeln!(
        out,
        "These are unexpected changes in the stacks in between two hands:"
    )?;
    for missed in &report.missed_hands {
        let (prev, cur) = (&missed.prev_hand, &missed.cur_hand);
        write!(
            out,
            "Between hand #{} ({}) and #{} ({})",
            prev.id, prev.timestamp, cur.id, cur.timestamp
        )?;
        match cur.seconds_since(prev) {
            Some(seconds) => writeln!(out, ", {} apart:", format_gap(seconds))?,
            None => writeln!(out, ":")?,
        }
        for stack in &missed.stacks {
            writeln!(
                out,
                "{} {} {} > {}",
                left_align(&stack.player, width),
                right_align(&format_chips(stack.previous), COLUMN_WIDTH),
                right_align(&format_signed(stack.initial - stack.previous), COLUMN_WIDTH),
                format_chips(stack.initial)
            )?;
        }
    }
    Ok(())
}

pub(crate) fn write_mismatches(
    out: &mut dyn Write,
    report: &Report,
    width: usize,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "The total sum mismatch: {}", format_chips(report.total_sum))?;
    for mismatch in &report.mismatches {
        writeln!(
            out,
            "Mismatched hand #{} ({}), previous hand #{}:",
            mismatch.cur_hand.id, mismatch.cur_hand.timestamp, mismatch.prev_hand.id
        )?;
        let headers: String = ["initial", "payed", "collect", "rake", "chips", "total"]
            .iter()
            .map(|h| right_align(h, COLUMN_WIDTH))
            .collect();
        writeln!(out, "{} {}", left_align("player", width), headers)?;

        let settled = report.hand(&mismatch.cur_hand.id);
        // column sums, None once they leave the chip range
        let (mut payed, mut collected, mut rake) =
            (Some(Chips::ZERO), Some(Chips::ZERO), Some(Chips::ZERO));
        for result in &mismatch.results {
            let entry = settled.and_then(|s| s.hand.get(&result.player));
            match entry {
                Some(gp) => {
                    payed = payed.and_then(|sum| sum.checked_add(gp.payed));
                    collected = collected.and_then(|sum| sum.checked_add(gp.collected));
                    rake = rake.and_then(|sum| sum.checked_add(gp.rake));
                    writeln!(
                        out,
                        "{} {}{}{}{}",
                        left_align(&result.player, width),
                        right_align(&format_chips(gp.initial_chip_count), COLUMN_WIDTH),
                        right_align(&format!("-{}", format_chips(gp.payed)), COLUMN_WIDTH),
                        right_align(&format!("+{}", format_chips(gp.collected)), COLUMN_WIDTH),
                        chip_columns(&[gp.rake, gp.ending_stack(), result.result])
                    )?;
                }
                None => writeln!(
                    out,
                    "{} {}{}",
                    left_align(&result.player, width),
                    " ".repeat(COLUMN_WIDTH * 5),
                    right_align(&format_chips(result.result), COLUMN_WIDTH)
                )?,
            }
        }
        let sums: String = [payed, collected, rake]
            .into_iter()
            .map(|sum| right_align(&sum.map(format_chips).unwrap_or_default(), COLUMN_WIDTH))
            .collect();
        writeln!(
            out,
            "{} {}{}{}{}",
            left_align("", width),
            " ".repeat(COLUMN_WIDTH),
            sums,
            " ".repeat(COLUMN_WIDTH),
            right_align(&format_chips(mismatch.total_sum), COLUMN_WIDTH)
        )?;
    }
    Ok(())
}

fn write_buyins(out: &mut dyn Write, report: &Report, width: usize) -> std::io::Result<()> {
    writeln!(out)?;
    ui::write_heading(out, "Buy-ins")?;
    for buyin in &report.buyins {
        writeln!(
            out,
            "{} {} (hand #{})",
            left_align(&buyin.player, width),
            right_align(&format_chips(buyin.amount), COLUMN_WIDTH),
            buyin.hand.id
        )?;
    }
    Ok(())
}
