//! Play-money to dollar conversion.
//!
//! Play-money histories print bare amounts and tag hands as "(Play Money)"
//! or "Home Game". Each rewrite below touches only its first match on a
//! line, leaving the rest verbatim.

use std::io::Write;
use std::path::Path;

use crate::error::CliError;
use crate::io_utils::{ensure_parent_dir, read_text_auto};

/// A rewrite applied at one position: `(matched length, replacement)`.
type Rewrite = fn(&str) -> Option<(usize, String)>;

const REWRITES: &[Rewrite] = &[
    stakes,
    seat_stack,
    action_amount,
    parenthesized_amount,
    raise_amounts,
    play_money_tag,
];

pub fn handle_convert_command(
    input: &str,
    output: Option<&str>,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let text = read_text_auto(input).map_err(CliError::InvalidInput)?;
    let mut converted = String::with_capacity(text.len() + text.len() / 8);
    for line in text.lines() {
        converted.push_str(&convert_line(line));
        converted.push('\n');
    }
    match output {
        Some(path) => {
            let path = Path::new(path);
            ensure_parent_dir(path).map_err(CliError::InvalidInput)?;
            std::fs::write(path, converted)?;
            tracing::info!(output = %path.display(), "converted history written");
        }
        None => out.write_all(converted.as_bytes())?,
    }
    Ok(())
}

/// Applies every rewrite, in order, to the leftmost position it matches.
pub fn convert_line(line: &str) -> String {
    REWRITES
        .iter()
        .fold(line.to_string(), |acc, rewrite| replace_first(&acc, *rewrite))
}

fn replace_first(line: &str, rewrite: Rewrite) -> String {
    for (i, _) in line.char_indices() {
        if let Some((len, replacement)) = rewrite(&line[i..]) {
            return format!("{}{}{}", &line[..i], replacement, &line[i + len..]);
        }
    }
    line.to_string()
}

fn digits(s: &str) -> Option<&str> {
    let n = s.bytes().take_while(u8::is_ascii_digit).count();
    (n > 0).then(|| &s[..n])
}

/// `(5/10)` -> `($5/$10)`
fn stakes(s: &str) -> Option<(usize, String)> {
    let rest = s.strip_prefix('(')?;
    let sb = digits(rest)?;
    let rest = rest[sb.len()..].strip_prefix('/')?;
    let bb = digits(rest)?;
    rest[bb.len()..].strip_prefix(')')?;
    Some((sb.len() + bb.len() + 3, format!("(${}/${})", sb, bb)))
}

/// `(1000 in chips)` -> `($1000 in chips)`
fn seat_stack(s: &str) -> Option<(usize, String)> {
    let rest = s.strip_prefix('(')?;
    let n = digits(rest)?;
    rest[n.len()..].starts_with(" in chips)").then(|| (1, "($".to_string()))
}

/// `calls 10` -> `calls $10`, likewise for blinds, bets, pot, rake and collected.
fn action_amount(s: &str) -> Option<(usize, String)> {
    ["blind", "blinds", "calls", "bets", "pot", "Rake", "collected"]
        .iter()
        .find(|word| {
            s.strip_prefix(**word)
                .and_then(|rest| rest.strip_prefix(' '))
                .and_then(digits)
                .is_some()
        })
        .map(|word| (word.len() + 1, format!("{} $", word)))
}

/// `won (85)` -> `won ($85)`, likewise for bet and collected.
fn parenthesized_amount(s: &str) -> Option<(usize, String)> {
    ["bet", "collected", "won"]
        .iter()
        .find(|word| {
            s.strip_prefix(**word)
                .and_then(|rest| rest.strip_prefix(" ("))
                .and_then(|rest| digits(rest).map(|n| rest[n.len()..].starts_with(')')))
                .unwrap_or(false)
        })
        .map(|word| (word.len() + 2, format!("{} ($", word)))
}

/// `raises 20 to 30` -> `raises $20 to $30`
fn raise_amounts(s: &str) -> Option<(usize, String)> {
    let rest = s.strip_prefix("raises ")?;
    let by = digits(rest)?;
    let rest = rest[by.len()..].strip_prefix(" to ")?;
    let to = digits(rest)?;
    Some((
        "raises ".len() + by.len() + " to ".len() + to.len(),
        format!("raises ${} to ${}", by, to),
    ))
}

fn play_money_tag(s: &str) -> Option<(usize, String)> {
    ["(Play Money) ", "Home Game "]
        .iter()
        .find(|tag| s.starts_with(**tag))
        .map(|tag| (tag.len(), String::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_start_gets_dollar_stakes_and_loses_tag() {
        assert_eq!(
            convert_line("PokerStars Home Game Hand #7: Hold'em No Limit (5/10) - 2020/05/01 20:00:00 ET"),
            "PokerStars Hand #7: Hold'em No Limit ($5/$10) - 2020/05/01 20:00:00 ET"
        );
        assert_eq!(
            convert_line("PokerStars Hand #8: (Play Money) Hold'em No Limit (50/100)"),
            "PokerStars Hand #8: Hold'em No Limit ($50/$100)"
        );
    }

    #[test]
    fn amounts_get_dollar_prefix() {
        assert_eq!(convert_line("Seat 1: Alice (1000 in chips)"), "Seat 1: Alice ($1000 in chips)");
        assert_eq!(convert_line("Alice: posts small blind 5"), "Alice: posts small blind $5");
        assert_eq!(
            convert_line("Bob: posts small & big blinds 15"),
            "Bob: posts small & big blinds $15"
        );
        assert_eq!(convert_line("Bob: raises 20 to 30"), "Bob: raises $20 to $30");
        assert_eq!(convert_line("Carol collected 167 from pot"), "Carol collected $167 from pot");
        assert_eq!(
            convert_line("Seat 3: Carol showed [Js Jd] and won (167) with a pair"),
            "Seat 3: Carol showed [Js Jd] and won ($167) with a pair"
        );
    }

    #[test]
    fn only_first_occurrence_is_rewritten() {
        assert_eq!(convert_line("Total pot 20 | Rake 1"), "Total pot $20 | Rake 1");
    }

    #[test]
    fn unrelated_lines_are_untouched() {
        for line in ["*** HOLE CARDS ***", "Seat 1: Alice (small blind) folded before Flop", ""] {
            assert_eq!(convert_line(line), line);
        }
    }

    #[test]
    fn converted_history_still_parses() {
        use potledger_engine::parser::parse_lines;
        use potledger_engine::stats::Stats;
        use rust_decimal_macros::dec;

        let log = [
            "PokerStars Home Game Hand #1: Hold'em No Limit (5/10) - 2020/05/01 20:00:00 ET",
            "Seat 1: Alice (1000 in chips)",
            "Seat 2: Bob (1000 in chips)",
            "Alice: posts small blind 5",
            "Bob: posts big blind 10",
            "Alice: raises 20 to 30",
            "Bob: calls 20",
            "Bob collected 59 from pot",
            "Total pot 60 | Rake 1",
        ];
        let mut stats = Stats::new();
        let outcome = parse_lines(log.iter().map(|l| convert_line(l)), &mut stats);
        assert!(outcome.success);
        assert!(outcome.unknown_lines.is_empty(), "{:?}", outcome.unknown_lines);
        assert_eq!(stats.player("Bob").unwrap().gross(), dec!(30));
        assert_eq!(stats.total_sum(), dec!(0));
    }
}
