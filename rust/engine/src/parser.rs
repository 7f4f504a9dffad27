//! Line-driven hand reconstruction.
//!
//! [`HandParser`] walks the log once, classifies every line with a
//! [`PatternTable`] and folds the events into the hand that is currently
//! open. A blank line closes the hand and hands it over to [`Stats`].
//! Nothing in the log aborts parsing: unrecognized lines, events that
//! arrive outside of a hand and amounts that would overflow the ledger are
//! collected and reported instead.

use crate::errors::LedgerError;
use crate::hand::HandLedger;
use crate::patterns::{LineEvent, PatternTable, PotKind};
use crate::stats::Stats;

/// Result of one parsing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseOutcome {
    pub success: bool,
    pub error: Option<String>,
    /// Lines that matched no pattern or could not be applied, verbatim.
    pub unknown_lines: Vec<String>,
    pub hands: usize,
}

#[derive(Debug, Default)]
pub struct HandParser {
    table: PatternTable,
    current: Option<HandLedger>,
    unknown_lines: Vec<String>,
    hands: usize,
}

impl HandParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: PatternTable) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// The hand currently being built, if any.
    pub fn current(&self) -> Option<&HandLedger> {
        self.current.as_ref()
    }

    pub fn unknown_lines(&self) -> &[String] {
        &self.unknown_lines
    }

    /// Classifies and applies a single raw line.
    ///
    /// Only aggregator failures are returned; problems with the line itself
    /// end up in the unknown-lines list.
    pub fn feed(&mut self, raw: &str, stats: &mut Stats) -> Result<(), LedgerError> {
        let line = raw.trim();
        let Some((pattern, event)) = self.table.classify(line) else {
            tracing::trace!(line = raw, "unknown line");
            self.unknown_lines.push(raw.to_string());
            return Ok(());
        };
        match self.apply(event, stats) {
            Err(LedgerError::NoHandInProgress) => {
                tracing::warn!(pattern, line = raw, "event outside of a hand, skipped");
                self.unknown_lines.push(raw.to_string());
                Ok(())
            }
            Err(LedgerError::Overflow) => {
                tracing::warn!(pattern, line = raw, "amount out of range, skipped");
                self.unknown_lines.push(raw.to_string());
                Ok(())
            }
            other => other,
        }
    }

    /// Closes the last hand and finalizes the aggregator.
    pub fn finish(mut self, stats: &mut Stats) -> ParseOutcome {
        // the log may end without a trailing blank line
        let result = self
            .apply(LineEvent::Blank, stats)
            .and_then(|()| stats.finalize());
        self.outcome(result)
    }

    fn outcome(self, result: Result<(), LedgerError>) -> ParseOutcome {
        let error = result.err().map(|e| e.to_string());
        ParseOutcome {
            success: error.is_none(),
            error,
            unknown_lines: self.unknown_lines,
            hands: self.hands,
        }
    }

    fn commit(&mut self, stats: &mut Stats) -> Result<(), LedgerError> {
        if let Some(hand) = self.current.take() {
            tracing::debug!(
                hand_id = %hand.id,
                players = hand.players.len(),
                pot = %hand.total_pot,
                rake = %hand.rake,
                "hand completed"
            );
            let id = hand.id.clone();
            match stats.add_hand(hand) {
                Ok(()) => self.hands += 1,
                Err(LedgerError::Overflow) => {
                    tracing::warn!(hand_id = %id, "session totals out of range, hand dropped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn hand(&mut self) -> Result<&mut HandLedger, LedgerError> {
        self.current.as_mut().ok_or(LedgerError::NoHandInProgress)
    }

    fn apply(&mut self, event: LineEvent, stats: &mut Stats) -> Result<(), LedgerError> {
        match event {
            LineEvent::HandStart { id, timestamp } => {
                if let Some(open) = &self.current {
                    tracing::warn!(
                        hand_id = %open.id,
                        next_hand_id = %id,
                        "hand not terminated by a blank line"
                    );
                    self.commit(stats)?;
                }
                self.current = Some(HandLedger::new(id, timestamp));
            }
            LineEvent::Blank => self.commit(stats)?,
            LineEvent::Reset => {
                self.commit(stats)?;
                stats.mark_reset()?;
            }
            LineEvent::Ignored => {}
            LineEvent::Seat { name, chips } => {
                self.hand()?.player(&name).seat(chips)?;
            }
            LineEvent::JoinTable { name } => {
                self.hand()?.player(&name).joined_table = true;
            }
            LineEvent::SmallBlind { name, amount } => self.hand()?.pay_small_blind(&name, amount)?,
            LineEvent::BigBlind { name, amount } => self.hand()?.pay_big_blind(&name, amount)?,
            LineEvent::BothBlinds { name, amount } => {
                self.hand()?.pay_both_blinds(&name, amount)?
            }
            LineEvent::Call {
                name,
                amount,
                allin,
            }
            | LineEvent::Bet {
                name,
                amount,
                allin,
            } => {
                let player = self.hand()?.player(&name);
                player.pay(amount, false)?;
                player.allin |= allin;
            }
            LineEvent::Raise {
                name, to, allin, ..
            } => {
                let player = self.hand()?.player(&name);
                player.pay(to, true)?;
                player.allin |= allin;
            }
            LineEvent::Street(street) => self.hand()?.set_street(street),
            LineEvent::Collected { name, amount, pot } => {
                if pot == Some(PotKind::Side) {
                    tracing::trace!(player = %name, %amount, "side pot collected");
                }
                self.hand()?.player(&name).collect(amount, true)?;
            }
            LineEvent::UncalledBet { name, amount } => {
                self.hand()?.player(&name).collect(amount, false)?;
            }
            LineEvent::TotalPot { pot, rake } => self.hand()?.add_pot_and_rake(pot, rake)?,
        }
        Ok(())
    }
}

/// Parses a whole log into `stats` and finalizes it.
pub fn parse_lines<I, S>(lines: I, stats: &mut Stats) -> ParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = HandParser::new();
    for line in lines {
        if let Err(e) = parser.feed(line.as_ref(), stats) {
            tracing::error!(error = %e, "parsing aborted");
            return parser.outcome(Err(e));
        }
    }
    parser.finish(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::Street;
    use crate::patterns::Pattern;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const HEADER: &str = "PokerStars Home Game Hand #100: Hold'em No Limit (5/10) - 2020/05/01 20:00:00 ET";

    #[test]
    fn builds_hand_until_blank_line() {
        let mut stats = Stats::new();
        let mut parser = HandParser::new();
        for line in [
            HEADER,
            "Seat 1: Alice (1000 in chips)",
            "Alice: posts small blind 5",
            "*** FLOP *** [2c 3d 4h]",
        ] {
            parser.feed(line, &mut stats).unwrap();
        }
        let hand = parser.current().unwrap();
        assert_eq!(hand.id, "100");
        assert_eq!(hand.current_street, Street::Flop);
        let alice = hand.get("Alice").unwrap();
        assert_eq!(alice.initial_chip_count, dec!(1000));
        assert_eq!(alice.deductible, Decimal::ZERO);

        parser.feed("", &mut stats).unwrap();
        assert!(parser.current().is_none());
        assert_eq!(stats.hands().len(), 1);
    }

    #[test]
    fn events_outside_a_hand_become_unknown_lines() {
        let mut stats = Stats::new();
        let outcome = parse_lines(["Alice: calls 10", "", "Table 'x' 6-max"], &mut stats);
        assert!(outcome.success);
        assert_eq!(outcome.unknown_lines, vec!["Alice: calls 10".to_string()]);
        assert_eq!(outcome.hands, 0);
    }

    #[test]
    fn final_hand_is_committed_without_trailing_blank() {
        let mut stats = Stats::new();
        let outcome = parse_lines(
            [
                HEADER,
                "Seat 1: Alice (1000 in chips)",
                "Seat 2: Bob (1000 in chips)",
                "Total pot 0 | Rake 0",
            ],
            &mut stats,
        );
        assert!(outcome.success);
        assert_eq!(outcome.hands, 1);
        assert_eq!(stats.hands().len(), 1);
    }

    #[test]
    fn new_hand_start_closes_open_hand() {
        let mut stats = Stats::new();
        let second = HEADER.replace("#100", "#101");
        let outcome = parse_lines(
            [
                HEADER,
                "Seat 1: Alice (1000 in chips)",
                second.as_str(),
                "Seat 1: Alice (1000 in chips)",
            ],
            &mut stats,
        );
        assert_eq!(outcome.hands, 2);
        let ids: Vec<_> = stats.hands().iter().map(|h| h.hand.id.as_str()).collect();
        assert_eq!(ids, ["100", "101"]);
    }

    #[test]
    fn raise_marks_all_in_and_uses_total() {
        let mut stats = Stats::new();
        let mut parser = HandParser::new();
        for line in [
            HEADER,
            "Bob: posts big blind 10",
            "Bob: raises 30 to 40 and is all-in",
        ] {
            parser.feed(line, &mut stats).unwrap();
        }
        let bob = parser.current().unwrap().get("Bob").unwrap();
        assert_eq!(bob.payed, dec!(40));
        assert!(bob.allin);
        assert!(bob.vpip);
    }

    #[test]
    fn overflowing_amounts_are_skipped_not_fatal() {
        let mut stats = Stats::new();
        let huge = "Alice: calls 50000000000000000000000000000";
        let outcome = parse_lines(
            [
                HEADER,
                "Seat 1: Alice (1000 in chips)",
                "Seat 2: Bob (1000 in chips)",
                huge,
                huge,
                "Bob collected 10 from pot",
                "",
            ],
            &mut stats,
        );
        assert!(outcome.success);
        assert_eq!(outcome.unknown_lines, vec![huge.to_string()]);
        assert_eq!(outcome.hands, 1);
        let alice = stats.hands()[0].hand.get("Alice").unwrap();
        assert_eq!(alice.payed, dec!(50000000000000000000000000000));
    }

    #[test]
    fn hand_with_out_of_range_session_totals_is_dropped() {
        let mut stats = Stats::new();
        let second = HEADER.replace("#100", "#101");
        let outcome = parse_lines(
            [
                HEADER,
                "Seat 1: Alice (50000000000000000000000000000 in chips)",
                "",
                second.as_str(),
                "Seat 1: Alice (-50000000000000000000000000000 in chips)",
                "",
            ],
            &mut stats,
        );
        assert!(outcome.success);
        assert_eq!(outcome.hands, 1);
        assert_eq!(stats.hands().len(), 1);
        assert_eq!(
            stats.player("Alice").unwrap().buyin,
            dec!(50000000000000000000000000000)
        );
    }

    fn restart(line: &str) -> Option<LineEvent> {
        (line == "*** RESTART ***").then_some(LineEvent::Reset)
    }

    #[test]
    fn custom_table_extends_the_dialect() {
        let table = PatternTable::from_patterns(
            std::iter::once(Pattern::new("restart", restart))
                .chain(PatternTable::standard().patterns().iter().copied()),
        );
        let mut stats = Stats::new();
        let mut parser = HandParser::with_table(table);
        for line in [HEADER, "Seat 1: Alice (1000 in chips)", "*** RESTART ***"] {
            parser.feed(line, &mut stats).unwrap();
        }
        assert!(parser.unknown_lines().is_empty());
        assert!(parser.current().is_none());

        let mut plain = HandParser::new();
        plain.feed("*** RESTART ***", &mut Stats::new()).unwrap();
        assert_eq!(plain.unknown_lines(), ["*** RESTART ***".to_string()]);
    }

    #[test]
    fn feeding_after_finalize_fails_the_run() {
        let mut stats = Stats::new();
        stats.finalize().unwrap();
        let outcome = parse_lines([HEADER, "Seat 1: Alice (10 in chips)", ""], &mut stats);
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Session already finalized"));
    }
}
