use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::chips::{add_chips, round_chips, sub_chips, Chips};
use crate::errors::LedgerError;

/// Timestamp layout used on hand-start lines.
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Represents a betting street.
/// A new street starts a new betting round.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Street {
    /// Before the flop (blinds and hole cards)
    Preflop,
    /// After the flop (3 community cards)
    Flop,
    /// After the turn (4th community card)
    Turn,
    /// After the river (5th community card)
    River,
    /// Cards are revealed, no more betting
    Showdown,
}

/// One player's chip movements within a single hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerLedgerEntry {
    pub name: String,
    /// Stack declared by the seat line, zero when the player was never seated.
    pub initial_chip_count: Chips,
    /// Everything put into the pot: blinds, bets, calls and raises.
    pub payed: Chips,
    /// Part of `payed` on the current street that a following raise replaces.
    pub deductible: Chips,
    pub blinds: Chips,
    pub vpip: bool,
    /// Pot winnings plus uncalled bets returned.
    pub collected: Chips,
    /// Pot winnings only; drives the rake split.
    pub collected_from_pot: Chips,
    pub rake: Chips,
    pub allin: bool,
    pub joined_table: bool,
}

impl PlayerLedgerEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            initial_chip_count: Decimal::ZERO,
            payed: Decimal::ZERO,
            deductible: Decimal::ZERO,
            blinds: Decimal::ZERO,
            vpip: false,
            collected: Decimal::ZERO,
            collected_from_pot: Decimal::ZERO,
            rake: Decimal::ZERO,
            allin: false,
            joined_table: false,
        }
    }

    /// Sets the stack declared by the seat line.
    pub fn seat(&mut self, chips: Chips) -> Result<(), LedgerError> {
        self.replace(Self {
            initial_chip_count: chips,
            ..self.clone()
        })
    }

    /// Adds a voluntary contribution.
    ///
    /// Calls and bets are increments and stack up in `deductible`. A raise
    /// carries the total amount the player now has in on this street, so the
    /// live `deductible` is taken back out and replaced by the raise itself.
    pub fn pay(&mut self, sum: Chips, is_raise: bool) -> Result<(), LedgerError> {
        let payed = add_chips(self.payed, sum)?;
        let (payed, deductible) = if is_raise {
            (sub_chips(payed, self.deductible)?, sum)
        } else {
            (payed, add_chips(self.deductible, sum)?)
        };
        self.replace(Self {
            payed,
            deductible,
            vpip: true,
            ..self.clone()
        })
    }

    /// Adds a forced blind; only a deductible blind counts toward a later raise.
    pub fn pay_blind(&mut self, sum: Chips, deductible: bool) -> Result<(), LedgerError> {
        self.replace(Self {
            payed: add_chips(self.payed, sum)?,
            blinds: add_chips(self.blinds, sum)?,
            deductible: if deductible { sum } else { self.deductible },
            ..self.clone()
        })
    }

    pub fn collect(&mut self, sum: Chips, from_pot: bool) -> Result<(), LedgerError> {
        let collected_from_pot = if from_pot {
            add_chips(self.collected_from_pot, sum)?
        } else {
            self.collected_from_pot
        };
        self.replace(Self {
            collected: add_chips(self.collected, sum)?,
            collected_from_pot,
            ..self.clone()
        })
    }

    /// Stack the player leaves the hand with.
    pub fn ending_stack(&self) -> Chips {
        self.initial_chip_count - self.payed + self.collected
    }

    /// Chips won or lost in this hand, rake given back.
    pub fn hand_result(&self) -> Chips {
        self.collected - self.payed + self.rake
    }

    fn checked_totals(&self) -> Option<(Chips, Chips)> {
        let ending = self
            .initial_chip_count
            .checked_sub(self.payed)?
            .checked_add(self.collected)?;
        let result = self.collected.checked_sub(self.payed)?.checked_add(self.rake)?;
        Some((ending, result))
    }

    /// Takes over `next` only when its ending stack and result are
    /// representable, so the two accessors above never overflow.
    fn replace(&mut self, next: Self) -> Result<(), LedgerError> {
        next.checked_totals().ok_or(LedgerError::Overflow)?;
        *self = next;
        Ok(())
    }
}

/// Accounting state of a single hand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandLedger {
    pub id: String,
    pub timestamp: String,
    /// Players in order of first reference.
    pub players: Vec<PlayerLedgerEntry>,
    pub total_pot: Chips,
    pub rake: Chips,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub current_street: Street,
}

impl HandLedger {
    pub fn new(id: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            players: Vec::new(),
            total_pot: Decimal::ZERO,
            rake: Decimal::ZERO,
            small_blind: Decimal::ZERO,
            big_blind: Decimal::ZERO,
            current_street: Street::Preflop,
        }
    }

    pub fn started_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, TIMESTAMP_FORMAT).ok()
    }

    /// Returns the entry for `name`, creating it on first reference.
    pub fn player(&mut self, name: &str) -> &mut PlayerLedgerEntry {
        let idx = match self.players.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                self.players.push(PlayerLedgerEntry::new(name));
                self.players.len() - 1
            }
        };
        &mut self.players[idx]
    }

    pub fn get(&self, name: &str) -> Option<&PlayerLedgerEntry> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn pay_small_blind(&mut self, name: &str, sum: Chips) -> Result<(), LedgerError> {
        // a repeated small blind in the same hand is a re-post and goes straight to the pot
        let first = self.small_blind.is_zero();
        self.player(name).pay_blind(sum, first)?;
        self.small_blind = sum;
        Ok(())
    }

    pub fn pay_big_blind(&mut self, name: &str, sum: Chips) -> Result<(), LedgerError> {
        self.player(name).pay_blind(sum, true)?;
        self.big_blind = sum;
        Ok(())
    }

    /// Missed-blind catch-up: the big blind plays, the small blind is dead money.
    pub fn pay_both_blinds(&mut self, name: &str, _sum: Chips) -> Result<(), LedgerError> {
        let (sb, bb) = (self.small_blind, self.big_blind);
        let player = self.player(name);
        let mut next = player.clone();
        next.pay_blind(bb, true)?;
        next.pay_blind(sb, false)?;
        *player = next;
        Ok(())
    }

    pub fn set_street(&mut self, street: Street) {
        self.current_street = street;
        for p in &mut self.players {
            p.deductible = Decimal::ZERO;
        }
    }

    /// Records the pot summary and splits the rake among pot winners.
    ///
    /// Each winner's share is proportional to what they took from the pot
    /// net of rake, rounded to a whole chip. The rounding residual goes to
    /// the first winner holding a nonzero share so shares sum to `rake`.
    /// Nothing changes when an amount falls out of range.
    pub fn add_pot_and_rake(&mut self, pot: Chips, rake: Chips) -> Result<(), LedgerError> {
        let net_pot = sub_chips(pot, rake)?;
        let mut shares = Vec::new();
        if !net_pot.is_zero() {
            let mut distributed = Decimal::ZERO;
            for (idx, p) in self.players.iter().enumerate() {
                if p.collected_from_pot.is_zero() {
                    continue;
                }
                let share = p
                    .collected_from_pot
                    .checked_div(net_pot)
                    .and_then(|ratio| ratio.checked_mul(rake))
                    .map(round_chips)
                    .ok_or(LedgerError::Overflow)?;
                distributed = add_chips(distributed, share)?;
                shares.push((idx, share));
            }
            let residual = sub_chips(rake, distributed)?;
            if !residual.is_zero() {
                if let Some((_, share)) = shares.iter_mut().find(|(_, s)| !s.is_zero()) {
                    *share = add_chips(*share, residual)?;
                }
            }
        }

        let mut updated = Vec::with_capacity(shares.len());
        for (idx, share) in shares {
            let mut next = self.players[idx].clone();
            next.replace(PlayerLedgerEntry {
                rake: share,
                ..next.clone()
            })?;
            updated.push((idx, next));
        }
        for (idx, next) in updated {
            self.players[idx] = next;
        }
        self.total_pot = pot;
        self.rake = rake;
        Ok(())
    }

    pub fn total_rake_shares(&self) -> Chips {
        self.players.iter().map(|p| p.rake).sum()
    }

    /// Sum of every player's result; zero for a fully reconciled hand.
    pub fn balance(&self) -> Option<Chips> {
        self.players
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.hand_result()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn player_is_created_once_in_reference_order() {
        let mut hand = HandLedger::new("1", "2020/01/01 10:00:00");
        hand.player("Bob");
        hand.player("Alice").initial_chip_count = dec!(500);
        hand.player("Bob").initial_chip_count = dec!(700);
        let names: Vec<_> = hand.players.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bob", "Alice"]);
        assert_eq!(hand.get("Bob").unwrap().initial_chip_count, dec!(700));
    }

    #[test]
    fn bet_then_raise_counts_raise_total_only() {
        let mut p = PlayerLedgerEntry::new("Alice");
        p.pay(dec!(10), false).unwrap();
        p.pay(dec!(30), true).unwrap();
        assert_eq!(p.payed, dec!(30));
        assert_eq!(p.deductible, dec!(30));
        assert!(p.vpip);
    }

    #[test]
    fn reraise_subtracts_previous_raise() {
        let mut p = PlayerLedgerEntry::new("Alice");
        p.pay_blind(dec!(10), true).unwrap();
        p.pay(dec!(40), true).unwrap();
        p.pay(dec!(120), true).unwrap();
        assert_eq!(p.payed, dec!(120));
        assert_eq!(p.blinds, dec!(10));
    }

    #[test]
    fn calls_accumulate_deductible() {
        let mut p = PlayerLedgerEntry::new("Bob");
        p.pay_blind(dec!(5), true).unwrap();
        p.pay(dec!(5), false).unwrap();
        assert_eq!(p.deductible, dec!(10));
        p.pay(dec!(40), true).unwrap();
        assert_eq!(p.payed, dec!(40));
    }

    #[test]
    fn only_first_small_blind_is_deductible() {
        let mut hand = HandLedger::new("1", "");
        hand.pay_small_blind("A", dec!(5)).unwrap();
        assert_eq!(hand.get("A").unwrap().deductible, dec!(5));
        hand.pay_small_blind("B", dec!(5)).unwrap();
        let b = hand.get("B").unwrap();
        assert_eq!(b.deductible, Decimal::ZERO);
        assert_eq!(b.blinds, dec!(5));
    }

    #[test]
    fn both_blinds_keep_big_blind_deductible() {
        let mut hand = HandLedger::new("1", "");
        hand.pay_small_blind("A", dec!(5)).unwrap();
        hand.pay_big_blind("B", dec!(10)).unwrap();
        hand.pay_both_blinds("C", dec!(15)).unwrap();
        let c = hand.get("C").unwrap();
        assert_eq!(c.payed, dec!(15));
        assert_eq!(c.blinds, dec!(15));
        assert_eq!(c.deductible, dec!(10));
        assert!(!c.vpip);
    }

    #[test]
    fn street_change_resets_only_deductible() {
        let mut hand = HandLedger::new("1", "");
        hand.pay_big_blind("A", dec!(10)).unwrap();
        hand.player("A").collect(dec!(4), false).unwrap();
        hand.set_street(Street::Flop);
        let a = hand.get("A").unwrap();
        assert_eq!(hand.current_street, Street::Flop);
        assert_eq!(a.deductible, Decimal::ZERO);
        assert_eq!(a.payed, dec!(10));
        assert_eq!(a.blinds, dec!(10));
        assert_eq!(a.collected, dec!(4));
    }

    #[test]
    fn rake_shares_sum_to_declared_rake() {
        let mut hand = HandLedger::new("1", "");
        for name in ["A", "B", "C"] {
            hand.player(name).pay(dec!(100), false).unwrap();
        }
        hand.player("A").collect(dec!(97), true).unwrap();
        hand.player("B").collect(dec!(97), true).unwrap();
        hand.player("C").collect(dec!(97), true).unwrap();
        hand.add_pot_and_rake(dec!(300), dec!(9)).unwrap();
        assert_eq!(hand.total_rake_shares(), dec!(9));

        let mut hand = HandLedger::new("2", "");
        hand.player("A").collect(dec!(1), true).unwrap();
        hand.player("B").collect(dec!(1), true).unwrap();
        hand.player("C").collect(dec!(1), true).unwrap();
        hand.add_pot_and_rake(dec!(5), dec!(2)).unwrap();
        // each share rounds 0.67 up to 1, the residual comes off the first winner
        assert_eq!(hand.get("A").unwrap().rake, dec!(0));
        assert_eq!(hand.get("B").unwrap().rake, dec!(1));
        assert_eq!(hand.total_rake_shares(), dec!(2));
    }

    #[test]
    fn non_collectors_pay_no_rake() {
        let mut hand = HandLedger::new("1", "");
        hand.player("A").pay(dec!(50), false).unwrap();
        hand.player("B").pay(dec!(50), false).unwrap();
        hand.player("B").collect(dec!(98), true).unwrap();
        hand.player("A").collect(dec!(10), false).unwrap();
        hand.add_pot_and_rake(dec!(100), dec!(2)).unwrap();
        assert_eq!(hand.get("A").unwrap().rake, Decimal::ZERO);
        assert_eq!(hand.get("B").unwrap().rake, dec!(2));
    }

    #[test]
    fn reconciled_hand_balances_to_zero() {
        let mut hand = HandLedger::new("1", "");
        hand.pay_small_blind("A", dec!(5)).unwrap();
        hand.pay_big_blind("B", dec!(10)).unwrap();
        hand.player("A").pay(dec!(5), false).unwrap();
        hand.player("B").collect(dec!(19), true).unwrap();
        hand.add_pot_and_rake(dec!(20), dec!(1)).unwrap();
        assert_eq!(hand.balance(), Some(Decimal::ZERO));
    }

    #[test]
    fn out_of_range_contribution_leaves_entry_untouched() {
        let huge = dec!(50000000000000000000000000000);
        let mut p = PlayerLedgerEntry::new("Alice");
        p.pay(huge, false).unwrap();
        assert_eq!(p.pay(huge, false), Err(LedgerError::Overflow));
        assert_eq!(p.payed, huge);
        assert_eq!(p.deductible, huge);

        let mut seated = PlayerLedgerEntry::new("Bob");
        seated.seat(huge).unwrap();
        // the ending stack would pass the decimal range
        assert_eq!(seated.collect(huge, true), Err(LedgerError::Overflow));
        assert_eq!(seated.collected, Decimal::ZERO);
    }

    #[test]
    fn out_of_range_pot_keeps_previous_summary() {
        let mut hand = HandLedger::new("1", "");
        hand.player("A").collect(dec!(10), true).unwrap();
        assert_eq!(
            hand.add_pot_and_rake(Decimal::MIN, dec!(1)),
            Err(LedgerError::Overflow)
        );
        assert_eq!(hand.total_pot, Decimal::ZERO);
        assert_eq!(hand.get("A").unwrap().rake, Decimal::ZERO);
    }

    #[test]
    fn started_at_parses_log_timestamp() {
        let hand = HandLedger::new("1", "2019/03/02 21:15:07");
        let ts = hand.started_at().unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M").to_string(), "2019-03-02 21:15");
        assert!(HandLedger::new("2", "garbage").started_at().is_none());
    }
}
