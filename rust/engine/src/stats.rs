//! Session-wide accounting across hands.
//!
//! [`Stats`] consumes completed hands strictly in arrival order and keeps one
//! [`PlayerStats`] per player for the whole session. While doing so it checks
//! two things:
//!
//! - **continuity**: a player should start a hand with the stack they ended
//!   their previous hand with. Any difference is booked as a buy-in; a
//!   shrinking stack, or a majority of players topping up at once, suggests
//!   hands are missing from the log.
//! - **conservation**: the sum of `cashout - buyin + rake` over all players
//!   never changes when every hand is parsed correctly. A change is recorded
//!   as a mismatch with a snapshot of everybody's result.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::chips::{add_chips, sub_chips, Chips};
use crate::errors::LedgerError;
use crate::hand::{HandLedger, PlayerLedgerEntry};

/// Tuning for the continuity check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsConfig {
    /// When set, a stack increase up to at least this many big blinds counts
    /// as a regular rebuy rather than evidence of a missed hand.
    pub rebuy_threshold_bb: Option<u32>,
}

/// Identifies a hand in diagnostic records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandRef {
    pub id: String,
    pub timestamp: String,
    /// `timestamp` parsed, when the header carried a well-formed one.
    pub started_at: Option<NaiveDateTime>,
}

impl HandRef {
    pub fn of(hand: &HandLedger) -> Self {
        Self {
            id: hand.id.clone(),
            timestamp: hand.timestamp.clone(),
            started_at: hand.started_at(),
        }
    }

    /// Whole seconds from the start of `earlier` to the start of this hand.
    pub fn seconds_since(&self, earlier: &HandRef) -> Option<i64> {
        Some((self.started_at? - earlier.started_at?).num_seconds())
    }
}

/// Running totals of one player over the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub name: String,
    pub hands_played: u32,
    pub hands_vpip: u32,
    pub hands_won: u32,
    pub hands_all_in: u32,
    pub buyin: Chips,
    pub cashout: Chips,
    /// Stack expected at the start of the player's next hand.
    pub prev_chip_count: Chips,
    pub rake: Chips,
    pub chips_payed: Chips,
    pub chips_won: Chips,
    pub last_hand_id: Option<String>,
}

impl PlayerStats {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hands_played: 0,
            hands_vpip: 0,
            hands_won: 0,
            hands_all_in: 0,
            buyin: Decimal::ZERO,
            cashout: Decimal::ZERO,
            prev_chip_count: Decimal::ZERO,
            rake: Decimal::ZERO,
            chips_payed: Decimal::ZERO,
            chips_won: Decimal::ZERO,
            last_hand_id: None,
        }
    }

    pub fn net(&self) -> Chips {
        self.cashout - self.buyin
    }

    /// Result before rake; the quantity the conservation check sums up.
    pub fn gross(&self) -> Chips {
        self.cashout - self.buyin + self.rake
    }

    pub fn vpip_percent(&self) -> Option<u32> {
        percent(self.hands_vpip, self.hands_played)
    }

    /// Hands won out of hands voluntarily played.
    pub fn won_percent(&self) -> Option<u32> {
        percent(self.hands_won, self.hands_vpip)
    }
}

fn percent(part: u32, whole: u32) -> Option<u32> {
    (whole > 0).then(|| (f64::from(part) * 100.0 / f64::from(whole)).round() as u32)
}

/// A stack difference between two hands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuyIn {
    pub player: String,
    pub amount: Chips,
    pub hand: HandRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackChange {
    pub player: String,
    /// Stack carried from the player's previous hand.
    pub previous: Chips,
    /// Stack declared at the start of this hand.
    pub initial: Chips,
}

/// Hand boundary where stacks changed without an accounting event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedHand {
    pub prev_hand: HandRef,
    pub cur_hand: HandRef,
    pub stacks: Vec<StackChange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerResult {
    pub player: String,
    pub result: Chips,
}

/// Hand after which the session-wide sum moved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub prev_hand: HandRef,
    pub cur_hand: HandRef,
    pub total_sum: Chips,
    pub results: Vec<PlayerResult>,
}

/// Per-player annotations computed when a hand is settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerOutcome {
    pub player: String,
    pub prev_chip_count: Chips,
    /// Player's session result right after this hand.
    pub aggregated_result: Chips,
}

/// A consumed hand together with its annotations, in the hand's player order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SettledHand {
    pub hand: HandLedger,
    pub outcomes: Vec<PlayerOutcome>,
}

impl SettledHand {
    pub fn outcome(&self, player: &str) -> Option<&PlayerOutcome> {
        self.outcomes.iter().find(|o| o.player == player)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PlayerLedgerEntry, &PlayerOutcome)> {
        self.hand.players.iter().zip(&self.outcomes)
    }
}

#[derive(Debug, Default)]
pub struct Stats {
    config: StatsConfig,
    players: Vec<PlayerStats>,
    index: HashMap<String, usize>,
    hands: Vec<SettledHand>,
    buyins: Vec<BuyIn>,
    missed_hands: Vec<MissedHand>,
    mismatches: Vec<Mismatch>,
    /// Last consumed hand, for continuity; cleared by a reset marker.
    continuity_from: Option<HandRef>,
    /// Last consumed hand regardless of resets.
    last_hand: Option<HandRef>,
    total_sum: Chips,
    total_rake: Chips,
    total_bank: Chips,
    /// Running sum of buy-ins, published as `total_bank` on finalize.
    bank: Chips,
    finalized: bool,
}

/// One player's totals after the hand being consumed, not yet stored.
struct Staged {
    player: PlayerStats,
    previous: Chips,
    diff: Chips,
    explained: bool,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StatsConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> StatsConfig {
        self.config
    }

    fn store(&mut self, player: PlayerStats) {
        match self.index.get(&player.name) {
            Some(&idx) => self.players[idx] = player,
            None => {
                self.index.insert(player.name.clone(), self.players.len());
                self.players.push(player);
            }
        }
    }

    fn rebuy_explained(&self, initial: Chips, big_blind: Chips) -> bool {
        match self.config.rebuy_threshold_bb {
            Some(n) if !big_blind.is_zero() => big_blind
                .checked_mul(Decimal::from(n))
                .is_some_and(|threshold| initial >= threshold),
            _ => false,
        }
    }

    /// Running totals of `gp`'s player after this hand, with the stack
    /// difference booked as a buy-in.
    fn settle(&self, gp: &PlayerLedgerEntry, hand: &HandLedger) -> Result<Staged, LedgerError> {
        let mut player = self
            .player(&gp.name)
            .cloned()
            .unwrap_or_else(|| PlayerStats::new(gp.name.as_str()));
        let previous = player.prev_chip_count;
        let diff = sub_chips(gp.initial_chip_count, previous)?;

        player.hands_played += 1;
        if gp.vpip {
            player.hands_vpip += 1;
        }
        if !gp.collected.is_zero() {
            player.hands_won += 1;
        }
        if gp.allin {
            player.hands_all_in += 1;
        }
        player.rake = add_chips(player.rake, gp.rake)?;
        player.chips_payed = add_chips(player.chips_payed, gp.payed)?;
        player.chips_won = add_chips(player.chips_won, gp.collected)?;
        player.buyin = add_chips(player.buyin, diff)?;
        player.prev_chip_count = gp.ending_stack();
        player.cashout = player.prev_chip_count;
        player.last_hand_id = Some(hand.id.clone());
        // net and gross must stay representable for the report
        add_chips(sub_chips(player.cashout, player.buyin)?, player.rake)?;

        Ok(Staged {
            previous,
            diff,
            explained: self.rebuy_explained(gp.initial_chip_count, hand.big_blind),
            player,
        })
    }

    /// Consumes one completed hand.
    ///
    /// A hand whose totals would leave the decimal range is rejected with
    /// [`LedgerError::Overflow`] and leaves the session untouched.
    pub fn add_hand(&mut self, hand: HandLedger) -> Result<(), LedgerError> {
        if self.finalized {
            return Err(LedgerError::Finalized);
        }
        let mut staged = Vec::with_capacity(hand.players.len());
        for gp in &hand.players {
            staged.push(self.settle(gp, &hand)?);
        }
        let mut total = Decimal::ZERO;
        let mut bank = Decimal::ZERO;
        let untouched = self.players.iter().filter(|p| hand.get(&p.name).is_none());
        for p in untouched.chain(staged.iter().map(|s| &s.player)) {
            total = add_chips(total, p.gross())?;
            bank = add_chips(bank, p.buyin)?;
        }
        let total_rake = add_chips(self.total_rake, hand.rake)?;

        let cur = HandRef::of(&hand);
        let mut outcomes = Vec::with_capacity(staged.len());
        let mut stacks = Vec::with_capacity(staged.len());
        let mut new_buyins = 0usize;
        let mut negative_buyin = false;
        for (gp, s) in hand.players.iter().zip(staged) {
            outcomes.push(PlayerOutcome {
                player: gp.name.clone(),
                prev_chip_count: s.previous,
                aggregated_result: s.player.gross(),
            });
            stacks.push(StackChange {
                player: gp.name.clone(),
                previous: s.previous,
                initial: gp.initial_chip_count,
            });
            if s.diff < Decimal::ZERO {
                negative_buyin = true;
            } else if s.diff > Decimal::ZERO && !s.explained {
                new_buyins += 1;
            }
            if !s.diff.is_zero() {
                self.buyins.push(BuyIn {
                    player: gp.name.clone(),
                    amount: s.diff,
                    hand: cur.clone(),
                });
            }
            self.store(s.player);
        }

        if total != self.total_sum {
            tracing::warn!(
                hand_id = %cur.id,
                previous = %self.total_sum,
                current = %total,
                "session sum changed"
            );
            self.mismatches.push(Mismatch {
                prev_hand: self.last_hand.clone().unwrap_or_else(|| cur.clone()),
                cur_hand: cur.clone(),
                total_sum: total,
                results: self
                    .players
                    .iter()
                    .map(|p| PlayerResult {
                        player: p.name.clone(),
                        result: p.gross(),
                    })
                    .collect(),
            });
            self.total_sum = total;
        }
        self.total_rake = total_rake;
        self.bank = bank;

        if let Some(prev) = &self.continuity_from {
            if negative_buyin || new_buyins * 2 > hand.players.len() {
                tracing::warn!(
                    prev_hand = %prev.id,
                    hand_id = %cur.id,
                    "stacks changed between hands, hands likely missing"
                );
                self.missed_hands.push(MissedHand {
                    prev_hand: prev.clone(),
                    cur_hand: cur.clone(),
                    stacks,
                });
            }
        }

        self.continuity_from = Some(cur.clone());
        self.last_hand = Some(cur);
        self.hands.push(SettledHand { hand, outcomes });
        Ok(())
    }

    /// Session boundary: the next hand is not checked for continuity.
    pub fn mark_reset(&mut self) -> Result<(), LedgerError> {
        if self.finalized {
            return Err(LedgerError::Finalized);
        }
        tracing::debug!(after = ?self.last_hand.as_ref().map(|h| &h.id), "session reset");
        self.continuity_from = None;
        Ok(())
    }

    /// Closes the session. Calling it again has no effect.
    pub fn finalize(&mut self) -> Result<(), LedgerError> {
        if self.finalized {
            return Ok(());
        }
        self.total_bank = self.bank;
        self.finalized = true;
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Players in order of first appearance.
    pub fn players(&self) -> &[PlayerStats] {
        &self.players
    }

    pub fn player(&self, name: &str) -> Option<&PlayerStats> {
        self.index.get(name).map(|&idx| &self.players[idx])
    }

    pub fn hands(&self) -> &[SettledHand] {
        &self.hands
    }

    pub fn buyins(&self) -> &[BuyIn] {
        &self.buyins
    }

    pub fn missed_hands(&self) -> &[MissedHand] {
        &self.missed_hands
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }

    /// Current session-wide sum of every player's gross result.
    pub fn total_sum(&self) -> Chips {
        self.total_sum
    }

    pub fn total_rake(&self) -> Chips {
        self.total_rake
    }

    /// Sum of all buy-ins; available once finalized.
    pub fn total_bank(&self) -> Chips {
        self.total_bank
    }
}
