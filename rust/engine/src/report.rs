//! Immutable snapshot of a finished session for the presentation layer.

use std::cmp::Ordering;

use serde::Serialize;

use crate::chips::Chips;
use crate::parser::ParseOutcome;
use crate::stats::{BuyIn, MissedHand, Mismatch, PlayerStats, SettledHand, Stats};

/// One line of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub player: String,
    pub hands_played: u32,
    pub vpip_percent: Option<u32>,
    pub hands_won: u32,
    pub won_percent: Option<u32>,
    pub hands_all_in: u32,
    pub buyin: Chips,
    pub cashout: Chips,
    pub net: Chips,
    pub rake: Chips,
    pub gross: Chips,
    pub chips_payed: Chips,
    pub chips_won: Chips,
    pub last_hand_id: Option<String>,
}

impl From<&PlayerStats> for SummaryRow {
    fn from(p: &PlayerStats) -> Self {
        Self {
            player: p.name.clone(),
            hands_played: p.hands_played,
            vpip_percent: p.vpip_percent(),
            hands_won: p.hands_won,
            won_percent: p.won_percent(),
            hands_all_in: p.hands_all_in,
            buyin: p.buyin,
            cashout: p.cashout,
            net: p.net(),
            rake: p.rake,
            gross: p.gross(),
            chips_payed: p.chips_payed,
            chips_won: p.chips_won,
            last_hand_id: p.last_hand_id.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub success: bool,
    pub error: Option<String>,
    pub unknown_lines: Vec<String>,
    pub hands_played: usize,
    pub total_bank: Chips,
    pub total_rake: Chips,
    pub total_sum: Chips,
    pub players: Vec<SummaryRow>,
    pub missed_hands: Vec<MissedHand>,
    pub mismatches: Vec<Mismatch>,
    /// Sorted by hand id, ties kept in arrival order.
    pub buyins: Vec<BuyIn>,
    pub hands: Vec<SettledHand>,
}

impl Report {
    pub fn build(stats: &Stats, outcome: &ParseOutcome) -> Self {
        let mut buyins = stats.buyins().to_vec();
        buyins.sort_by(|a, b| compare_hand_ids(&a.hand.id, &b.hand.id));
        Self {
            success: outcome.success,
            error: outcome.error.clone(),
            unknown_lines: outcome.unknown_lines.clone(),
            hands_played: stats.hands().len(),
            total_bank: stats.total_bank(),
            total_rake: stats.total_rake(),
            total_sum: stats.total_sum(),
            players: stats.players().iter().map(SummaryRow::from).collect(),
            missed_hands: stats.missed_hands().to_vec(),
            mismatches: stats.mismatches().to_vec(),
            buyins,
            hands: stats.hands().to_vec(),
        }
    }

    pub fn hand(&self, id: &str) -> Option<&SettledHand> {
        self.hands.iter().find(|h| h.hand.id == id)
    }

    /// Per-hand series of every player's running result.
    ///
    /// A player's column stays empty for hands they did not take part in and
    /// for every hand after the last one they played.
    pub fn dynamics(&self) -> Dynamics {
        let mut left = vec![false; self.players.len()];
        let rows = self
            .hands
            .iter()
            .map(|settled| {
                let cells = self
                    .players
                    .iter()
                    .enumerate()
                    .map(|(i, row)| {
                        let cell = if left[i] {
                            None
                        } else {
                            settled.outcome(&row.player).map(|o| o.aggregated_result)
                        };
                        if row.last_hand_id.as_deref() == Some(settled.hand.id.as_str()) {
                            left[i] = true;
                        }
                        cell
                    })
                    .collect();
                DynamicsRow {
                    hand_id: settled.hand.id.clone(),
                    cells,
                }
            })
            .collect();
        Dynamics {
            players: self.players.iter().map(|p| p.player.clone()).collect(),
            rows,
        }
    }
}

/// Numeric ids compare by value, anything else falls back to text order.
fn compare_hand_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        _ => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DynamicsRow {
    pub hand_id: String,
    pub cells: Vec<Option<Chips>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dynamics {
    pub players: Vec<String>,
    pub rows: Vec<DynamicsRow>,
}

impl Dynamics {
    /// Renders the series as delimited text, one header line plus one line per hand.
    pub fn to_delimited(&self, separator: char) -> String {
        let sep = separator.to_string();
        let mut out = String::new();
        out.push_str("game");
        for name in &self.players {
            out.push_str(&sep);
            out.push_str(name);
        }
        out.push('\n');
        for row in &self.rows {
            out.push_str(&row.hand_id);
            for cell in &row.cells {
                out.push_str(&sep);
                if let Some(value) = cell {
                    out.push_str(&value.normalize().to_string());
                }
            }
            out.push('\n');
        }
        out
    }
}
