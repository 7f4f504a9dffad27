//! Line classification for PokerStars-style hand histories.
//!
//! A [`PatternTable`] is an ordered list of named matchers. Each matcher looks
//! at one trimmed line and either rejects it or extracts a typed
//! [`LineEvent`]. Matchers are tried in declaration order and the first hit
//! wins, so a specific shape must be declared before any broader shape it
//! overlaps with.
//!
//! Player names may contain spaces and colons. Wherever a name is followed by
//! an action keyword the *last* occurrence of the keyword separates them.

use crate::chips::{parse_amount, Chips};
use crate::hand::Street;

/// Which pot a `collected` line refers to.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum PotKind {
    Main,
    Side,
}

/// Typed content of a recognized line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineEvent {
    HandStart { id: String, timestamp: String },
    Seat { name: String, chips: Chips },
    JoinTable { name: String },
    SmallBlind { name: String, amount: Chips },
    BigBlind { name: String, amount: Chips },
    BothBlinds { name: String, amount: Chips },
    Call { name: String, amount: Chips, allin: bool },
    Bet { name: String, amount: Chips, allin: bool },
    Raise {
        name: String,
        /// Increment over the previous bet; informational only.
        by: Chips,
        /// Total the player has in on this street after the raise.
        to: Chips,
        allin: bool,
    },
    Street(Street),
    Collected {
        name: String,
        amount: Chips,
        pot: Option<PotKind>,
    },
    UncalledBet { name: String, amount: Chips },
    TotalPot { pot: Chips, rake: Chips },
    Blank,
    Reset,
    /// Recognized shape without accounting impact.
    Ignored,
}

type Matcher = fn(&str) -> Option<LineEvent>;

/// A named line shape.
#[derive(Clone, Copy)]
pub struct Pattern {
    pub name: &'static str,
    matcher: Matcher,
}

impl Pattern {
    pub const fn new(name: &'static str, matcher: Matcher) -> Self {
        Self { name, matcher }
    }

    pub fn matches(&self, line: &str) -> Option<LineEvent> {
        (self.matcher)(line)
    }
}

impl std::fmt::Debug for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pattern").field("name", &self.name).finish()
    }
}

const STANDARD: &[Pattern] = &[
    Pattern::new("table", table),
    Pattern::new("hand_start", hand_start),
    Pattern::new("join_table", join_table),
    Pattern::new("seat", seat),
    Pattern::new("small_blind", small_blind),
    Pattern::new("big_blind", big_blind),
    Pattern::new("both_blinds", both_blinds),
    Pattern::new("hole_cards", hole_cards),
    Pattern::new("dealt", dealt),
    Pattern::new("folds", folds),
    Pattern::new("checks", checks),
    Pattern::new("calls", calls),
    Pattern::new("bets", bets),
    Pattern::new("raises", raises),
    Pattern::new("uncalled_bet", uncalled_bet),
    Pattern::new("timeout", timeout),
    Pattern::new("no_hand", no_hand),
    Pattern::new("muck_hand", muck_hand),
    Pattern::new("flop", flop),
    Pattern::new("turn", turn),
    Pattern::new("river", river),
    Pattern::new("show_down", show_down),
    Pattern::new("summary", summary),
    Pattern::new("shows", shows),
    Pattern::new("shows_one", shows_one),
    Pattern::new("collected", collected),
    Pattern::new("total_pot", total_pot),
    Pattern::new("board", board),
    Pattern::new("seat_summary", seat_summary),
    Pattern::new("said", said),
    Pattern::new("disconnected", disconnected),
    Pattern::new("connected", connected),
    Pattern::new("timeout_disconnect", timeout_disconnect),
    Pattern::new("sitting_out", sitting_out),
    Pattern::new("leaves", leaves),
    Pattern::new("removed_from_table", removed_from_table),
    Pattern::new("empty", empty),
    Pattern::new("reset", reset),
];

/// Ordered first-match classifier.
#[derive(Debug, Clone)]
pub struct PatternTable {
    patterns: Vec<Pattern>,
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl PatternTable {
    /// The full PokerStars table.
    pub fn standard() -> Self {
        Self {
            patterns: STANDARD.to_vec(),
        }
    }

    /// A table for another client dialect; order is match priority.
    pub fn from_patterns(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            patterns: patterns.into_iter().collect(),
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Classifies an already trimmed line. Returns the winning pattern name too.
    pub fn classify(&self, line: &str) -> Option<(&'static str, LineEvent)> {
        self.patterns
            .iter()
            .find_map(|p| p.matches(line).map(|ev| (p.name, ev)))
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Splits `"<name><keyword><rest>"` at the last `keyword`.
fn split_action<'a>(line: &'a str, keyword: &str) -> Option<(&'a str, &'a str)> {
    let idx = line.rfind(keyword)?;
    let name = non_empty(&line[..idx])?;
    Some((name, &line[idx + keyword.len()..]))
}

fn strip_allin(rest: &str) -> (&str, bool) {
    match rest.strip_suffix(" and is all-in") {
        Some(amount) => (amount, true),
        None => (rest, false),
    }
}

fn amount(token: &str) -> Option<Chips> {
    parse_amount(token).ok()
}

/// Title of a `*** TITLE ***` banner.
fn banner(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches('*');
    if rest.len() == line.len() {
        return None;
    }
    let rest = rest.strip_prefix(' ')?;
    let end = rest.find(" *")?;
    Some(&rest[..end])
}

fn street_banner(line: &str, title: &str, street: Street) -> Option<LineEvent> {
    (banner(line)? == title).then_some(LineEvent::Street(street))
}

fn seat_prefix(line: &str) -> Option<&str> {
    let rest = line.strip_prefix("Seat ")?;
    let digits = rest.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    rest[digits..].strip_prefix(": ")
}

fn is_card(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(r), Some(s), None) if "23456789TJQKA".contains(r) && "scdh".contains(s)
    )
}

/// Last `YYYY/MM/DD HH:MM:SS`-like stamp in `s` that has at least one
/// character in front of it.
fn last_timestamp(s: &str) -> Option<&str> {
    let b = s.as_bytes();
    let digit = |i: usize| b.get(i).is_some_and(u8::is_ascii_digit);
    for start in (1..b.len()).rev() {
        let date_ok = (0..4).all(|k| digit(start + k))
            && b.get(start + 4) == Some(&b'/')
            && digit(start + 5)
            && digit(start + 6)
            && b.get(start + 7) == Some(&b'/')
            && digit(start + 8)
            && digit(start + 9)
            && b.get(start + 10) == Some(&b' ');
        if !date_ok {
            continue;
        }
        let time_len = b[start + 11..]
            .iter()
            .take_while(|c| c.is_ascii_digit() || **c == b':')
            .count();
        if time_len > 0 {
            return Some(&s[start..start + 11 + time_len]);
        }
    }
    None
}

fn table(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_prefix("Table ")?).map(|_| LineEvent::Ignored)
}

fn hand_start(line: &str) -> Option<LineEvent> {
    const PREFIX: &str = "PokerStars";
    if !line.starts_with(PREFIX) {
        return None;
    }
    for (idx, marker) in line.rmatch_indices("Hand #") {
        if idx <= PREFIX.len() {
            break;
        }
        let rest = &line[idx + marker.len()..];
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            continue;
        }
        let Some(after) = rest[digits..].strip_prefix(':') else {
            continue;
        };
        if let Some(timestamp) = last_timestamp(after) {
            return Some(LineEvent::HandStart {
                id: rest[..digits].to_string(),
                timestamp: timestamp.to_string(),
            });
        }
    }
    None
}

fn join_table(line: &str) -> Option<LineEvent> {
    let (name, _) = split_action(line, " joins the table at seat")?;
    Some(LineEvent::JoinTable {
        name: name.to_string(),
    })
}

fn seat(line: &str) -> Option<LineEvent> {
    let rest = seat_prefix(line)?.strip_suffix(" in chips)")?;
    let (name, chips) = split_action(rest, " (")?;
    Some(LineEvent::Seat {
        name: name.to_string(),
        chips: amount(chips)?,
    })
}

fn small_blind(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": posts small blind ")?;
    Some(LineEvent::SmallBlind {
        name: name.to_string(),
        amount: amount(rest)?,
    })
}

fn big_blind(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": posts big blind ")?;
    Some(LineEvent::BigBlind {
        name: name.to_string(),
        amount: amount(rest)?,
    })
}

fn both_blinds(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": posts small & big blinds ")?;
    Some(LineEvent::BothBlinds {
        name: name.to_string(),
        amount: amount(rest)?,
    })
}

fn hole_cards(line: &str) -> Option<LineEvent> {
    let title = banner(line)?;
    let tail = line.trim_end_matches('*');
    (title == "HOLE CARDS" && tail.len() < line.len() && tail.ends_with(" HOLE CARDS "))
        .then_some(LineEvent::Ignored)
}

fn dealt(line: &str) -> Option<LineEvent> {
    line.starts_with("Dealt to ").then_some(LineEvent::Ignored)
}

fn folds(line: &str) -> Option<LineEvent> {
    split_action(line, ": folds").map(|_| LineEvent::Ignored)
}

fn checks(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(": checks")?).map(|_| LineEvent::Ignored)
}

fn calls(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": calls ")?;
    let (token, allin) = strip_allin(rest);
    Some(LineEvent::Call {
        name: name.to_string(),
        amount: amount(token)?,
        allin,
    })
}

fn bets(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": bets ")?;
    let (token, allin) = strip_allin(rest);
    Some(LineEvent::Bet {
        name: name.to_string(),
        amount: amount(token)?,
        allin,
    })
}

fn raises(line: &str) -> Option<LineEvent> {
    let (name, rest) = split_action(line, ": raises ")?;
    let (amounts, allin) = strip_allin(rest);
    let (by, to) = amounts.split_once(" to ")?;
    Some(LineEvent::Raise {
        name: name.to_string(),
        by: amount(by)?,
        to: amount(to)?,
        allin,
    })
}

fn uncalled_bet(line: &str) -> Option<LineEvent> {
    let rest = line.strip_prefix("Uncalled bet (")?;
    let (token, name) = rest.split_once(") returned to ")?;
    Some(LineEvent::UncalledBet {
        name: non_empty(name)?.to_string(),
        amount: amount(token)?,
    })
}

fn timeout(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" has timed out")?).map(|_| LineEvent::Ignored)
}

fn no_hand(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(": doesn't show hand")?).map(|_| LineEvent::Ignored)
}

fn muck_hand(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(": mucks hand")?).map(|_| LineEvent::Ignored)
}

fn flop(line: &str) -> Option<LineEvent> {
    street_banner(line, "FLOP", Street::Flop)
}

fn turn(line: &str) -> Option<LineEvent> {
    street_banner(line, "TURN", Street::Turn)
}

fn river(line: &str) -> Option<LineEvent> {
    street_banner(line, "RIVER", Street::River)
}

fn show_down(line: &str) -> Option<LineEvent> {
    street_banner(line, "SHOW DOWN", Street::Showdown)
}

fn summary(line: &str) -> Option<LineEvent> {
    (banner(line)? == "SUMMARY").then_some(LineEvent::Ignored)
}

fn shown_cards(line: &str) -> Option<&str> {
    let (_, rest) = split_action(line, ": shows [")?;
    let end = rest.find(']')?;
    Some(&rest[..end])
}

fn shows(line: &str) -> Option<LineEvent> {
    let (a, b) = shown_cards(line)?.split_once(' ')?;
    (is_card(a) && is_card(b)).then_some(LineEvent::Ignored)
}

fn shows_one(line: &str) -> Option<LineEvent> {
    is_card(shown_cards(line)?).then_some(LineEvent::Ignored)
}

fn collected(line: &str) -> Option<LineEvent> {
    for (idx, marker) in line.rmatch_indices(" collected ") {
        let Some(name) = non_empty(&line[..idx]) else {
            continue;
        };
        let rest = &line[idx + marker.len()..];
        let Some((token, tail)) = rest.split_once(" from ") else {
            continue;
        };
        let Some(value) = amount(token) else {
            continue;
        };
        let pot = if tail.starts_with("side pot") {
            Some(PotKind::Side)
        } else if tail.starts_with("main pot") {
            Some(PotKind::Main)
        } else if tail.starts_with("pot") {
            None
        } else {
            continue;
        };
        return Some(LineEvent::Collected {
            name: name.to_string(),
            amount: value,
            pot,
        });
    }
    None
}

fn total_pot(line: &str) -> Option<LineEvent> {
    let rest = line.strip_prefix("Total pot ")?;
    let token_len = rest
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '$' | '.' | ','))
        .count();
    let pot = amount(&rest[..token_len])?;
    let rake_idx = rest.rfind(" | Rake ")?;
    if rake_idx < token_len {
        return None;
    }
    let rake = amount(&rest[rake_idx + " | Rake ".len()..])?;
    Some(LineEvent::TotalPot { pot, rake })
}

fn board(line: &str) -> Option<LineEvent> {
    line.starts_with("Board [").then_some(LineEvent::Ignored)
}

fn seat_summary(line: &str) -> Option<LineEvent> {
    let rest = seat_prefix(line)?;
    [" folded", " showed", " mucked", " collected"]
        .iter()
        .any(|kw| rest.find(kw).is_some_and(|idx| idx > 0))
        .then_some(LineEvent::Ignored)
}

fn said(line: &str) -> Option<LineEvent> {
    line.find(" said, \"")
        .is_some_and(|idx| idx > 0)
        .then_some(LineEvent::Ignored)
}

fn disconnected(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" is disconnected")?).map(|_| LineEvent::Ignored)
}

fn connected(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" is connected")?).map(|_| LineEvent::Ignored)
}

fn timeout_disconnect(line: &str) -> Option<LineEvent> {
    let rest = line.strip_suffix(" disconnected")?;
    let name = rest
        .strip_suffix(" has timed out while being")
        .or_else(|| rest.strip_suffix(" has timed out while"))?;
    non_empty(name).map(|_| LineEvent::Ignored)
}

fn sitting_out(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" is sitting out")?).map(|_| LineEvent::Ignored)
}

fn leaves(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" leaves the table")?).map(|_| LineEvent::Ignored)
}

fn removed_from_table(line: &str) -> Option<LineEvent> {
    non_empty(line.strip_suffix(" was removed from the table for failing to post")?)
        .map(|_| LineEvent::Ignored)
}

fn empty(line: &str) -> Option<LineEvent> {
    line.is_empty().then_some(LineEvent::Blank)
}

fn reset(line: &str) -> Option<LineEvent> {
    (line == "RESET").then_some(LineEvent::Reset)
}
