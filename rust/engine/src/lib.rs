//! # potledger-engine: Hand-History Chip Accounting
//!
//! Reconstructs a chip-accounting ledger from a PokerStars-style home-game
//! hand history and verifies it across hand boundaries. Every hand is
//! rebuilt from the log lines, rake is apportioned among pot winners, and
//! the session is checked for stack discontinuities ("missed hands") and
//! for changes of the chip-conservation sum ("mismatches").
//!
//! ## Core Modules
//!
//! - [`chips`] - Decimal chip amounts and amount-token parsing
//! - [`patterns`] - Ordered line matchers producing typed [`patterns::LineEvent`]s
//! - [`hand`] - Per-hand ledger: contributions, collections, rake split
//! - [`parser`] - Line-driven hand reconstruction
//! - [`stats`] - Session aggregation with continuity and conservation checks
//! - [`report`] - Serializable session snapshot and dynamics series
//! - [`errors`] - Error types
//!
//! ## Quick Start
//!
//! ```rust
//! use potledger_engine::parser::parse_lines;
//! use potledger_engine::report::Report;
//! use potledger_engine::stats::Stats;
//! use rust_decimal::Decimal;
//!
//! let log = "\
//! PokerStars Home Game Hand #1: Hold'em No Limit (5/10) - 2020/05/01 20:00:00 ET
//! Seat 1: Alice (1000 in chips)
//! Seat 2: Bob (1000 in chips)
//! Alice: posts small blind 5
//! Bob: posts big blind 10
//! Alice: calls 5
//! Bob: checks
//! *** FLOP *** [2c 3d 4h]
//! *** TURN *** [2c 3d 4h] [5s]
//! *** RIVER *** [2c 3d 4h 5s] [9d]
//! Bob collected 20 from pot
//! *** SUMMARY ***
//! Total pot 20 | Rake 0
//! ";
//!
//! let mut stats = Stats::new();
//! let outcome = parse_lines(log.lines(), &mut stats);
//! assert!(outcome.success);
//!
//! let report = Report::build(&stats, &outcome);
//! assert_eq!(report.players[0].gross, Decimal::from(-10));
//! assert_eq!(report.players[1].gross, Decimal::from(10));
//! assert!(report.mismatches.is_empty());
//! ```
//!
//! ## Rebuy Threshold
//!
//! By default any stack increase between two hands counts toward the
//! missed-hand heuristic. A threshold expressed in big blinds lets full
//! top-ups pass as ordinary rebuys:
//!
//! ```rust
//! use potledger_engine::stats::{Stats, StatsConfig};
//!
//! let stats = Stats::with_config(StatsConfig {
//!     rebuy_threshold_bb: Some(100),
//! });
//! assert_eq!(stats.config().rebuy_threshold_bb, Some(100));
//! ```

pub mod chips;
pub mod errors;
pub mod hand;
pub mod parser;
pub mod patterns;
pub mod report;
pub mod stats;
