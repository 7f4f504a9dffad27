//! Command-line argument definitions.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "potledger",
    version,
    about = "Chip accounting for PokerStars home-game hand histories"
)]
pub struct PotledgerCli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Per-player summary with missed hands and sum mismatches
    Summary {
        /// Hand history file (plain text or .zst)
        #[arg(long)]
        input: String,
        /// List every buy-in
        #[arg(long)]
        buyins: bool,
        /// Print the lines no pattern recognized
        #[arg(long)]
        unknown_lines: bool,
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Hand-by-hand ledger for debugging
    Verbose {
        #[arg(long)]
        input: String,
        /// Restrict the output to one player
        #[arg(long)]
        trace: Option<String>,
    },
    /// Running result of every player after each hand
    Dynamics {
        #[arg(long)]
        input: String,
        /// Separate columns with tabs instead of commas
        #[arg(long)]
        tabs: bool,
    },
    /// Rewrite a play-money history into the dollar dialect
    Convert {
        #[arg(long)]
        input: String,
        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<String>,
    },
    /// Show the effective configuration and where each value came from
    Cfg,
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Summary { .. } => "summary",
            Commands::Verbose { .. } => "verbose",
            Commands::Dynamics { .. } => "dynamics",
            Commands::Convert { .. } => "convert",
            Commands::Cfg => "cfg",
        }
    }
}
