//! Command-line interface for tactoe.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tactoe - N×N tic-tac-toe with a minimax opponent
#[derive(Parser, Debug)]
#[command(name = "tactoe")]
#[command(about = "Play 3x3 to 5x5 tic-tac-toe against a minimax opponent", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Board side length (3, 4 or 5)
    #[arg(long, global = true)]
    pub grid_size: Option<u8>,

    /// Search depth limit
    #[arg(long, global = true)]
    pub depth: Option<u8>,

    /// Let the computer play O
    #[arg(long, global = true)]
    pub assist: bool,

    /// History database file, or ":memory:"
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play an interactive game
    Play,

    /// List stored games and the win summary
    History,

    /// Step through a stored game
    Replay {
        /// Index from `tactoe history`
        index: usize,

        /// Print every step without waiting for Enter
        #[arg(long)]
        all: bool,
    },

    /// Delete stored history
    Clear {
        /// Clear the whole store, not just the history
        #[arg(long)]
        all: bool,
    },

    /// Ask the search engine for the next move
    Suggest {
        /// Moves played so far, X first, e.g. "1,1 0,0"
        #[arg(long, default_value = "")]
        moves: String,
    },
}

/// A line typed during `tactoe play`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Place a mark.
    Move(usize, usize),
    /// Start over.
    Reset,
    /// Toggle the computer opponent.
    Assist(bool),
    /// Change the search depth.
    Depth(u8),
    /// Print the board.
    Board,
    /// Print help.
    Help,
    /// Leave.
    Quit,
}

impl PlayCommand {
    /// Parses a line; `None` if it is not a command.
    pub fn parse(line: &str) -> Option<Self> {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["reset"] => Some(Self::Reset),
            ["assist", "on"] => Some(Self::Assist(true)),
            ["assist", "off"] => Some(Self::Assist(false)),
            ["depth", depth] => Some(Self::Depth(depth.parse().ok()?)),
            ["board"] => Some(Self::Board),
            ["help"] | ["?"] => Some(Self::Help),
            ["quit"] | ["exit"] | ["q"] => Some(Self::Quit),
            [row, col] => Some(Self::Move(row.parse().ok()?, col.parse().ok()?)),
            _ => None,
        }
    }
}

/// Help text for `tactoe play`.
pub const PLAY_HELP: &str = "\
Commands:
  <row> <col>    place your mark (0-based)
  reset          start a new game
  assist on|off  toggle the computer opponent
  depth <n>      plies the computer looks ahead
  board          show the board
  quit           leave";

/// Parses `"r,c r,c ..."` into cells.
///
/// # Errors
///
/// Returns the offending token if it is not `row,col`.
pub fn parse_cells(moves: &str) -> Result<Vec<(usize, usize)>, String> {
    moves
        .split_whitespace()
        .map(|token| {
            let (row, col) = token
                .split_once(',')
                .ok_or_else(|| format!("expected row,col but got '{token}'"))?;
            let row = row
                .trim()
                .parse()
                .map_err(|_| format!("bad row in '{token}'"))?;
            let col = col
                .trim()
                .parse()
                .map_err(|_| format!("bad column in '{token}'"))?;
            Ok((row, col))
        })
        .collect()
}
