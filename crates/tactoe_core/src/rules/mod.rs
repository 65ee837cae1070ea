//! Terminal-state detection for N×N boards.
//!
//! Rules are pure functions over [`Board`] so the search engine and the
//! controller share a single definition of "game over".

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::check_winner;

use crate::board::Board;
use crate::types::Symbol;
use tracing::instrument;

/// Classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Moves remain and nobody has a complete line.
    InProgress,
    /// The symbol owns a complete row, column or diagonal.
    Win(Symbol),
    /// Every cell is filled and no line is complete.
    Draw,
}

impl Outcome {
    /// Returns true once the game can accept no more moves.
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    /// Parses the display text written into game records.
    #[instrument]
    pub fn from_result_text(text: &str) -> Option<Self> {
        match text.trim() {
            "X wins!" => Some(Outcome::Win(Symbol::First)),
            "O wins!" => Some(Outcome::Win(Symbol::Second)),
            "It's a Draw!" => Some(Outcome::Draw),
            "In progress" => Some(Outcome::InProgress),
            _ => None,
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::InProgress => write!(f, "In progress"),
            Outcome::Win(symbol) => write!(f, "{} wins!", symbol),
            Outcome::Draw => write!(f, "It's a Draw!"),
        }
    }
}

/// Computes the outcome of `board` without mutating it.
///
/// Lines are scanned rows first, then columns, then the two diagonals; the
/// first complete line wins. O(N²).
#[instrument(level = "trace", skip(board), fields(size = %board.size()))]
pub fn outcome(board: &Board) -> Outcome {
    if let Some(winner) = check_winner(board) {
        Outcome::Win(winner)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
