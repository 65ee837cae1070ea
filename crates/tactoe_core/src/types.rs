//! Core domain types: player symbols, grid sizes and moves.

use serde::{Deserialize, Serialize};
use tracing::instrument;

/// One of the two players' marks.
///
/// `First` always opens a game. Rendered and persisted as `X` / `O`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter,
)]
pub enum Symbol {
    /// The opening player (X).
    #[serde(rename = "X")]
    First,
    /// The second player (O).
    #[serde(rename = "O")]
    Second,
}

impl Symbol {
    /// Returns the other player's symbol.
    pub fn opponent(self) -> Self {
        match self {
            Symbol::First => Symbol::Second,
            Symbol::Second => Symbol::First,
        }
    }

    /// Single-character mark used when rendering boards.
    pub fn mark(self) -> char {
        match self {
            Symbol::First => 'X',
            Symbol::Second => 'O',
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mark())
    }
}

/// Side length of a square board, restricted to 3, 4 or 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridSize(u8);

impl GridSize {
    /// Smallest supported side length.
    pub const MIN: u8 = 3;
    /// Largest supported side length.
    pub const MAX: u8 = 5;
    /// Classic 3×3 tic-tac-toe.
    pub const CLASSIC: GridSize = GridSize(3);

    /// Validates a side length.
    ///
    /// # Errors
    ///
    /// Returns [`GridSizeError`] if `n` is outside `3..=5`.
    #[instrument]
    pub fn new(n: u8) -> Result<Self, GridSizeError> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(GridSizeError(n))
        }
    }

    /// Side length as a `usize` for indexing.
    pub fn get(self) -> usize {
        usize::from(self.0)
    }

    /// Total number of cells (N²).
    pub fn cells(self) -> usize {
        self.get() * self.get()
    }

    /// All supported sizes, smallest first.
    pub fn all() -> impl Iterator<Item = GridSize> {
        (Self::MIN..=Self::MAX).map(GridSize)
    }
}

impl Default for GridSize {
    fn default() -> Self {
        Self::CLASSIC
    }
}

impl TryFrom<u8> for GridSize {
    type Error = GridSizeError;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<GridSize> for u8 {
    fn from(size: GridSize) -> Self {
        size.0
    }
}

impl std::fmt::Display for GridSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.0, self.0)
    }
}

/// A side length outside the supported range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSizeError(pub u8);

impl std::fmt::Display for GridSizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unsupported grid size {} (expected {}..={})",
            self.0,
            GridSize::MIN,
            GridSize::MAX
        )
    }
}

impl std::error::Error for GridSizeError {}

/// A mark placed during a game.
///
/// `sequence` is the 0-based index of the move in play order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    /// The player making the move.
    pub symbol: Symbol,
    /// Row index, `0..N`.
    pub row: usize,
    /// Column index, `0..N`.
    pub col: usize,
    /// Position of this move in the game's move log.
    pub sequence: usize,
}

impl Move {
    /// Creates a new move.
    pub fn new(symbol: Symbol, row: usize, col: usize, sequence: usize) -> Self {
        Self {
            symbol,
            row,
            col,
            sequence,
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "#{} {} -> ({}, {})",
            self.sequence, self.symbol, self.row, self.col
        )
    }
}
