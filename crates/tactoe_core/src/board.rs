//! N×N board storage.

use crate::rules::{Outcome, outcome};
use crate::types::{GridSize, Symbol};
use tracing::{debug, instrument};

/// Error returned when a mark cannot be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum MoveError {
    /// The target cell already holds a symbol.
    #[display("Cell ({}, {}) is already occupied", _0, _1)]
    OccupiedCell(usize, usize),

    /// The board is already won or drawn.
    #[display("Game is already over")]
    GameAlreadyTerminal,

    /// The target cell is outside the grid.
    #[display("Cell ({}, {}) is outside the {} grid", _0, _1, _2)]
    OutOfBounds(usize, usize, GridSize),
}

impl std::error::Error for MoveError {}

/// Square grid of optional symbols, stored row-major.
///
/// The side length is fixed for the lifetime of the board.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    size: GridSize,
    cells: Vec<Option<Symbol>>,
}

impl Board {
    /// Creates an empty board.
    #[instrument]
    pub fn new(size: GridSize) -> Self {
        Self {
            size,
            cells: vec![None; size.cells()],
        }
    }

    /// Side length of the board.
    pub fn size(&self) -> GridSize {
        self.size
    }

    /// Side length as a `usize`.
    pub fn n(&self) -> usize {
        self.size.get()
    }

    /// Returns the symbol at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates lie outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Symbol> {
        self.cells[self.index(row, col)]
    }

    /// Returns true if `(row, col)` is inside the grid.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.n() && col < self.n()
    }

    /// Returns true if `(row, col)` holds no symbol.
    pub fn is_empty(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_none()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[Option<Symbol>] {
        &self.cells
    }

    /// Number of cells holding a symbol.
    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Empty cells as `(row, col)` pairs, row-major.
    pub fn empty_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n();
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(move |(i, _)| (i / n, i % n))
    }

    /// Places `symbol` at `(row, col)`.
    ///
    /// The board is unchanged on error.
    ///
    /// # Errors
    ///
    /// - [`MoveError::OutOfBounds`] if the cell is outside the grid
    /// - [`MoveError::OccupiedCell`] if the cell already holds a symbol
    /// - [`MoveError::GameAlreadyTerminal`] if the board is won or drawn
    #[instrument(skip(self), fields(size = %self.size))]
    pub fn apply_move(&mut self, row: usize, col: usize, symbol: Symbol) -> Result<(), MoveError> {
        if !self.contains(row, col) {
            return Err(MoveError::OutOfBounds(row, col, self.size));
        }
        if !self.is_empty(row, col) {
            return Err(MoveError::OccupiedCell(row, col));
        }
        if outcome(self) != Outcome::InProgress {
            return Err(MoveError::GameAlreadyTerminal);
        }

        self.place(row, col, symbol);
        debug!(row, col, %symbol, "Mark placed");
        Ok(())
    }

    /// Clears every cell.
    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Sets a cell without validation (search scratch space).
    pub(crate) fn place(&mut self, row: usize, col: usize, symbol: Symbol) {
        let i = self.index(row, col);
        self.cells[i] = Some(symbol);
    }

    /// Empties a cell without validation (search scratch space).
    pub(crate) fn unplace(&mut self, row: usize, col: usize) {
        let i = self.index(row, col);
        self.cells[i] = None;
    }

    fn index(&self, row: usize, col: usize) -> usize {
        assert!(
            self.contains(row, col),
            "cell ({row}, {col}) outside {} board",
            self.size
        );
        row * self.n() + col
    }

    /// Formats the board as a human-readable grid.
    pub fn display(&self) -> String {
        let n = self.n();
        let mut out = String::new();
        for row in 0..n {
            for col in 0..n {
                let mark = self.get(row, col).map_or('.', Symbol::mark);
                out.push(mark);
                if col + 1 < n {
                    out.push('|');
                }
            }
            if row + 1 < n {
                out.push('\n');
                out.push_str(&vec!["-"; n].join("+"));
                out.push('\n');
            }
        }
        out
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_board_is_empty_for_all_sizes() {
        for size in GridSize::all() {
            let board = Board::new(size);
            assert_eq!(board.empty_cells().count(), size.cells());
            assert_eq!(outcome(&board), Outcome::InProgress);
        }
    }

    #[test]
    fn test_occupied_cell_rejected_without_change() {
        let mut board = Board::new(GridSize::CLASSIC);
        board.apply_move(1, 1, Symbol::First).unwrap();
        let before = board.clone();

        let result = board.apply_move(1, 1, Symbol::Second);
        assert_eq!(result, Err(MoveError::OccupiedCell(1, 1)));
        assert_eq!(board, before);
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let mut board = Board::new(GridSize::CLASSIC);
        assert!(matches!(
            board.apply_move(3, 0, Symbol::First),
            Err(MoveError::OutOfBounds(3, 0, _))
        ));
    }

    #[test]
    fn test_terminal_board_rejects_moves() {
        let mut board = Board::new(GridSize::CLASSIC);
        for col in 0..3 {
            board.apply_move(0, col, Symbol::First).unwrap();
        }
        assert_eq!(
            board.apply_move(2, 2, Symbol::Second),
            Err(MoveError::GameAlreadyTerminal)
        );
        assert!(board.is_empty(2, 2));
    }

    #[test]
    fn test_empty_cells_row_major() {
        let mut board = Board::new(GridSize::CLASSIC);
        board.apply_move(0, 0, Symbol::First).unwrap();
        let first: Vec<_> = board.empty_cells().take(3).collect();
        assert_eq!(first, vec![(0, 1), (0, 2), (1, 0)]);
    }

    #[test]
    fn test_display() {
        let mut board = Board::new(GridSize::CLASSIC);
        board.apply_move(0, 0, Symbol::First).unwrap();
        board.apply_move(1, 1, Symbol::Second).unwrap();
        assert_eq!(board.display(), "X|.|.\n-+-+-\n.|O|.\n-+-+-\n.|.|.");
    }
}
