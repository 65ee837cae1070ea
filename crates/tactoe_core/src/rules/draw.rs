//! Draw detection.

use crate::board::Board;
use tracing::instrument;

/// Checks if every cell holds a symbol.
///
/// A full board with no winner is a draw.
#[instrument(level = "trace", skip(board))]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(Option::is_some)
}
