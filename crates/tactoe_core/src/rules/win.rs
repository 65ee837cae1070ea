//! Win detection over the 2N + 2 candidate lines.

use crate::board::Board;
use crate::types::Symbol;
use tracing::instrument;

/// Returns the owner of a complete line, if any.
///
/// Scan order is fixed: rows, then columns, then the main diagonal, then the
/// anti-diagonal. If two lines of different symbols are somehow complete, the
/// first one found is reported.
#[instrument(level = "trace", skip(board))]
pub fn check_winner(board: &Board) -> Option<Symbol> {
    let n = board.n();

    let rows = (0..n).find_map(|r| line_owner(board, (0..n).map(|c| (r, c))));
    if rows.is_some() {
        return rows;
    }

    let cols = (0..n).find_map(|c| line_owner(board, (0..n).map(|r| (r, c))));
    if cols.is_some() {
        return cols;
    }

    line_owner(board, (0..n).map(|i| (i, i)))
        .or_else(|| line_owner(board, (0..n).map(|i| (i, n - 1 - i))))
}

/// Returns the symbol filling every cell of the line, if one does.
fn line_owner(board: &Board, mut cells: impl Iterator<Item = (usize, usize)>) -> Option<Symbol> {
    let (r, c) = cells.next()?;
    let first = board.get(r, c)?;
    cells
        .all(|(r, c)| board.get(r, c) == Some(first))
        .then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GridSize;

    fn board_with(size: u8, cells: &[(usize, usize, Symbol)]) -> Board {
        let mut board = Board::new(GridSize::new(size).unwrap());
        for &(r, c, s) in cells {
            board.place(r, c, s);
        }
        board
    }

    #[test]
    fn test_no_winner_empty_board() {
        for size in GridSize::all() {
            assert_eq!(check_winner(&Board::new(size)), None);
        }
    }

    #[test]
    fn test_every_line_wins_on_every_size() {
        for size in GridSize::all() {
            let n = size.get();
            let mut lines: Vec<Vec<(usize, usize)>> = Vec::new();
            for i in 0..n {
                lines.push((0..n).map(|c| (i, c)).collect());
                lines.push((0..n).map(|r| (r, i)).collect());
            }
            lines.push((0..n).map(|i| (i, i)).collect());
            lines.push((0..n).map(|i| (i, n - 1 - i)).collect());
            assert_eq!(lines.len(), 2 * n + 2);

            for line in lines {
                let cells: Vec<_> = line.iter().map(|&(r, c)| (r, c, Symbol::Second)).collect();
                let board = board_with(u8::try_from(n).unwrap(), &cells);
                assert_eq!(check_winner(&board), Some(Symbol::Second), "line {line:?}");
            }
        }
    }

    #[test]
    fn test_incomplete_line_not_a_win() {
        let board = board_with(
            4,
            &[(0, 0, Symbol::First), (0, 1, Symbol::First), (0, 2, Symbol::First)],
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_mixed_line_not_a_win() {
        let board = board_with(
            3,
            &[(1, 0, Symbol::First), (1, 1, Symbol::Second), (1, 2, Symbol::First)],
        );
        assert_eq!(check_winner(&board), None);
    }

    #[test]
    fn test_scan_order_is_deterministic() {
        // Two complete rows: the upper one is found first.
        let mut cells: Vec<_> = (0..3).map(|c| (0, c, Symbol::First)).collect();
        cells.extend((0..3).map(|c| (2, c, Symbol::Second)));
        assert_eq!(check_winner(&board_with(3, &cells)), Some(Symbol::First));

        // Two complete columns, no rows: the leftmost is found first.
        let mut cells: Vec<_> = (0..3).map(|r| (r, 0, Symbol::Second)).collect();
        cells.extend((0..3).map(|r| (r, 1, Symbol::First)));
        assert_eq!(check_winner(&board_with(3, &cells)), Some(Symbol::Second));
    }
}
