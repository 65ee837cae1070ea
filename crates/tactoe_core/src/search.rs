//! Minimax search with alpha-beta pruning and a depth cutoff.
//!
//! The search mutates the caller's board in place: each candidate is placed,
//! searched and cleared again before the next sibling is tried. No board is
//! cloned per branch, and the board is identical to its original state once
//! [`Searcher::best_move`] returns.
//!
//! # Scoring
//!
//! | node                                  | score         |
//! |---------------------------------------|---------------|
//! | `Win(ai)`                             | `10 - depth`  |
//! | `Win(opponent)`                       | `-10 - depth` |
//! | `Draw`                                | `0`           |
//! | depth limit reached while in progress | `0`           |
//!
//! `depth` counts the plies searched below the candidate placed at the root,
//! so a move that wins on the spot scores `10`.
//!
//! # Example
//!
//! ```
//! use tactoe_core::{Board, GridSize, Searcher, Symbol};
//!
//! let mut board = Board::new(GridSize::CLASSIC);
//! let mut searcher = Searcher::new(9);
//! let result = searcher
//!     .best_move(&mut board, Symbol::First, Symbol::Second)
//!     .expect("empty board has moves");
//! assert_eq!(result.score, 0);
//! ```

use crate::board::Board;
use crate::rules::{Outcome, outcome};
use crate::types::Symbol;
use tracing::{debug, instrument};

/// Default depth limit.
///
/// On 3×3 four plies are enough to take any immediate win and block any
/// immediate loss. On 4×4 and 5×5 the opening positions hold no threat within
/// the horizon, so every candidate scores 0 and the first empty cell in
/// row-major order is played until a line comes within reach.
pub const DEFAULT_DEPTH_LIMIT: u8 = 4;

/// Base score of a decided game.
const WIN_SCORE: i32 = 10;

/// Bound larger than any reachable score.
const INF: i32 = i32::MAX;

/// Move chosen by the search and its minimax value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    /// Row of the chosen cell.
    pub row: usize,
    /// Column of the chosen cell.
    pub col: usize,
    /// Minimax value from the AI's perspective.
    pub score: i32,
}

/// Depth-limited alpha-beta searcher.
///
/// A searcher owns no board; it borrows one mutably for the duration of a
/// call, so only one search can use a given board at a time.
#[derive(Debug, Clone)]
pub struct Searcher {
    depth_limit: u8,
    nodes: u64,
}

impl Searcher {
    /// Creates a searcher with the given depth limit.
    pub fn new(depth_limit: u8) -> Self {
        Self {
            depth_limit,
            nodes: 0,
        }
    }

    /// Configured depth limit.
    pub fn depth_limit(&self) -> u8 {
        self.depth_limit
    }

    /// Nodes visited by the last search.
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Finds the best cell for `ai` to play.
    ///
    /// Candidates are tried in row-major order and the first one reaching the
    /// highest score is kept. Returns `None` only if the board has no empty
    /// cell. The caller must not search a board that is already won.
    #[instrument(skip(self, board), fields(size = %board.size(), depth_limit = self.depth_limit))]
    pub fn best_move(
        &mut self,
        board: &mut Board,
        ai: Symbol,
        opponent: Symbol,
    ) -> Option<SearchResult> {
        self.nodes = 0;
        let n = board.n();
        let mut best: Option<SearchResult> = None;

        for row in 0..n {
            for col in 0..n {
                if !board.is_empty(row, col) {
                    continue;
                }
                board.place(row, col, ai);
                let score = self.alpha_beta(board, ai, opponent, 0, false, -INF, INF);
                board.unplace(row, col);

                if best.is_none_or(|b| score > b.score) {
                    best = Some(SearchResult { row, col, score });
                }
            }
        }

        debug!(?best, nodes = self.nodes, "Search complete");
        best
    }

    #[allow(clippy::too_many_arguments)]
    fn alpha_beta(
        &mut self,
        board: &mut Board,
        ai: Symbol,
        opponent: Symbol,
        depth: u8,
        maximizing: bool,
        mut alpha: i32,
        mut beta: i32,
    ) -> i32 {
        self.nodes += 1;

        if let Some(score) = terminal_score(board, ai, depth, self.depth_limit) {
            return score;
        }

        let n = board.n();
        let (symbol, mut best) = if maximizing {
            (ai, -INF)
        } else {
            (opponent, INF)
        };

        'cells: for row in 0..n {
            for col in 0..n {
                if !board.is_empty(row, col) {
                    continue;
                }
                board.place(row, col, symbol);
                let score =
                    self.alpha_beta(board, ai, opponent, depth + 1, !maximizing, alpha, beta);
                board.unplace(row, col);

                if maximizing {
                    best = best.max(score);
                    alpha = alpha.max(score);
                } else {
                    best = best.min(score);
                    beta = beta.min(score);
                }
                if beta <= alpha {
                    break 'cells;
                }
            }
        }

        best
    }
}

impl Default for Searcher {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH_LIMIT)
    }
}

/// Convenience wrapper around [`Searcher::best_move`].
pub fn best_move(
    board: &mut Board,
    ai: Symbol,
    opponent: Symbol,
    depth_limit: u8,
) -> Option<SearchResult> {
    Searcher::new(depth_limit).best_move(board, ai, opponent)
}

/// Plain minimax without pruning, used to cross-check [`Searcher`].
///
/// Same scan order, scoring and tie-breaking; exponentially slower.
#[instrument(skip(board), fields(size = %board.size()))]
pub fn reference_best_move(
    board: &mut Board,
    ai: Symbol,
    opponent: Symbol,
    depth_limit: u8,
) -> Option<SearchResult> {
    let n = board.n();
    let mut best: Option<SearchResult> = None;
    for row in 0..n {
        for col in 0..n {
            if !board.is_empty(row, col) {
                continue;
            }
            board.place(row, col, ai);
            let score = minimax(board, ai, opponent, 0, false, depth_limit);
            board.unplace(row, col);
            if best.is_none_or(|b| score > b.score) {
                best = Some(SearchResult { row, col, score });
            }
        }
    }
    best
}

fn minimax(
    board: &mut Board,
    ai: Symbol,
    opponent: Symbol,
    depth: u8,
    maximizing: bool,
    depth_limit: u8,
) -> i32 {
    if let Some(score) = terminal_score(board, ai, depth, depth_limit) {
        return score;
    }
    let symbol = if maximizing { ai } else { opponent };
    let mut scores = Vec::new();
    let n = board.n();
    for row in 0..n {
        for col in 0..n {
            if board.is_empty(row, col) {
                board.place(row, col, symbol);
                scores.push(minimax(board, ai, opponent, depth + 1, !maximizing, depth_limit));
                board.unplace(row, col);
            }
        }
    }
    let best = if maximizing {
        scores.into_iter().max()
    } else {
        scores.into_iter().min()
    };
    best.unwrap_or(0)
}

/// Score of a node that ends the search, or `None` to keep expanding.
fn terminal_score(board: &Board, ai: Symbol, depth: u8, depth_limit: u8) -> Option<i32> {
    let depth_penalty = i32::from(depth);
    match outcome(board) {
        Outcome::Win(winner) if winner == ai => Some(WIN_SCORE - depth_penalty),
        Outcome::Win(_) => Some(-WIN_SCORE - depth_penalty),
        Outcome::Draw => Some(0),
        Outcome::InProgress if depth >= depth_limit => Some(0),
        Outcome::InProgress => None,
    }
}
