//! Step-by-step replay of a finished game.

use crate::board::{Board, MoveError};
use crate::record::{GameRecord, StoredRecord};
use crate::rules::{Outcome, outcome};
use crate::types::GridSize;
use tracing::{debug, instrument, warn};

/// A replay step that would corrupt the board.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum ReplayError {
    /// The record's move at `index` cannot be applied.
    #[display("Malformed replay record at move {}: {}", index, reason)]
    MalformedReplayRecord {
        /// Index of the offending move.
        index: usize,
        /// Why the move was refused.
        reason: MoveError,
    },
}

impl std::error::Error for ReplayError {}

/// Progress of a replay, derived from the record and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayStatus {
    /// The record has no moves.
    NoMoves,
    /// Every move has been applied.
    Finished,
    /// `applied` of `total` moves are on the board.
    Stepping {
        /// Moves applied so far.
        applied: usize,
        /// Moves in the record.
        total: usize,
    },
    /// The record could not be read; an empty 3×3 game is shown instead.
    Unreadable(String),
}

impl std::fmt::Display for ReplayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayStatus::NoMoves => write!(f, "No moves available"),
            ReplayStatus::Finished => write!(f, "Replay finished"),
            ReplayStatus::Stepping { applied, total } => write!(f, "Move {applied} of {total}"),
            ReplayStatus::Unreadable(reason) => write!(f, "Record unreadable: {reason}"),
        }
    }
}

/// Replays a [`GameRecord`] onto a fresh board, one ply at a time.
///
/// The record is never modified; [`Replay::reset`] restarts from an empty
/// board and stepping again reproduces the same boards.
#[derive(Debug, Clone)]
pub struct Replay {
    record: GameRecord,
    board: Board,
    /// Number of moves applied; [`Replay::position`] is one less.
    applied: usize,
    unreadable: Option<String>,
}

impl Replay {
    /// Starts a replay of `record`.
    #[instrument(skip(record), fields(size = %record.grid_size(), moves = record.moves().len()))]
    pub fn new(record: GameRecord) -> Self {
        Self {
            board: Board::new(*record.grid_size()),
            record,
            applied: 0,
            unreadable: None,
        }
    }

    /// Starts a replay of a persisted entry.
    ///
    /// An entry that fails validation is replaced by an empty 3×3 game and the
    /// reason is reported through [`Replay::status`].
    #[instrument(skip(stored))]
    pub fn from_stored(stored: &StoredRecord) -> Self {
        match stored.to_record() {
            Ok(record) => Self::new(record),
            Err(e) => {
                warn!(error = %e, "Replaying unreadable record as empty game");
                let mut replay = Self::new(GameRecord::new(
                    GridSize::CLASSIC,
                    Outcome::InProgress,
                    Vec::new(),
                ));
                replay.unreadable = Some(e.to_string());
                replay
            }
        }
    }

    /// The record being replayed.
    pub fn record(&self) -> &GameRecord {
        &self.record
    }

    /// The reconstructed board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Index of the last applied move, or `None` before the first step.
    pub fn position(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    /// Outcome of the reconstructed board.
    pub fn outcome(&self) -> Outcome {
        outcome(&self.board)
    }

    /// Result text of the record, or a placeholder for unreadable entries.
    pub fn result_text(&self) -> String {
        if self.unreadable.is_some() {
            "No result available".to_string()
        } else {
            self.record.result_text()
        }
    }

    /// Returns true once every move has been applied.
    pub fn is_finished(&self) -> bool {
        self.applied >= self.record.moves().len()
    }

    /// Applies the next move.
    ///
    /// Returns `Ok(false)` without changes if the replay is already finished.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::MalformedReplayRecord`] if the next move is out
    /// of range, targets an occupied cell, or follows a finished game. The
    /// board and position are left unchanged.
    #[instrument(skip(self), fields(applied = self.applied))]
    pub fn step(&mut self) -> Result<bool, ReplayError> {
        let Some(mv) = self.record.moves().get(self.applied).copied() else {
            debug!("Replay already finished");
            return Ok(false);
        };

        self.board
            .apply_move(mv.row, mv.col, mv.symbol)
            .map_err(|reason| {
                warn!(index = self.applied, %reason, "Refusing malformed replay step");
                ReplayError::MalformedReplayRecord {
                    index: self.applied,
                    reason,
                }
            })?;

        self.applied += 1;
        debug!(%mv, "Replayed move");
        Ok(true)
    }

    /// Applies every remaining move, stopping at the first malformed one.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReplayError`] encountered.
    pub fn run_to_end(&mut self) -> Result<(), ReplayError> {
        while self.step()? {}
        Ok(())
    }

    /// Clears the board and rewinds to before the first move.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        self.board.clear();
        self.applied = 0;
    }

    /// Current progress.
    pub fn status(&self) -> ReplayStatus {
        let total = self.record.moves().len();
        if let Some(reason) = &self.unreadable {
            ReplayStatus::Unreadable(reason.clone())
        } else if total == 0 {
            ReplayStatus::NoMoves
        } else if self.applied >= total {
            ReplayStatus::Finished
        } else {
            ReplayStatus::Stepping {
                applied: self.applied,
                total,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Move, Symbol};

    fn record(moves: &[(Symbol, usize, usize)], result: Outcome) -> GameRecord {
        let moves = moves
            .iter()
            .enumerate()
            .map(|(i, &(s, r, c))| Move::new(s, r, c, i))
            .collect();
        GameRecord::new(GridSize::CLASSIC, result, moves)
    }

    #[test]
    fn test_status_progression() {
        let mut replay = Replay::new(record(
            &[(Symbol::First, 0, 0), (Symbol::Second, 1, 1)],
            Outcome::InProgress,
        ));
        assert_eq!(replay.position(), None);
        assert_eq!(replay.status().to_string(), "Move 0 of 2");
        assert!(replay.step().unwrap());
        assert_eq!(replay.position(), Some(0));
        assert_eq!(replay.status().to_string(), "Move 1 of 2");
        assert!(replay.step().unwrap());
        assert_eq!(replay.status(), ReplayStatus::Finished);
        assert!(!replay.step().unwrap());
    }

    #[test]
    fn test_no_moves_status() {
        let replay = Replay::new(record(&[], Outcome::Draw));
        assert_eq!(replay.status(), ReplayStatus::NoMoves);
        assert!(replay.is_finished());
    }

    #[test]
    fn test_out_of_range_move_refused() {
        let mut replay = Replay::new(record(
            &[(Symbol::First, 0, 0), (Symbol::Second, 3, 1)],
            Outcome::InProgress,
        ));
        replay.step().unwrap();
        let before = replay.board().clone();
        let err = replay.step().unwrap_err();
        assert!(matches!(
            err,
            ReplayError::MalformedReplayRecord { index: 1, reason: MoveError::OutOfBounds(..) }
        ));
        assert_eq!(replay.board(), &before);
        assert_eq!(replay.position(), Some(0));
    }

    #[test]
    fn test_occupied_target_refused() {
        let mut replay = Replay::new(record(
            &[(Symbol::First, 0, 0), (Symbol::Second, 0, 0)],
            Outcome::InProgress,
        ));
        replay.step().unwrap();
        assert!(replay.step().is_err());
        assert_eq!(replay.board().get(0, 0), Some(Symbol::First));
    }

    #[test]
    fn test_reset_rewinds() {
        let mut replay = Replay::new(record(&[(Symbol::First, 2, 2)], Outcome::InProgress));
        replay.run_to_end().unwrap();
        replay.reset();
        assert_eq!(replay.position(), None);
        assert!(replay.board().is_empty(2, 2));
        replay.step().unwrap();
        assert_eq!(replay.board().get(2, 2), Some(Symbol::First));
    }

    #[test]
    fn test_unreadable_entry_falls_back() {
        let stored = StoredRecord {
            result: Some("X wins!".into()),
            grid_size: Some(9),
            moves: Some(vec![]),
        };
        let mut replay = Replay::from_stored(&stored);
        assert_eq!(replay.board().size(), GridSize::CLASSIC);
        assert!(matches!(replay.status(), ReplayStatus::Unreadable(_)));
        assert_eq!(replay.result_text(), "No result available");
        assert!(!replay.step().unwrap());
    }
}
