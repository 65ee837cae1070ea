//! First-class invariants over a game's move log.
//!
//! Invariants are logical properties that must hold throughout play. The
//! controller checks them in debug builds after every applied move.

use crate::board::Board;
use crate::types::{Move, Symbol};

/// A logical property that must hold for a given state.
pub trait Invariant<S: ?Sized> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// A set of invariants that can be checked together.
pub trait InvariantSet<S: ?Sized> {
    /// Checks all invariants in the set, collecting every violation.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

impl<S: ?Sized, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let violations: Vec<_> = [
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, d)| InvariantViolation::new(d))
        .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl<S: ?Sized, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        let mut violations = <(I1, I2)>::check_all(state).err().unwrap_or_default();
        if !I3::holds(state) {
            violations.push(InvariantViolation::new(I3::description()));
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

/// Borrowed view of a board and the moves that produced it.
#[derive(Debug, Clone, Copy)]
pub struct MoveLog<'a> {
    /// Current board.
    pub board: &'a Board,
    /// Moves in play order.
    pub moves: &'a [Move],
}

/// Every logged move corresponds to exactly one occupied cell.
pub struct HistoryConsistentInvariant;

impl Invariant<MoveLog<'_>> for HistoryConsistentInvariant {
    fn holds(log: &MoveLog<'_>) -> bool {
        log.moves.len() == log.board.occupied()
            && log
                .moves
                .iter()
                .all(|m| log.board.get(m.row, m.col) == Some(m.symbol))
    }

    fn description() -> &'static str {
        "Move log matches occupied cells"
    }
}

/// Symbols alternate, starting with `First`.
pub struct AlternatingTurnInvariant;

impl Invariant<MoveLog<'_>> for AlternatingTurnInvariant {
    fn holds(log: &MoveLog<'_>) -> bool {
        log.moves.iter().enumerate().all(|(i, m)| {
            let expected = if i % 2 == 0 {
                Symbol::First
            } else {
                Symbol::Second
            };
            m.symbol == expected
        })
    }

    fn description() -> &'static str {
        "Players alternate starting with X"
    }
}

/// Sequence numbers equal log positions.
pub struct SequenceOrderedInvariant;

impl Invariant<MoveLog<'_>> for SequenceOrderedInvariant {
    fn holds(log: &MoveLog<'_>) -> bool {
        log.moves.iter().enumerate().all(|(i, m)| m.sequence == i)
    }

    fn description() -> &'static str {
        "Move sequence numbers are 0, 1, 2, ..."
    }
}

/// All move-log invariants as a composable set.
pub type MoveLogInvariants = (
    HistoryConsistentInvariant,
    AlternatingTurnInvariant,
    SequenceOrderedInvariant,
);
