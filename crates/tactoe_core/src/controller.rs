//! Turn orchestration, computer moves and game-record finalization.
//!
//! The controller is synchronous. Anything that should happen "later" (the
//! computer's reply, the automatic reset after a finished game) is returned
//! to the caller as a [`DeferredTask`] tagged with the current epoch. The
//! caller decides when to run it via [`GameController::apply_deferred`]; a
//! task whose epoch no longer matches is discarded, so a reset always wins
//! over work scheduled before it.

use crate::board::{Board, MoveError};
use crate::invariants::{InvariantSet, MoveLog, MoveLogInvariants};
use crate::record::GameRecord;
use crate::rules::{Outcome, outcome};
use crate::search::{DEFAULT_DEPTH_LIMIT, Searcher};
use crate::storage::{HistoryStore, KeyValueStore};
use crate::types::{GridSize, Move, Symbol};
use derive_getters::Getters;
use tracing::{debug, info, instrument, warn};

/// Settings for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters)]
pub struct ControllerConfig {
    grid_size: GridSize,
    depth_limit: u8,
    assist: bool,
    computer: Symbol,
    auto_reset: bool,
}

impl ControllerConfig {
    /// Creates a configuration with assist mode off.
    pub fn new(grid_size: GridSize) -> Self {
        Self {
            grid_size,
            ..Self::default()
        }
    }

    /// Sets the search depth limit.
    pub fn with_depth_limit(mut self, depth_limit: u8) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Enables or disables the computer opponent.
    pub fn with_assist(mut self, assist: bool) -> Self {
        self.assist = assist;
        self
    }

    /// Chooses which symbol the computer plays.
    pub fn with_computer(mut self, computer: Symbol) -> Self {
        self.computer = computer;
        self
    }

    /// Enables or disables the reset task emitted when a game ends.
    pub fn with_auto_reset(mut self, auto_reset: bool) -> Self {
        self.auto_reset = auto_reset;
        self
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            grid_size: GridSize::CLASSIC,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            assist: false,
            computer: Symbol::Second,
            auto_reset: true,
        }
    }
}

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    /// Waiting for the given symbol to move.
    AwaitingMove(Symbol),
    /// The game is over; only a reset leaves this state.
    Terminal(Outcome),
}

/// Work to run after a delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Let the computer play its turn.
    ComputerMove,
    /// Start a new game after a finished one.
    Reset,
}

/// A deferred task bound to the epoch it was scheduled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeferredTask {
    /// What to do.
    pub kind: TaskKind,
    /// Controller epoch at schedule time.
    pub epoch: u64,
}

/// Result of an applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReport {
    /// The move as logged.
    pub mv: Move,
    /// Outcome after the move.
    pub outcome: Outcome,
    /// Task the caller should schedule next, if any.
    pub follow_up: Option<DeferredTask>,
}

/// What [`GameController::apply_deferred`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// The computer moved.
    Moved(MoveReport),
    /// A new game started.
    Reset {
        /// Task the caller should schedule next, if any.
        follow_up: Option<DeferredTask>,
    },
    /// The task belonged to an earlier epoch and was dropped.
    Stale,
    /// The task no longer applies (e.g. turn changed hands).
    Skipped,
}

/// Owns the live board, move log and turn order.
#[derive(Debug)]
pub struct GameController<S> {
    config: ControllerConfig,
    board: Board,
    moves: Vec<Move>,
    state: GameState,
    epoch: u64,
    searcher: Searcher,
    history: HistoryStore<S>,
    last_record: Option<GameRecord>,
}

impl<S: KeyValueStore> GameController<S> {
    /// Creates a controller with a fresh game.
    ///
    /// If the computer plays `First`, call [`GameController::reset`] (or
    /// [`GameController::set_assist_mode`]) to obtain its opening task.
    #[instrument(skip(history))]
    pub fn new(config: ControllerConfig, history: HistoryStore<S>) -> Self {
        info!("Creating GameController");
        Self {
            board: Board::new(config.grid_size),
            moves: Vec::new(),
            state: GameState::AwaitingMove(Symbol::First),
            epoch: 0,
            searcher: Searcher::new(config.depth_limit),
            config,
            history,
            last_record: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current outcome.
    pub fn outcome(&self) -> Outcome {
        match self.state {
            GameState::AwaitingMove(_) => Outcome::InProgress,
            GameState::Terminal(outcome) => outcome,
        }
    }

    /// Symbol to move, or `None` once the game is over.
    pub fn current_turn(&self) -> Option<Symbol> {
        match self.state {
            GameState::AwaitingMove(symbol) => Some(symbol),
            GameState::Terminal(_) => None,
        }
    }

    /// Current state.
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Moves of the current game.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Generation counter, bumped on every reset.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Active configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Record of the most recently finished game.
    pub fn last_record(&self) -> Option<&GameRecord> {
        self.last_record.as_ref()
    }

    /// History store receiving finished games.
    pub fn history(&self) -> &HistoryStore<S> {
        &self.history
    }

    /// Returns true if assist mode is on and it is the computer's turn.
    pub fn is_computer_turn(&self) -> bool {
        self.config.assist && self.current_turn() == Some(self.config.computer)
    }

    // ── Commands ─────────────────────────────────────────────

    /// Starts a new game unconditionally and invalidates pending tasks.
    ///
    /// Returns the computer's opening task if it plays first.
    #[instrument(skip(self), fields(epoch = self.epoch))]
    pub fn reset(&mut self) -> Option<DeferredTask> {
        self.epoch += 1;
        self.board = Board::new(self.config.grid_size);
        self.moves.clear();
        self.state = GameState::AwaitingMove(Symbol::First);
        info!(epoch = self.epoch, size = %self.config.grid_size, "New game started");
        self.computer_task()
    }

    /// Changes the board size and starts a new game.
    #[instrument(skip(self))]
    pub fn set_grid_size(&mut self, grid_size: GridSize) -> Option<DeferredTask> {
        self.config.grid_size = grid_size;
        self.reset()
    }

    /// Changes the search depth limit for subsequent computer moves.
    #[instrument(skip(self))]
    pub fn set_depth_limit(&mut self, depth_limit: u8) {
        self.config.depth_limit = depth_limit;
        self.searcher = Searcher::new(depth_limit);
    }

    /// Turns the computer opponent on or off.
    ///
    /// Returns a computer-move task if it is now the computer's turn.
    #[instrument(skip(self))]
    pub fn set_assist_mode(&mut self, enabled: bool) -> Option<DeferredTask> {
        self.config.assist = enabled;
        info!(enabled, "Assist mode changed");
        self.computer_task()
    }

    /// Applies a move for the side to move.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the game is over or the cell is occupied or
    /// outside the grid. State is unchanged on error.
    #[instrument(skip(self), fields(epoch = self.epoch))]
    pub fn apply_move(&mut self, row: usize, col: usize) -> Result<MoveReport, MoveError> {
        let GameState::AwaitingMove(symbol) = self.state else {
            debug!("Move rejected: game already over");
            return Err(MoveError::GameAlreadyTerminal);
        };

        self.board.apply_move(row, col, symbol)?;
        let mv = Move::new(symbol, row, col, self.moves.len());
        self.moves.push(mv);
        debug!(%mv, "Move applied");

        debug_assert!(
            MoveLogInvariants::check_all(&MoveLog {
                board: &self.board,
                moves: &self.moves,
            })
            .is_ok(),
            "move log invariants violated"
        );

        let outcome = outcome(&self.board);
        let follow_up = if outcome.is_terminal() {
            self.state = GameState::Terminal(outcome);
            self.finalize(outcome);
            self.config.auto_reset.then_some(DeferredTask {
                kind: TaskKind::Reset,
                epoch: self.epoch,
            })
        } else {
            self.state = GameState::AwaitingMove(symbol.opponent());
            self.computer_task()
        };

        Ok(MoveReport {
            mv,
            outcome,
            follow_up,
        })
    }

    /// Searches for the side to move and plays the chosen cell.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::GameAlreadyTerminal`] if the game is over.
    #[instrument(skip(self), fields(epoch = self.epoch, depth_limit = self.config.depth_limit))]
    pub fn play_computer_move(&mut self) -> Result<MoveReport, MoveError> {
        let GameState::AwaitingMove(symbol) = self.state else {
            return Err(MoveError::GameAlreadyTerminal);
        };

        let choice = self
            .searcher
            .best_move(&mut self.board, symbol, symbol.opponent())
            .ok_or(MoveError::GameAlreadyTerminal)?;
        debug!(
            row = choice.row,
            col = choice.col,
            score = choice.score,
            nodes = self.searcher.nodes(),
            "Computer chose move"
        );

        self.apply_move(choice.row, choice.col)
    }

    /// Runs a task produced earlier by this controller.
    ///
    /// Tasks from an earlier epoch are dropped. A computer-move task is also
    /// dropped if the turn no longer belongs to the computer.
    #[instrument(skip(self), fields(current_epoch = self.epoch))]
    pub fn apply_deferred(&mut self, task: DeferredTask) -> TaskOutcome {
        if task.epoch != self.epoch {
            warn!(task_epoch = task.epoch, "Discarding stale deferred task");
            return TaskOutcome::Stale;
        }

        match task.kind {
            TaskKind::ComputerMove if self.is_computer_turn() => {
                match self.play_computer_move() {
                    Ok(report) => TaskOutcome::Moved(report),
                    Err(e) => {
                        warn!(error = %e, "Computer move failed");
                        TaskOutcome::Skipped
                    }
                }
            }
            TaskKind::ComputerMove => {
                debug!("Computer move no longer applies");
                TaskOutcome::Skipped
            }
            TaskKind::Reset => TaskOutcome::Reset {
                follow_up: self.reset(),
            },
        }
    }

    fn computer_task(&self) -> Option<DeferredTask> {
        self.is_computer_turn().then_some(DeferredTask {
            kind: TaskKind::ComputerMove,
            epoch: self.epoch,
        })
    }

    /// Builds the record for the finished game and persists it.
    ///
    /// Storage failures are logged; play continues regardless.
    fn finalize(&mut self, outcome: Outcome) {
        let record = GameRecord::new(self.config.grid_size, outcome, self.moves.clone());
        info!(result = %outcome, moves = self.moves.len(), "Game finished");

        if let Err(e) = self.history.append(&record) {
            warn!(error = %e, "Failed to save game history");
        }
        self.last_record = Some(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn controller(config: ControllerConfig) -> GameController<InMemoryStore> {
        GameController::new(config, HistoryStore::new(InMemoryStore::new()))
    }

    #[test]
    fn test_turns_alternate() {
        let mut game = controller(ControllerConfig::default());
        assert_eq!(game.current_turn(), Some(Symbol::First));
        game.apply_move(0, 0).unwrap();
        assert_eq!(game.current_turn(), Some(Symbol::Second));
        assert_eq!(game.moves()[0].sequence, 0);
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut game = controller(ControllerConfig::default());
        game.apply_move(1, 1).unwrap();
        let board = game.board().clone();
        assert_eq!(game.apply_move(1, 1), Err(MoveError::OccupiedCell(1, 1)));
        assert_eq!(game.board(), &board);
        assert_eq!(game.moves().len(), 1);
        assert_eq!(game.current_turn(), Some(Symbol::Second));
    }

    #[test]
    fn test_computer_reply_is_deferred_task() {
        let mut game = controller(ControllerConfig::default().with_assist(true));
        let report = game.apply_move(0, 0).unwrap();
        let task = report.follow_up.expect("computer should be scheduled");
        assert_eq!(task.kind, TaskKind::ComputerMove);

        let TaskOutcome::Moved(reply) = game.apply_deferred(task) else {
            panic!("computer should have moved");
        };
        assert_eq!(reply.mv.symbol, Symbol::Second);
        assert_eq!(game.current_turn(), Some(Symbol::First));
    }

    #[test]
    fn test_stale_task_discarded_after_reset() {
        let mut game = controller(ControllerConfig::default().with_assist(true));
        let task = game.apply_move(0, 0).unwrap().follow_up.unwrap();
        game.reset();
        assert_eq!(game.apply_deferred(task), TaskOutcome::Stale);
        assert_eq!(game.board().occupied(), 0);
    }

    #[test]
    fn test_computer_opens_when_it_plays_first() {
        let mut game = controller(
            ControllerConfig::default()
                .with_assist(true)
                .with_computer(Symbol::First),
        );
        let task = game.reset().expect("computer opens");
        assert!(matches!(game.apply_deferred(task), TaskOutcome::Moved(_)));
        assert_eq!(game.current_turn(), Some(Symbol::Second));
    }

    #[test]
    fn test_set_depth_limit_keeps_game() {
        let mut game = controller(ControllerConfig::default());
        game.apply_move(1, 1).unwrap();
        game.set_depth_limit(9);
        assert_eq!(*game.config().depth_limit(), 9);
        assert_eq!(game.searcher.depth_limit(), 9);
        assert_eq!(game.moves().len(), 1);

        let reply = game.play_computer_move().unwrap();
        assert_eq!(reply.mv.symbol, Symbol::Second);
        assert!([(0, 0), (0, 2), (2, 0), (2, 2)].contains(&(reply.mv.row, reply.mv.col)));
    }

    #[test]
    fn test_without_auto_reset_game_stays_finished() {
        let mut game = controller(ControllerConfig::default().with_auto_reset(false));
        let mut last = None;
        for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            last = Some(game.apply_move(row, col).unwrap());
        }
        let report = last.unwrap();
        assert_eq!(report.outcome, Outcome::Win(Symbol::First));
        assert_eq!(report.follow_up, None);
        assert_eq!(game.state(), GameState::Terminal(Outcome::Win(Symbol::First)));
    }

    #[test]
    fn test_set_grid_size_resets() {
        let mut game = controller(ControllerConfig::default());
        game.apply_move(0, 0).unwrap();
        let epoch = game.epoch();
        game.set_grid_size(GridSize::new(5).unwrap());
        assert_eq!(game.board().n(), 5);
        assert!(game.moves().is_empty());
        assert_eq!(game.epoch(), epoch + 1);
    }
}
