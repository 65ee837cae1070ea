//! Async driver for a single game.
//!
//! [`GameSession`] shares a [`GameController`] behind a mutex and turns the
//! controller's deferred tasks into delayed tokio tasks. A task that fires
//! after a reset carries an old epoch and is dropped by the controller.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tactoe_core::{
    Board, DeferredTask, GameController, GridSize, KeyValueStore, Move, MoveError, MoveReport,
    Outcome, Symbol, TaskKind, TaskOutcome,
};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::config::GameConfig;

/// Messages sent from the session to the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A move was applied.
    MoveMade {
        /// The move.
        mv: Move,
        /// Outcome after the move.
        outcome: Outcome,
        /// Whether the computer played it.
        by_computer: bool,
    },
    /// A new game started.
    GameReset {
        /// Epoch of the new game.
        epoch: u64,
    },
}

/// Delays applied to deferred tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDelays {
    /// Pause before the computer replies.
    pub computer_move: Duration,
    /// Pause between a finished game and the next one.
    pub reset: Duration,
}

impl SessionDelays {
    /// Delays taken from a configuration.
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            computer_move: config.computer_move_delay(),
            reset: config.reset_delay(),
        }
    }

    fn for_task(&self, task: DeferredTask) -> Duration {
        match task.kind {
            TaskKind::ComputerMove => self.computer_move,
            TaskKind::Reset => self.reset,
        }
    }
}

impl Default for SessionDelays {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

/// Point-in-time copy of the game for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// Current board.
    pub board: Board,
    /// Current outcome.
    pub outcome: Outcome,
    /// Symbol to move, if the game is running.
    pub turn: Option<Symbol>,
    /// Controller epoch.
    pub epoch: u64,
    /// Moves played this game.
    pub moves: usize,
    /// Whether the computer opponent is on.
    pub assist: bool,
}

struct Shared<S> {
    controller: Mutex<GameController<S>>,
    delays: SessionDelays,
    events: Option<mpsc::UnboundedSender<SessionEvent>>,
}

impl<S> Shared<S> {
    fn lock(&self) -> MutexGuard<'_, GameController<S>> {
        self.controller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            debug!("Event receiver dropped");
        }
    }
}

/// A game whose deferred work runs on the tokio runtime.
///
/// Methods that may schedule work must be called from within a runtime.
pub struct GameSession<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for GameSession<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: KeyValueStore + Send + 'static> GameSession<S> {
    /// Wraps a controller.
    #[instrument(skip(controller))]
    pub fn new(controller: GameController<S>, delays: SessionDelays) -> Self {
        Self::build(controller, delays, None)
    }

    /// Wraps a controller and reports changes on `events`.
    #[instrument(skip(controller, events))]
    pub fn with_events(
        controller: GameController<S>,
        delays: SessionDelays,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self::build(controller, delays, Some(events))
    }

    fn build(
        controller: GameController<S>,
        delays: SessionDelays,
        events: Option<mpsc::UnboundedSender<SessionEvent>>,
    ) -> Self {
        info!(
            size = %controller.board().size(),
            assist = controller.config().assist(),
            "Creating game session"
        );
        Self {
            shared: Arc::new(Shared {
                controller: Mutex::new(controller),
                delays,
                events,
            }),
        }
    }

    /// Starts the first game, scheduling the computer if it opens.
    #[instrument(skip(self))]
    pub fn start(&self) {
        self.reset();
    }

    /// Applies a human move and schedules whatever follows it.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError`] if the move is rejected.
    #[instrument(skip(self))]
    pub fn submit_move(&self, row: usize, col: usize) -> Result<MoveReport, MoveError> {
        let report = {
            let mut controller = self.shared.lock();
            let report = controller.apply_move(row, col)?;
            self.shared.emit(SessionEvent::MoveMade {
                mv: report.mv,
                outcome: report.outcome,
                by_computer: false,
            });
            report
        };
        self.schedule(report.follow_up);
        Ok(report)
    }

    /// Starts a new game; pending tasks become stale.
    #[instrument(skip(self))]
    pub fn reset(&self) {
        let follow_up = {
            let mut controller = self.shared.lock();
            let follow_up = controller.reset();
            self.shared.emit(SessionEvent::GameReset {
                epoch: controller.epoch(),
            });
            follow_up
        };
        self.schedule(follow_up);
    }

    /// Changes the board size and starts a new game.
    #[instrument(skip(self))]
    pub fn set_grid_size(&self, grid_size: GridSize) {
        let follow_up = {
            let mut controller = self.shared.lock();
            let follow_up = controller.set_grid_size(grid_size);
            self.shared.emit(SessionEvent::GameReset {
                epoch: controller.epoch(),
            });
            follow_up
        };
        self.schedule(follow_up);
    }

    /// Changes how far ahead the computer searches.
    #[instrument(skip(self))]
    pub fn set_depth_limit(&self, depth_limit: u8) {
        self.shared.lock().set_depth_limit(depth_limit);
    }

    /// Turns the computer opponent on or off.
    #[instrument(skip(self))]
    pub fn set_assist_mode(&self, enabled: bool) {
        let follow_up = self.shared.lock().set_assist_mode(enabled);
        self.schedule(follow_up);
    }

    /// Copies the current state.
    pub fn snapshot(&self) -> SessionSnapshot {
        let controller = self.shared.lock();
        SessionSnapshot {
            board: controller.board().clone(),
            outcome: controller.outcome(),
            turn: controller.current_turn(),
            epoch: controller.epoch(),
            moves: controller.moves().len(),
            assist: *controller.config().assist(),
        }
    }

    /// Runs `f` with exclusive access to the controller.
    ///
    /// Tasks returned by controller commands inside `f` are not scheduled.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut GameController<S>) -> R) -> R {
        f(&mut self.shared.lock())
    }

    fn schedule(&self, task: Option<DeferredTask>) {
        if let Some(task) = task {
            spawn_deferred(Arc::clone(&self.shared), task);
        }
    }
}

/// Sleeps for the task's delay, then hands it to the controller.
fn spawn_deferred<S: KeyValueStore + Send + 'static>(
    shared: Arc<Shared<S>>,
    task: DeferredTask,
) {
    let delay = shared.delays.for_task(task);
    debug!(?task, ?delay, "Scheduling deferred task");

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;

        // Events are sent under the lock so they arrive in the order applied.
        let follow_up = {
            let mut controller = shared.lock();
            match controller.apply_deferred(task) {
                TaskOutcome::Moved(report) => {
                    shared.emit(SessionEvent::MoveMade {
                        mv: report.mv,
                        outcome: report.outcome,
                        by_computer: true,
                    });
                    report.follow_up
                }
                TaskOutcome::Reset { follow_up } => {
                    shared.emit(SessionEvent::GameReset {
                        epoch: controller.epoch(),
                    });
                    follow_up
                }
                TaskOutcome::Stale | TaskOutcome::Skipped => None,
            }
        };

        if let Some(next) = follow_up {
            spawn_deferred(shared, next);
        }
    });
}
