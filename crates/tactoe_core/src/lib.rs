//! Tactoe core - N×N tic-tac-toe rules, search and replay
//!
//! This crate holds everything that does not touch the outside world: the
//! board, outcome detection, the minimax search engine, the turn controller,
//! game records and replay. Persistence goes through the [`KeyValueStore`]
//! trait; the `tactoe` binary plugs in SQLite.
//!
//! # Architecture
//!
//! - **Board**: N×N grid (N ∈ {3, 4, 5}) with validated placement
//! - **Rules**: win/draw detection over the 2N+2 lines
//! - **Search**: depth-limited minimax with alpha-beta pruning
//! - **Controller**: turn order, computer moves, epoch-tagged deferred tasks
//! - **Record / Storage**: finished games and the versioned history blob
//! - **Replay**: step-by-step reconstruction of a recorded game
//!
//! # Example
//!
//! ```
//! use tactoe_core::{ControllerConfig, GameController, HistoryStore, InMemoryStore, Outcome, Symbol};
//!
//! let mut game = GameController::new(
//!     ControllerConfig::default(),
//!     HistoryStore::new(InMemoryStore::new()),
//! );
//! for (row, col) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
//!     game.apply_move(row, col).unwrap();
//! }
//! assert_eq!(game.outcome(), Outcome::Win(Symbol::First));
//! assert_eq!(game.history().load().unwrap().len(), 1);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod controller;
pub mod invariants;
mod record;
mod replay;
pub mod rules;
mod search;
mod storage;
mod types;

// Crate-level exports - Primitive types
pub use types::{GridSize, GridSizeError, Move, Symbol};

// Crate-level exports - Board and rules
pub use board::{Board, MoveError};
pub use rules::{Outcome, outcome};

// Crate-level exports - Search
pub use search::{DEFAULT_DEPTH_LIMIT, SearchResult, Searcher, best_move, reference_best_move};

// Crate-level exports - Controller
pub use controller::{
    ControllerConfig, DeferredTask, GameController, GameState, MoveReport, TaskKind, TaskOutcome,
};

// Crate-level exports - Records and storage
pub use record::{
    GameRecord, HISTORY_FORMAT_VERSION, HistoryError, HistorySummary, RecordError, StoredMove,
    StoredRecord, decode_history, encode_history,
};
pub use storage::{HISTORY_KEY, HistoryStore, InMemoryStore, KeyValueStore, StorageError};

// Crate-level exports - Replay
pub use replay::{Replay, ReplayError, ReplayStatus};
