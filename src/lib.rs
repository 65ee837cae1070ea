//! Tactoe - N×N tic-tac-toe against a minimax opponent
//!
//! This library wires the pure game logic in [`tactoe_core`] to the outside
//! world.
//!
//! # Architecture
//!
//! - **Config**: TOML settings with CLI overrides
//! - **Db**: SQLite key-value store for the game history
//! - **Session**: tokio driver for delayed computer moves and auto-reset
//!
//! # Example
//!
//! ```no_run
//! use tactoe::{GameConfig, GameSession, SessionDelays, SqliteStore};
//! use tactoe_core::{GameController, HistoryStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = GameConfig::default().with_assist_mode(true);
//! let store = SqliteStore::open(config.history_db())?;
//! let controller = GameController::new(config.controller_config(), HistoryStore::new(store));
//! let session = GameSession::new(controller, SessionDelays::from_config(&config));
//! session.start();
//! session.submit_move(1, 1)?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, GameConfig};

// Crate-level exports - Database
pub use db::{DbError, DbOperation, KvEntry, MIGRATIONS, NewKvEntry, SqliteStore};

// Crate-level exports - Session management
pub use session::{GameSession, SessionDelays, SessionEvent, SessionSnapshot};
