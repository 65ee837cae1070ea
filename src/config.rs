//! Application configuration loaded from TOML.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tactoe_core::{ControllerConfig, DEFAULT_DEPTH_LIMIT, GridSize, Symbol};
use tracing::{debug, info, instrument};

/// Settings for a game session.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Board side length.
    grid_size: GridSize,

    /// Plies the computer searches below its candidate move.
    depth_limit: u8,

    /// Whether the computer plays `computer_symbol`.
    assist_mode: bool,

    /// Symbol played by the computer.
    computer_symbol: Symbol,

    /// Pause before the computer replies.
    computer_move_delay_ms: u64,

    /// Pause between a finished game and the next one.
    reset_delay_ms: u64,

    /// Whether a finished game is replaced by a new one after `reset_delay_ms`.
    auto_reset: bool,

    /// SQLite file holding the game history, or `:memory:`.
    history_db: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: GridSize::CLASSIC,
            depth_limit: DEFAULT_DEPTH_LIMIT,
            assist_mode: false,
            computer_symbol: Symbol::Second,
            computer_move_delay_ms: 500,
            reset_delay_ms: 2000,
            auto_reset: true,
            history_db: "tactoe.db".to_string(),
        }
    }
}

impl GameConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or holds
    /// an unsupported grid size.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_toml(&content)?;
        info!(grid_size = %config.grid_size, assist = config.assist_mode, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given, otherwise returns defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a given file cannot be loaded.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or an unsupported grid size.
    #[instrument(skip(content))]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))
    }

    /// Overrides the grid size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `n` is not 3, 4 or 5.
    pub fn with_grid_size(mut self, n: u8) -> Result<Self, ConfigError> {
        self.grid_size = GridSize::new(n).map_err(|e| ConfigError::new(e.to_string()))?;
        Ok(self)
    }

    /// Overrides the search depth limit.
    pub fn with_depth_limit(mut self, depth_limit: u8) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    /// Overrides assist mode.
    pub fn with_assist_mode(mut self, assist_mode: bool) -> Self {
        self.assist_mode = assist_mode;
        self
    }

    /// Overrides the history database path.
    pub fn with_history_db(mut self, history_db: impl Into<String>) -> Self {
        self.history_db = history_db.into();
        self
    }

    /// Controller settings derived from this configuration.
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig::new(self.grid_size)
            .with_depth_limit(self.depth_limit)
            .with_assist(self.assist_mode)
            .with_computer(self.computer_symbol)
            .with_auto_reset(self.auto_reset)
    }

    /// Delay before the computer replies.
    pub fn computer_move_delay(&self) -> Duration {
        Duration::from_millis(self.computer_move_delay_ms)
    }

    /// Delay before a finished game is reset.
    pub fn reset_delay(&self) -> Duration {
        Duration::from_millis(self.reset_delay_ms)
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
