//! Finished-game records and the persisted history format.
//!
//! History is stored as JSON under a single key. The current layout is a
//! versioned envelope:
//!
//! ```json
//! { "version": 1,
//!   "games": [ { "result": "X wins!", "gridSize": 3,
//!                "moves": [ { "player": "X", "row": 0, "col": 0 } ] } ] }
//! ```
//!
//! A bare array of games (the unversioned layout) is still accepted on read.

use crate::rules::Outcome;
use crate::types::{GridSize, Move, Symbol};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::{debug, instrument, warn};

/// Current history format version.
pub const HISTORY_FORMAT_VERSION: u32 = 1;

/// Immutable account of one completed game.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct GameRecord {
    grid_size: GridSize,
    result: Outcome,
    moves: Vec<Move>,
}

impl GameRecord {
    /// Finalizes a record.
    ///
    /// Move sequence numbers are expected to equal their index in `moves`.
    pub fn new(grid_size: GridSize, result: Outcome, moves: Vec<Move>) -> Self {
        debug_assert!(moves.len() <= grid_size.cells());
        debug_assert!(moves.iter().enumerate().all(|(i, m)| m.sequence == i));
        Self {
            grid_size,
            result,
            moves,
        }
    }

    /// Display text of the result, e.g. `"X wins!"`.
    pub fn result_text(&self) -> String {
        self.result.to_string()
    }

    /// Converts to the persisted shape.
    pub fn to_stored(&self) -> StoredRecord {
        StoredRecord {
            result: Some(self.result_text()),
            grid_size: Some(u8::from(self.grid_size)),
            moves: Some(
                self.moves
                    .iter()
                    .map(|m| StoredMove {
                        player: Some(m.symbol),
                        row: i64::try_from(m.row).ok(),
                        col: i64::try_from(m.col).ok(),
                    })
                    .collect(),
            ),
        }
    }
}

/// A record that could not be turned into a [`GameRecord`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum RecordError {
    /// A required field is absent.
    #[display("Record is missing '{}'", _0)]
    MissingField(&'static str),
    /// The stored grid size is not 3, 4 or 5.
    #[display("Record has unsupported grid size {}", _0)]
    BadGridSize(u8),
    /// The result text is not one this program writes.
    #[display("Record has unknown result '{}'", _0)]
    UnknownResult(String),
    /// A move is incomplete or has a negative coordinate.
    #[display("Record move {} is malformed", _0)]
    BadMove(usize),
    /// More moves than cells.
    #[display("Record has {} moves for {} cells", _0, _1)]
    TooManyMoves(usize, usize),
}

impl std::error::Error for RecordError {}

/// Persisted move: `{ player, row, col }`.
///
/// Every field is optional so that damaged entries still decode and can be
/// reported individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMove {
    /// Symbol that moved.
    #[serde(default)]
    pub player: Option<Symbol>,
    /// Row index.
    #[serde(default)]
    pub row: Option<i64>,
    /// Column index.
    #[serde(default)]
    pub col: Option<i64>,
}

/// Persisted game: `{ result, gridSize, moves }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredRecord {
    /// Result display text.
    #[serde(default)]
    pub result: Option<String>,
    /// Board side length.
    #[serde(default)]
    pub grid_size: Option<u8>,
    /// Moves in play order.
    #[serde(default)]
    pub moves: Option<Vec<StoredMove>>,
}

impl StoredRecord {
    /// Validates the stored shape.
    ///
    /// Coordinates are checked for presence and sign only; whether they fit
    /// the grid is checked when the move is replayed.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] describing the first problem found.
    #[instrument(skip(self))]
    pub fn to_record(&self) -> Result<GameRecord, RecordError> {
        let raw_size = self.grid_size.ok_or(RecordError::MissingField("gridSize"))?;
        let grid_size = GridSize::new(raw_size).map_err(|_| RecordError::BadGridSize(raw_size))?;

        let text = self
            .result
            .as_deref()
            .ok_or(RecordError::MissingField("result"))?;
        // Records are only written for finished games.
        let result = Outcome::from_result_text(text)
            .filter(|o| o.is_terminal())
            .ok_or_else(|| RecordError::UnknownResult(text.to_string()))?;

        let stored = self.moves.as_ref().ok_or(RecordError::MissingField("moves"))?;
        if stored.len() > grid_size.cells() {
            return Err(RecordError::TooManyMoves(stored.len(), grid_size.cells()));
        }

        let moves = stored
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let coord = |v: Option<i64>| v.and_then(|v| usize::try_from(v).ok());
                match (m.player, coord(m.row), coord(m.col)) {
                    (Some(symbol), Some(row), Some(col)) => Ok(Move::new(symbol, row, col, i)),
                    _ => Err(RecordError::BadMove(i)),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GameRecord::new(grid_size, result, moves))
    }
}

impl From<&GameRecord> for StoredRecord {
    fn from(record: &GameRecord) -> Self {
        record.to_stored()
    }
}

/// Error decoding or encoding the history blob.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum HistoryError {
    /// The blob is not valid history JSON.
    #[display("History is not valid JSON: {}", _0)]
    Decode(String),
    /// The blob was written by a newer format.
    #[display("History format version {} is not supported", _0)]
    UnsupportedVersion(u32),
    /// Serialization failed.
    #[display("History could not be encoded: {}", _0)]
    Encode(String),
}

impl std::error::Error for HistoryError {}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryEnvelope {
    version: u32,
    games: Vec<StoredRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedHistory {
    Versioned(HistoryEnvelope),
    Legacy(Vec<StoredRecord>),
}

/// Decodes a history blob. Empty input is an empty history.
///
/// # Errors
///
/// Returns [`HistoryError`] if the blob is malformed or from a newer version.
#[instrument(skip(blob), fields(len = blob.len()))]
pub fn decode_history(blob: &str) -> Result<Vec<StoredRecord>, HistoryError> {
    if blob.trim().is_empty() {
        return Ok(Vec::new());
    }
    let parsed: PersistedHistory =
        serde_json::from_str(blob).map_err(|e| HistoryError::Decode(e.to_string()))?;
    match parsed {
        PersistedHistory::Versioned(env) if env.version > HISTORY_FORMAT_VERSION => {
            Err(HistoryError::UnsupportedVersion(env.version))
        }
        PersistedHistory::Versioned(env) => {
            debug!(version = env.version, games = env.games.len(), "History decoded");
            Ok(env.games)
        }
        PersistedHistory::Legacy(games) => {
            debug!(games = games.len(), "Unversioned history decoded");
            Ok(games)
        }
    }
}

/// Encodes a history blob in the current format.
///
/// # Errors
///
/// Returns [`HistoryError::Encode`] if serialization fails.
#[instrument(skip(games), fields(games = games.len()))]
pub fn encode_history(games: &[StoredRecord]) -> Result<String, HistoryError> {
    let envelope = HistoryEnvelope {
        version: HISTORY_FORMAT_VERSION,
        games: games.to_vec(),
    };
    serde_json::to_string(&envelope).map_err(|e| HistoryError::Encode(e.to_string()))
}

/// Win/draw tally over a history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Getters)]
pub struct HistorySummary {
    total: usize,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    unreadable: usize,
}

impl HistorySummary {
    /// Tallies stored games; entries that fail validation count as unreadable.
    #[instrument(skip(games), fields(games = games.len()))]
    pub fn from_stored(games: &[StoredRecord]) -> Self {
        let mut summary = Self {
            total: games.len(),
            ..Self::default()
        };
        for (i, game) in games.iter().enumerate() {
            match game.to_record() {
                Ok(record) => summary.count(*record.result()),
                Err(e) => {
                    warn!(index = i, error = %e, "Skipping unreadable history entry");
                    summary.unreadable += 1;
                }
            }
        }
        summary
    }

    /// Wins for the given symbol.
    pub fn wins(&self, symbol: Symbol) -> usize {
        match symbol {
            Symbol::First => self.first_wins,
            Symbol::Second => self.second_wins,
        }
    }

    fn count(&mut self, result: Outcome) {
        match result {
            Outcome::Win(Symbol::First) => self.first_wins += 1,
            Outcome::Win(Symbol::Second) => self.second_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => {}
        }
    }
}

impl std::fmt::Display for HistorySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} games:", self.total)?;
        for symbol in Symbol::iter() {
            write!(f, " {} wins {},", symbol, self.wins(symbol))?;
        }
        write!(f, " draws {}", self.draws)
    }
}
