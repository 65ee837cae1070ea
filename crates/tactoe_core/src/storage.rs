//! Key-value storage collaborator and the game-history store built on it.

use crate::record::{
    GameRecord, HistoryError, HistorySummary, StoredRecord, decode_history, encode_history,
};
use derive_more::{Display, Error};
use std::collections::BTreeMap;
use tracing::{debug, info, instrument, warn};

/// Well-known key holding the serialized history.
pub const HISTORY_KEY: &str = "gameHistory";

/// Storage error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Storage error: {} at {}:{}", message, file, line)]
pub struct StorageError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl StorageError {
    /// Creates a new storage error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<HistoryError> for StorageError {
    #[track_caller]
    fn from(err: HistoryError) -> Self {
        Self::new(err.to_string())
    }
}

/// Persisted text store.
pub trait KeyValueStore {
    /// Reads a value; `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value, replacing any previous one.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Deletes a key. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Deletes every key.
    fn clear(&mut self) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        (**self).clear()
    }
}

/// Process-local store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: BTreeMap<String, String>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        Ok(())
    }
}

/// Reads and appends finished games under [`HISTORY_KEY`].
#[derive(Debug, Clone)]
pub struct HistoryStore<S> {
    store: S,
}

impl<S: KeyValueStore> HistoryStore<S> {
    /// Wraps a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads every stored game. An absent key is an empty history.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the blob does not decode.
    #[instrument(skip(self))]
    pub fn load(&self) -> Result<Vec<StoredRecord>, StorageError> {
        match self.store.get(HISTORY_KEY)? {
            Some(blob) => Ok(decode_history(&blob)?),
            None => {
                debug!("No history stored");
                Ok(Vec::new())
            }
        }
    }

    /// Loads history, logging failures and falling back to an empty list.
    #[instrument(skip(self))]
    pub fn load_or_empty(&self) -> Vec<StoredRecord> {
        self.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load game history");
            Vec::new()
        })
    }

    /// Appends a finished game.
    ///
    /// Existing history that fails to decode is left untouched and the append
    /// is refused.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] on read, decode or write failure.
    #[instrument(skip(self, record), fields(result = %record.result(), moves = record.moves().len()))]
    pub fn append(&mut self, record: &GameRecord) -> Result<(), StorageError> {
        let mut games = self.load()?;
        games.push(record.to_stored());
        let blob = encode_history(&games)?;
        self.store.set(HISTORY_KEY, &blob)?;
        info!(total = games.len(), "Game record saved");
        Ok(())
    }

    /// Win/draw tally of the stored games.
    pub fn summary(&self) -> HistorySummary {
        HistorySummary::from_stored(&self.load_or_empty())
    }

    /// Removes the history key only.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self))]
    pub fn clear_history(&mut self) -> Result<(), StorageError> {
        self.store.remove(HISTORY_KEY)?;
        info!("Game history cleared");
        Ok(())
    }

    /// Clears the entire store.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails.
    #[instrument(skip(self))]
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        self.store.clear()?;
        info!("All stored data cleared");
        Ok(())
    }
}
