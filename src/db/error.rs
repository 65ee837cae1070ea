//! Errors raised by the SQLite history store.

use derive_more::{Display, Error};
use tactoe_core::StorageError;
use tracing::instrument;

/// Store operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbOperation {
    /// Opening the database file.
    #[display("connect")]
    Connect,
    /// Applying embedded migrations.
    #[display("migrate")]
    Migrate,
    /// Reading or writing `kv_entries`.
    #[display("query")]
    Query,
}

/// History store failure, tagged with the operation and the call site.
#[derive(Debug, Clone, Display, Error)]
#[display("History store {} failed: {} at {}:{}", operation, message, file, line)]
pub struct DbError {
    /// Operation that failed.
    pub operation: DbOperation,
    /// What went wrong.
    pub message: String,
    /// Line of the call site.
    pub line: u32,
    /// File of the call site.
    pub file: &'static str,
}

impl DbError {
    /// Records a failure at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(operation: DbOperation, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            operation,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        Self::new(DbOperation::Query, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::new(DbOperation::Connect, err.to_string())
    }
}

/// Keeps the call site recorded in the [`DbError`].
impl From<DbError> for StorageError {
    fn from(err: DbError) -> Self {
        StorageError {
            message: format!("{} failed: {}", err.operation, err.message),
            line: err.line,
            file: err.file,
        }
    }
}
