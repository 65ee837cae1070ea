//! SQLite persistence for the key-value storage collaborator.

mod error;
mod models;
mod schema; // Diesel generated schema - internal use only
mod store;

pub use error::{DbError, DbOperation};
pub use models::{KvEntry, NewKvEntry};
pub use store::{MIGRATIONS, SqliteStore};
