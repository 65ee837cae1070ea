//! SQLite-backed [`KeyValueStore`].

use chrono::Utc;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tactoe_core::{KeyValueStore, StorageError};
use tracing::{debug, info, instrument};

use crate::db::{DbError, DbOperation, KvEntry, NewKvEntry, schema::kv_entries};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Key-value store persisted in a SQLite file.
///
/// Each call opens its own connection, so the store is cheap to clone and
/// holds no handle between calls. `":memory:"` is therefore not useful here;
/// use [`tactoe_core::InMemoryStore`] instead.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path`, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the file cannot be opened or migrations fail.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, DbError> {
        let store = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = store.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| DbError::new(DbOperation::Migrate, e.to_string()))?;
        info!(path = %store.db_path, migrations = applied.len(), "SqliteStore opened");
        Ok(store)
    }

    /// Path of the database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::new(DbOperation::Connect, format!("'{}': {}", self.db_path, e))
        })
    }

    /// Loads a full row, including its last update time.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entry(&self, key: &str) -> Result<Option<KvEntry>, DbError> {
        let mut conn = self.connection()?;
        let entry = kv_entries::table
            .filter(kv_entries::key.eq(key))
            .select(KvEntry::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = entry.is_some(), "Entry lookup");
        Ok(entry)
    }

    /// Lists stored keys in order.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn keys(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.connection()?;
        let keys = kv_entries::table
            .select(kv_entries::key)
            .order(kv_entries::key.asc())
            .load::<String>(&mut conn)?;
        Ok(keys)
    }

    #[instrument(skip(self, value), fields(len = value.len()))]
    fn upsert(&self, key: &str, value: &str) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let entry = NewKvEntry::new(key.to_string(), value.to_string(), Utc::now().naive_utc());

        diesel::insert_into(kv_entries::table)
            .values(&entry)
            .on_conflict(kv_entries::key)
            .do_update()
            .set((
                kv_entries::value.eq(entry.value().as_str()),
                kv_entries::updated_at.eq(*entry.updated_at()),
            ))
            .execute(&mut conn)?;

        debug!("Entry written");
        Ok(())
    }

    #[instrument(skip(self))]
    fn delete(&self, key: Option<&str>) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = match key {
            Some(key) => {
                diesel::delete(kv_entries::table.filter(kv_entries::key.eq(key)))
                    .execute(&mut conn)?
            }
            None => diesel::delete(kv_entries::table).execute(&mut conn)?,
        };
        debug!(removed, "Entries deleted");
        Ok(removed)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entry(key)?.map(KvEntry::into_value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Ok(self.upsert(key, value)?)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.delete(Some(key))?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.delete(None)?;
        Ok(())
    }
}
