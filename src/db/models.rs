//! Database models.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;

use crate::db::schema;

/// Stored key-value row.
#[derive(Debug, Clone, Queryable, Selectable, Getters)]
#[diesel(table_name = schema::kv_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct KvEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}

impl KvEntry {
    /// Consumes the row, returning its value.
    pub fn into_value(self) -> String {
        self.value
    }
}

/// Insertable row for writing a key.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::kv_entries)]
pub struct NewKvEntry {
    key: String,
    value: String,
    updated_at: NaiveDateTime,
}
