//! Tests for the SQLite key-value store.

use tempfile::NamedTempFile;

use tactoe::{DbOperation, SqliteStore};
use tactoe_core::{
    GameRecord, GridSize, HISTORY_KEY, HistoryStore, KeyValueStore, Move, Outcome, Symbol,
};

/// Creates a temporary database file with schema applied, returns the file
/// handle (must stay in scope to keep the file alive) and a ready store.
fn setup_test_db() -> (NamedTempFile, SqliteStore) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();
    let store = SqliteStore::open(&db_path).expect("Failed to open store");
    (db_file, store)
}

fn win_record() -> GameRecord {
    let moves = [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)]
        .iter()
        .enumerate()
        .map(|(i, &(r, c))| {
            let symbol = if i % 2 == 0 { Symbol::First } else { Symbol::Second };
            Move::new(symbol, r, c, i)
        })
        .collect();
    GameRecord::new(GridSize::CLASSIC, Outcome::Win(Symbol::First), moves)
}

#[test]
fn test_get_missing_key() {
    let (_db, store) = setup_test_db();
    assert_eq!(store.get("nothing").expect("Get failed"), None);
}

#[test]
fn test_set_then_get() {
    let (_db, mut store) = setup_test_db();
    store.set("theme", "dark").expect("Set failed");
    assert_eq!(store.get("theme").expect("Get failed").as_deref(), Some("dark"));
}

#[test]
fn test_set_overwrites() {
    let (_db, mut store) = setup_test_db();
    store.set("theme", "dark").expect("Set failed");
    store.set("theme", "light").expect("Set failed");
    assert_eq!(store.get("theme").expect("Get failed").as_deref(), Some("light"));
    assert_eq!(store.keys().expect("Keys failed"), vec!["theme".to_string()]);
}

#[test]
fn test_remove_and_clear() {
    let (_db, mut store) = setup_test_db();
    store.set("a", "1").expect("Set failed");
    store.set("b", "2").expect("Set failed");

    store.remove("a").expect("Remove failed");
    store.remove("a").expect("Removing absent key should succeed");
    assert_eq!(store.keys().expect("Keys failed"), vec!["b".to_string()]);

    store.clear().expect("Clear failed");
    assert!(store.keys().expect("Keys failed").is_empty());
}

#[test]
fn test_reopen_keeps_data_and_skips_applied_migrations() {
    let (db, mut store) = setup_test_db();
    store.set("k", "v").expect("Set failed");

    let reopened = SqliteStore::open(db.path().to_str().expect("Invalid path"))
        .expect("Reopen failed");
    assert_eq!(reopened.get("k").expect("Get failed").as_deref(), Some("v"));
}

#[test]
fn test_history_round_trip_through_sqlite() {
    let (_db, store) = setup_test_db();
    let mut history = HistoryStore::new(store);

    history.append(&win_record()).expect("Append failed");
    history.append(&win_record()).expect("Append failed");

    let games = history.load().expect("Load failed");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].to_record().expect("Invalid record"), win_record());
    assert_eq!(history.summary().wins(Symbol::First), 2);

    let raw = history
        .store()
        .get(HISTORY_KEY)
        .expect("Get failed")
        .expect("History missing");
    assert!(raw.starts_with(r#"{"version":1"#));
}

#[test]
fn test_entry_tracks_update_time() {
    let (_db, mut store) = setup_test_db();
    store.set("k", "v1").expect("Set failed");
    let first = store.entry("k").expect("Query failed").expect("Missing");
    store.set("k", "v2").expect("Set failed");
    let second = store.entry("k").expect("Query failed").expect("Missing");

    assert_eq!(second.value(), "v2");
    assert!(second.updated_at() >= first.updated_at());
}

#[test]
fn test_store_reports_its_path() {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path");
    let store = SqliteStore::open(db_path).expect("Failed to open store");
    assert_eq!(store.db_path(), db_path);
}

#[test]
fn test_unopenable_path_is_connect_error() {
    let err = SqliteStore::open("/definitely/not/a/dir/history.db").unwrap_err();
    assert_eq!(err.operation, DbOperation::Connect);
    assert!(err.to_string().starts_with("History store connect failed"));
}
