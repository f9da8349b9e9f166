//! Integration tests for sweeper-store
//!
//! These tests run expiry deletes against real SQLite databases.

use std::time::Duration;
use sweeper_domain::traits::{Database, ExecResult};
use sweeper_domain::SqlValue;
use sweeper_store::{ExpiryPolicy, SqliteDatabase, StoreError};

const NOW: i64 = 1_700_000_000;

fn seed_reservations(db: &SqliteDatabase, expired: usize, fresh: usize) {
    db.with_connection(|conn| {
        conn.execute_batch(
            "CREATE TABLE reservation (id INTEGER PRIMARY KEY, expiry INTEGER NOT NULL);",
        )?;
        for i in 0..expired {
            conn.execute(
                "INSERT INTO reservation (expiry) VALUES (?1)",
                [NOW - 7200 - i as i64],
            )?;
        }
        for i in 0..fresh {
            conn.execute(
                "INSERT INTO reservation (expiry) VALUES (?1)",
                [NOW + i as i64],
            )?;
        }
        Ok(())
    })
    .unwrap();
}

fn count_rows(db: &SqliteDatabase) -> i64 {
    db.with_connection(|conn| conn.query_row("SELECT COUNT(*) FROM reservation", [], |row| row.get(0)))
        .unwrap()
}

fn run(db: &SqliteDatabase, policy: &ExpiryPolicy) -> u64 {
    let stmt = policy.statement_at(NOW);
    db.exec(&stmt.sql, &stmt.params)
        .unwrap()
        .rows_affected()
        .unwrap()
}

#[test]
fn test_expiry_deletes_in_bounded_batches() {
    let db = SqliteDatabase::in_memory().unwrap();
    seed_reservations(&db, 25, 5);

    let policy = ExpiryPolicy::new("reservation", "expiry", 10, Duration::from_secs(3600)).unwrap();

    assert_eq!(run(&db, &policy), 10);
    assert_eq!(run(&db, &policy), 10);
    assert_eq!(run(&db, &policy), 5);
    assert_eq!(run(&db, &policy), 0);

    assert_eq!(count_rows(&db), 5, "fresh rows must survive");
}

#[test]
fn test_retention_window_keeps_recent_rows() {
    let db = SqliteDatabase::in_memory().unwrap();
    seed_reservations(&db, 3, 0);

    // Rows expired two hours ago are inside a three hour retention window.
    let policy = ExpiryPolicy::new("reservation", "expiry", 100, Duration::from_secs(3 * 3600)).unwrap();
    assert_eq!(run(&db, &policy), 0);
    assert_eq!(count_rows(&db), 3);
}

#[test]
fn test_missing_table_is_an_exec_error() {
    let db = SqliteDatabase::in_memory().unwrap();
    let policy = ExpiryPolicy::new("reservation", "expiry", 10, Duration::ZERO).unwrap();
    let stmt = policy.statement_at(NOW);

    let result = db.exec(&stmt.sql, &stmt.params);
    assert!(matches!(result, Err(StoreError::Database(_))));
}

#[test]
fn test_parameter_binding() {
    let db = SqliteDatabase::in_memory().unwrap();
    db.with_connection(|conn| {
        conn.execute_batch(
            "CREATE TABLE blobs (k TEXT, v BLOB, w REAL, n INTEGER);
             INSERT INTO blobs VALUES ('a', x'0102', 0.5, NULL);
             INSERT INTO blobs VALUES ('b', x'03', 1.5, 1);",
        )
    })
    .unwrap();

    let params = [
        SqlValue::from("a"),
        SqlValue::Blob(vec![1, 2]),
        SqlValue::Real(0.5),
    ];
    let result = db
        .exec("DELETE FROM blobs WHERE k = ?1 AND v = ?2 AND w = ?3 AND n IS NULL", &params)
        .unwrap();
    assert_eq!(result.rows_affected().unwrap(), 1);
}

#[test]
fn test_file_database_persists_deletes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sweep.db");

    {
        let db = SqliteDatabase::open(&path).unwrap();
        seed_reservations(&db, 4, 1);
        let policy = ExpiryPolicy::new("reservation", "expiry", 3, Duration::ZERO).unwrap();
        assert_eq!(run(&db, &policy), 3);
    }

    let reopened = SqliteDatabase::open(&path).unwrap();
    assert_eq!(count_rows(&reopened), 2);
}
