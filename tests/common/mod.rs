//! Shared test infrastructure for model layer tests.
//!
//! Provides a tempfile-backed SQLite database with the full schema, plus
//! helpers to seed the accounts and roster entries most tests need.

#![allow(dead_code)]

use rusqlite::{Connection, params};
use tempfile::TempDir;

use carelink::auth::session::UserType;
use carelink::db::MIGRATIONS;
use carelink::models::user::{self, NewUser};

/// Setup a test database with schema applied.
///
/// Returns a tuple of (TempDir, Connection) where TempDir must be kept
/// alive for the Connection to remain valid.
pub fn setup_test_db() -> (TempDir, Connection) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("test.db");
    let conn = Connection::open(&db_path).expect("Failed to open test DB");

    conn.execute_batch("PRAGMA foreign_keys=ON; PRAGMA journal_mode=WAL;")
        .expect("Failed to set pragmas");

    conn.execute_batch(MIGRATIONS)
        .expect("Failed to run migrations");

    (dir, conn)
}

/// Create a patient account. Password is stored as an opaque string;
/// only the auth tests exercise real argon2 hashes.
pub fn seed_patient(conn: &Connection, username: &str) -> i64 {
    let new = NewUser {
        username: username.to_string(),
        password: "not-a-real-hash".to_string(),
        display_name: format!("{username} display"),
        user_type: UserType::Patient,
        full_name: format!("{username} full name"),
        gender: "female".to_string(),
        age: 34,
    };
    user::create(conn, &new).expect("Failed to seed patient")
}

/// Insert a roster entry directly.
pub fn seed_provider(
    conn: &Connection,
    name: &str,
    specialization: &str,
    rating: f64,
    distance: &str,
    fee: i64,
) -> i64 {
    conn.execute(
        "INSERT INTO providers (name, specialization, rating, review_count, address, distance, consultation_fee, years_experience) \
         VALUES (?1, ?2, ?3, 10, '1 Test St, Springfield', ?4, ?5, 5)",
        params![name, specialization, rating, distance, fee],
    )
    .expect("Failed to seed provider");
    conn.last_insert_rowid()
}
