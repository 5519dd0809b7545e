//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use scholar_dal::config::ConnectionConfig;
use scholar_dal::core::RecordingLog;
use scholar_dal::security::{generate_salt, hash_password};
use scholar_dal::Connector;
use std::sync::Arc;

/// In-memory connector with a small registrar schema and sample data.
pub fn registrar() -> (Connector, Arc<RecordingLog>) {
    let log = Arc::new(RecordingLog::new());
    let connector = Connector::open_with_log(&ConnectionConfig::in_memory(), log.clone())
        .expect("in-memory database opens");
    connector
        .connection()
        .unwrap()
        .execute_batch(
            "
            CREATE TABLE students (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE enrollments (
                student_id INTEGER NOT NULL REFERENCES students (id),
                course TEXT NOT NULL,
                grade TEXT,
                PRIMARY KEY (student_id, course)
            );
            CREATE TABLE users (
                id INTEGER PRIMARY KEY,
                username TEXT NOT NULL UNIQUE,
                password_salt TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT
            );
            INSERT INTO students (id, name) VALUES (1, 'Ada'), (2, 'Grace'), (3, 'Alan');
            INSERT INTO enrollments VALUES (1, 'CS101', 'A'), (2, 'CS101', NULL);
            ",
        )
        .unwrap();
    add_user(&connector, "registrar", "ledger", Some("registrar"));
    (connector, log)
}

pub fn add_user(connector: &Connector, username: &str, password: &str, role: Option<&str>) {
    let salt = generate_salt();
    connector
        .connection()
        .unwrap()
        .execute(
            "INSERT INTO users (username, password_salt, password_hash, role)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![username, salt, hash_password(&salt, password), role],
        )
        .unwrap();
}
