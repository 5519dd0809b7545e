use assert_cmd::Command;
use rusqlite::Connection;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn records() -> (TempDir, String) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE students (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
         INSERT INTO students (id, name) VALUES (1, 'Ada'), (2, 'Grace');",
    )
    .unwrap();
    (dir, path.to_string_lossy().into_owned())
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

#[test]
fn test_select_prints_table_and_exits_zero() {
    let (_dir, db) = records();
    let assert = Command::cargo_bin("scholar-dal")
        .unwrap()
        .args([db.as_str(), "SELECT id, name FROM students ORDER BY id"])
        .assert()
        .success();

    let out = stdout_of(&assert);
    assert!(out.contains("| ID | NAME  |"));
    assert!(out.contains("| 2  | Grace |"));
    assert!(out.contains("SUCCESS | rows: 2 | affected: 0"));
}

#[test]
fn test_write_without_match_exits_one() {
    let (_dir, db) = records();
    let assert = Command::cargo_bin("scholar-dal")
        .unwrap()
        .args([db.as_str(), "UPDATE students SET name = 'Alan' WHERE id = 42"])
        .assert()
        .code(1);

    assert!(stdout_of(&assert).contains("FAILURE | rows: 0 | affected: 0"));
}

#[test]
fn test_write_persists() {
    let (_dir, db) = records();
    Command::cargo_bin("scholar-dal")
        .unwrap()
        .args([db.as_str(), "INSERT INTO students (id, name) VALUES (3, 'Alan')"])
        .assert()
        .success();

    let count: i64 = Connection::open(&db)
        .unwrap()
        .query_row("SELECT count(*) FROM students", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 3);
}

#[test]
fn test_statement_error_exits_one() {
    let (_dir, db) = records();
    let assert = Command::cargo_bin("scholar-dal")
        .unwrap()
        .args([db.as_str(), "SELECT * FROM missing_table"])
        .assert()
        .code(1);

    assert!(stdout_of(&assert).contains("ERROR"));
}

#[test]
fn test_csv_format_from_config_file() {
    let (_dir, db) = records();
    let mut config = NamedTempFile::new().unwrap();
    writeln!(
        config,
        "statement_timeout_ms = 5000\n\n[connection]\ndatabase = {:?}\n",
        db
    )
    .unwrap();

    let assert = Command::cargo_bin("scholar-dal")
        .unwrap()
        .args([
            "--config",
            config.path().to_str().unwrap(),
            "--format",
            "csv",
            "SELECT name FROM students ORDER BY id",
        ])
        .assert()
        .success();

    assert!(stdout_of(&assert).starts_with("NAME\nAda\nGrace\n"));
}

#[test]
fn test_bad_usage_exits_two() {
    Command::cargo_bin("scholar-dal").unwrap().assert().code(2);
    Command::cargo_bin("scholar-dal")
        .unwrap()
        .args(["a.db", "SELECT 1", "extra"])
        .assert()
        .code(2);
}
