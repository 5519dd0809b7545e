/// Query Execution Module
///
/// This module turns SQL plus optional `Parameters` into the tabular model.
/// The read and write pipelines report statement faults as
/// `Err(StatementFault)` values; the connector decides what becomes of them.
use crate::core::db::parameters::Parameters;
use crate::core::{Result, StatementFault};
use crate::model::{Entry, Outcome, ResultSet, Row};
use rusqlite::{types::ValueRef, Connection, Statement};

/// Read capability: run a statement that returns rows.
pub trait Readable {
    /// Executes `sql` and materializes its rows.
    ///
    /// Statement-level problems are reported through the returned set's
    /// outcome. Only connection-level faults produce `Err`.
    fn execute_query(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet>;
}

/// Write capability: run a statement for its side effects.
pub trait Writable {
    /// Executes `sql` as a non-query and records the affected-row count.
    fn execute_command(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet>;
}

/// Prepares `sql`, binding every parameter by name when any are given.
fn prepare<'c>(
    conn: &'c Connection,
    sql: &str,
    parameters: Option<&Parameters>,
) -> std::result::Result<Statement<'c>, StatementFault> {
    let mut stmt = conn.prepare(sql).map_err(StatementFault::Prepare)?;
    if let Some(parameters) = parameters.filter(|p| !p.is_empty()) {
        bind_parameters(&mut stmt, parameters)?;
    }
    Ok(stmt)
}

fn bind_parameters(
    stmt: &mut Statement<'_>,
    parameters: &Parameters,
) -> std::result::Result<(), StatementFault> {
    for (name, value) in parameters.iter() {
        let bind_fault = |reason: String| StatementFault::Bind {
            name: name.to_string(),
            reason,
        };
        let index = stmt
            .parameter_index(name)
            .map_err(|e| bind_fault(e.to_string()))?
            .ok_or_else(|| bind_fault("statement has no such parameter".to_string()))?;
        stmt.raw_bind_parameter(index, value)
            .map_err(|e| bind_fault(e.to_string()))?;
    }
    Ok(())
}

/// Read pipeline: one `Row` per driver row, one `Entry` per column.
///
/// `rows_affected` becomes `0` once the query is running; the set passes only
/// if every row was read.
pub(crate) fn read_into(
    conn: &Connection,
    sql: &str,
    parameters: Option<&Parameters>,
    set: &mut ResultSet,
) -> std::result::Result<(), StatementFault> {
    let mut stmt = prepare(conn, sql, parameters)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    let mut rows = stmt.raw_query();
    set.set_rows_affected(0);
    while let Some(driver_row) = rows.next().map_err(StatementFault::Iterate)? {
        let mut row = Row::new();
        for (i, column) in columns.iter().enumerate() {
            let value = driver_row.get_ref(i).map_err(StatementFault::Iterate)?;
            let entry = Entry::with_value(column, format_value(value))
                .map_err(|e| StatementFault::Conversion(format!("column {}: {}", i, e)))?;
            // Duplicate column names keep their first occurrence.
            row.add_entry(entry);
        }
        set.add_item(row);
    }
    set.pass();
    Ok(())
}

/// Write pipeline: runs the statement as a non-query and derives the outcome
/// from the affected-row count.
pub(crate) fn write_into(
    conn: &Connection,
    sql: &str,
    parameters: Option<&Parameters>,
    set: &mut ResultSet,
) -> std::result::Result<(), StatementFault> {
    let mut stmt = prepare(conn, sql, parameters)?;
    let before = total_changes(conn)?;
    let affected = stmt.raw_execute().map_err(StatementFault::Execute)?;
    // The driver's count is stale when this statement changed nothing.
    let affected = if total_changes(conn)? == before {
        0
    } else {
        i64::try_from(affected).unwrap_or(i64::MAX)
    };
    set.set_rows_affected(affected);
    set.set_outcome(Outcome::from_rows_affected(affected));
    Ok(())
}

/// Rows changed by every INSERT, UPDATE and DELETE since the connection
/// opened.
fn total_changes(conn: &Connection) -> std::result::Result<i64, StatementFault> {
    conn.query_row("SELECT total_changes()", [], |row| row.get(0))
        .map_err(StatementFault::Execute)
}

/// Formats a SQLite value for the tabular model. NULL becomes the null
/// sentinel.
pub fn format_value(value: ValueRef) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).to_string(),
        ValueRef::Blob(b) => format!("<BLOB: {} bytes>", b.len()),
    }
}

/// Represents different SQL statement types for introspection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    /// BEGIN/COMMIT/ROLLBACK transaction commands
    Transaction,
    /// PRAGMA, EXPLAIN, WITH ... and anything unrecognized
    Other,
}

impl StatementType {
    /// Determines the statement type from a SQL string
    pub fn from_sql(sql: &str) -> Self {
        let sql_upper = sql.trim().to_uppercase();
        let keyword = sql_upper
            .split(|c: char| c.is_whitespace() || c == ';' || c == '(')
            .next()
            .unwrap_or("");

        match keyword {
            "SELECT" | "VALUES" => StatementType::Select,
            "INSERT" | "REPLACE" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "CREATE" => StatementType::Create,
            "DROP" => StatementType::Drop,
            "ALTER" => StatementType::Alter,
            "BEGIN" | "COMMIT" | "ROLLBACK" | "END" | "SAVEPOINT" | "RELEASE" => {
                StatementType::Transaction
            }
            "WITH" if sql_upper.contains("SELECT") && !contains_dml(&sql_upper) => {
                StatementType::Select
            }
            "PRAGMA" | "EXPLAIN" if !sql_upper.contains('=') => StatementType::Select,
            _ => StatementType::Other,
        }
    }

    /// True for statements that produce rows.
    pub fn returns_rows(self) -> bool {
        self == StatementType::Select
    }
}

fn contains_dml(sql_upper: &str) -> bool {
    sql_upper
        .split(|c: char| !c.is_ascii_alphanumeric() && c != '_')
        .any(|word| matches!(word, "INSERT" | "UPDATE" | "DELETE" | "REPLACE"))
}
