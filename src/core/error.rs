/// Data-Access Error Module
///
/// This module defines the error types raised by the data-access layer.
/// Only faults that make the connection unusable, or that violate a caller
/// contract, are raised through `DalError`. Faults attributable to a single
/// statement are folded into that statement's `ResultSet` outcome instead
/// (see `StatementFault`).
use thiserror::Error;

/// Error type raised by the data-access layer.
///
/// This enum covers:
/// - Connection-level faults (open, close, timeout)
/// - Caller contract violations (validation, index bounds)
/// - Configuration loading
/// - Driver errors that escape at connection level
#[derive(Error, Debug)]
pub enum DalError {
    /// The physical connection could not be opened or is not open
    #[error("Connection error: {0}")]
    Connection(String),

    /// The physical connection could not be closed
    #[error("Close error: {0}")]
    Close(String),

    /// A statement ran past the connector's statement timeout
    #[error("Timeout after {elapsed_ms} ms executing: {query}")]
    Timeout { query: String, elapsed_ms: u128 },

    /// Transaction misuse such as beginning one while another is live
    #[error("Transaction error: {0}")]
    Transaction(String),

    /// Empty or invalid field names, invalid parameter keys
    #[error("Validation error: {0}")]
    Validation(String),

    /// Index-based access outside the available range
    #[error("Index {index} out of range (length {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Configuration loading and parsing errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver errors surfacing at connection level
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result to use DalError as the error type.
pub type Result<T> = std::result::Result<T, DalError>;

/// A fault attributable to one statement's execution.
///
/// These never cross the connector boundary: the connector logs them and
/// records `Outcome::Error` on the statement's `ResultSet`.
#[derive(Error, Debug)]
pub enum StatementFault {
    #[error("failed to prepare statement: {0}")]
    Prepare(rusqlite::Error),

    #[error("failed to bind parameter {name}: {reason}")]
    Bind { name: String, reason: String },

    #[error("statement execution failed: {0}")]
    Execute(rusqlite::Error),

    #[error("result iteration failed: {0}")]
    Iterate(rusqlite::Error),

    #[error("value conversion failed: {0}")]
    Conversion(String),
}

impl StatementFault {
    /// Returns the underlying driver error, if any.
    pub fn driver_error(&self) -> Option<&rusqlite::Error> {
        match self {
            StatementFault::Prepare(e)
            | StatementFault::Execute(e)
            | StatementFault::Iterate(e) => Some(e),
            StatementFault::Bind { .. } | StatementFault::Conversion(_) => None,
        }
    }

    /// True when the driver reported the statement as interrupted.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self.driver_error(),
            Some(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::OperationInterrupted
        )
    }
}
