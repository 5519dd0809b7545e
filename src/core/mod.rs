/// Core Module
///
/// Shared infrastructure for the data-access layer: the database layer,
/// error types and the injected execution log.

pub mod db;
pub mod error;
pub mod log;

// Re-export commonly used types for convenience
pub use error::{DalError, Result, StatementFault};
pub use log::{ExecutionLog, RecordingLog, TracingLog};
