/// Execution Log Module
///
/// The connector reports every data-access fault, and every concluded
/// execution, to an injected `ExecutionLog` rather than to a global logger.
/// `TracingLog` forwards to `tracing`; `RecordingLog` keeps events in memory.
use crate::model::Outcome;
use std::sync::Mutex;
use tracing::{debug, error, warn};

/// Sink for data-access events.
pub trait ExecutionLog: Send + Sync {
    /// A statement faulted; the fault was folded into its outcome.
    fn statement_fault(&self, query: &str, message: &str);

    /// The connection could not be opened, closed or used.
    fn connection_fault(&self, message: &str);

    /// A statement concluded.
    fn executed(&self, query: &str, outcome: Outcome, rows_affected: i64);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl ExecutionLog for TracingLog {
    fn statement_fault(&self, query: &str, message: &str) {
        warn!(query, "Statement fault: {}", message);
    }

    fn connection_fault(&self, message: &str) {
        error!("Connection fault: {}", message);
    }

    fn executed(&self, query: &str, outcome: Outcome, rows_affected: i64) {
        debug!(query, %outcome, rows_affected, "Statement executed");
    }
}

/// An event captured by `RecordingLog`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEvent {
    StatementFault { query: String, message: String },
    ConnectionFault { message: String },
    Executed { query: String, outcome: Outcome, rows_affected: i64 },
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingLog {
    events: Mutex<Vec<LogEvent>>,
}

impl RecordingLog {
    pub fn new() -> Self {
        RecordingLog::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn fault_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| !matches!(e, LogEvent::Executed { .. }))
            .count()
    }

    fn push(&self, event: LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ExecutionLog for RecordingLog {
    fn statement_fault(&self, query: &str, message: &str) {
        self.push(LogEvent::StatementFault {
            query: query.to_string(),
            message: message.to_string(),
        });
    }

    fn connection_fault(&self, message: &str) {
        self.push(LogEvent::ConnectionFault {
            message: message.to_string(),
        });
    }

    fn executed(&self, query: &str, outcome: Outcome, rows_affected: i64) {
        self.push(LogEvent::Executed {
            query: query.to_string(),
            outcome,
            rows_affected,
        });
    }
}
