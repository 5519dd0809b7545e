/// Connection Management Module
///
/// `Connector` owns the single physical connection, runs statements through
/// the read/write pipelines, and tracks the connection's transaction state.
///
/// Faults are split by reach:
/// - a statement fault is logged and recorded as `Outcome::Error` on that
///   statement's `ResultSet`
/// - a connection fault (open, close, not open, timeout) is returned as `Err`
use crate::config::ConnectionFactory;
use crate::core::db::parameters::Parameters;
use crate::core::db::query::{self, Readable, Writable};
use crate::core::log::{ExecutionLog, TracingLog};
use crate::core::{DalError, Result, StatementFault};
use crate::model::{Outcome, ResultSet};
use crate::security;
use rusqlite::Connection;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Virtual machine instructions between deadline checks.
const PROGRESS_INTERVAL: i32 = 1_000;

/// Represents database transaction states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionState {
    /// No active transaction (autocommit mode)
    #[default]
    Autocommit,
    /// Transaction in progress
    Transaction,
    /// The last commit or rollback failed at the driver
    Failed,
}

#[derive(Debug, Clone, Copy)]
enum Pipeline {
    Read,
    Write,
}

/// Owner of the physical connection.
pub struct Connector {
    connection: Option<Connection>,
    target: String,
    transaction_state: TransactionState,
    statement_timeout: Option<Duration>,
    log: Arc<dyn ExecutionLog>,
}

impl std::fmt::Debug for Connector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connector")
            .field("target", &self.target)
            .field("open", &self.is_open())
            .field("transaction_state", &self.transaction_state)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

impl Connector {
    /// Opens a connection through `factory`, logging to `tracing`.
    ///
    /// # Errors
    ///
    /// Returns `DalError::Connection` if the connection cannot be opened or
    /// initialized.
    pub fn open<F: ConnectionFactory + ?Sized>(factory: &F) -> Result<Self> {
        Self::open_with_log(factory, Arc::new(TracingLog))
    }

    /// Opens a connection through `factory`, reporting to `log`.
    pub fn open_with_log<F: ConnectionFactory + ?Sized>(
        factory: &F,
        log: Arc<dyn ExecutionLog>,
    ) -> Result<Self> {
        let target = factory.describe();
        let connection = factory.connect().map_err(|e| {
            log.connection_fault(&e.to_string());
            e
        })?;
        Self::from_connection(connection, target, log)
    }

    /// Wraps an already-open connection.
    pub fn from_connection(
        connection: Connection,
        target: impl Into<String>,
        log: Arc<dyn ExecutionLog>,
    ) -> Result<Self> {
        let target = target.into();
        if let Err(e) = initialize(&connection) {
            let message = format!("unable to initialize '{}': {}", target, e);
            log.connection_fault(&message);
            return Err(DalError::Connection(message));
        }
        info!("Opened connection to {}", target);

        Ok(Connector {
            connection: Some(connection),
            target,
            transaction_state: TransactionState::Autocommit,
            statement_timeout: None,
            log,
        })
    }

    /// Sets the statement timeout used by every subsequent execution.
    pub fn with_statement_timeout(mut self, timeout: Duration) -> Self {
        self.statement_timeout = Some(timeout);
        self
    }

    pub fn set_statement_timeout(&mut self, timeout: Option<Duration>) {
        self.statement_timeout = timeout;
    }

    pub fn statement_timeout(&self) -> Option<Duration> {
        self.statement_timeout
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn log(&self) -> &dyn ExecutionLog {
        self.log.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// The live connection.
    ///
    /// # Errors
    ///
    /// Returns `DalError::Connection` once the connector has been closed.
    pub fn connection(&self) -> Result<&Connection> {
        self.connection.as_ref().ok_or_else(|| {
            let message = format!("connection to '{}' is not open", self.target);
            self.log.connection_fault(&message);
            DalError::Connection(message)
        })
    }

    /// Closes the connection. An open transaction is rolled back by the
    /// driver. Closing a closed connector is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `DalError::Close` if the driver refuses to close; the
    /// connection stays open in that case.
    pub fn close(&mut self) -> Result<()> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        match connection.close() {
            Ok(()) => {
                self.transaction_state = TransactionState::Autocommit;
                info!("Closed connection to {}", self.target);
                Ok(())
            }
            Err((connection, e)) => {
                self.connection = Some(connection);
                let message = format!("unable to close '{}': {}", self.target, e);
                self.log.connection_fault(&message);
                Err(DalError::Close(message))
            }
        }
    }

    /// Read path: runs `sql` and materializes its rows.
    pub fn get_data(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet> {
        self.execute(Pipeline::Read, sql, parameters)
    }

    /// Write path: runs `sql` as a non-query.
    pub fn set_data(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet> {
        self.execute(Pipeline::Write, sql, parameters)
    }

    fn execute(
        &self,
        pipeline: Pipeline,
        sql: &str,
        parameters: Option<&Parameters>,
    ) -> Result<ResultSet> {
        let mut set = ResultSet::for_query(sql);
        set.fail();

        let connection = self.connection()?;
        let deadline = self.statement_timeout.map(|timeout| Deadline::arm(connection, timeout));

        let result = match pipeline {
            Pipeline::Read => query::read_into(connection, sql, parameters, &mut set),
            Pipeline::Write => query::write_into(connection, sql, parameters, &mut set),
        };

        let expired = deadline.map(Deadline::disarm);
        if let Err(fault) = result {
            if let Some(elapsed) = expired.flatten().filter(|_| fault.is_interrupt()) {
                let message = format!("statement timed out after {} ms", elapsed.as_millis());
                self.log.connection_fault(&message);
                return Err(DalError::Timeout {
                    query: set.query().to_string(),
                    elapsed_ms: elapsed.as_millis(),
                });
            }
            self.record_fault(&mut set, &fault);
        }

        self.log.executed(set.query(), set.outcome(), set.rows_affected());
        Ok(set)
    }

    fn record_fault(&self, set: &mut ResultSet, fault: &StatementFault) {
        self.log.statement_fault(set.query(), &fault.to_string());
        set.error();
    }

    /// Gets the current transaction state
    pub fn transaction_state(&self) -> TransactionState {
        self.transaction_state
    }

    /// True when a transaction begun by this connector is still open at the
    /// driver.
    pub fn in_transaction(&self) -> bool {
        self.transaction_state == TransactionState::Transaction
            && self
                .connection
                .as_ref()
                .map(|c| !c.is_autocommit())
                .unwrap_or(false)
    }

    /// Begins a transaction.
    ///
    /// # Errors
    ///
    /// - `DalError::Connection` when the connector is closed
    /// - `DalError::Transaction` when a transaction is already live
    /// - `DalError::Database` when the driver refuses `BEGIN`
    pub fn begin_transaction(&mut self) -> Result<()> {
        if self.in_transaction() {
            return Err(DalError::Transaction(
                "Transaction already in progress".to_string(),
            ));
        }
        self.connection()?.execute_batch("BEGIN")?;
        self.transaction_state = TransactionState::Transaction;
        debug!("Began transaction on {}", self.target);
        Ok(())
    }

    /// Commits the live transaction.
    ///
    /// Returns `Outcome::Success` on commit, and `Outcome::Error` when there
    /// is no live transaction or the driver refuses the commit (the
    /// transaction is then rolled back).
    pub fn commit(&mut self) -> Outcome {
        self.finish("COMMIT", Outcome::Success)
    }

    /// Rolls back the live transaction.
    ///
    /// Returns `Outcome::Failure` once rolled back, and `Outcome::Error` when
    /// there is no live transaction or the rollback fails.
    pub fn rollback(&mut self) -> Outcome {
        self.finish("ROLLBACK", Outcome::Failure)
    }

    fn finish(&mut self, statement: &str, finished: Outcome) -> Outcome {
        if !self.in_transaction() {
            self.transaction_state = TransactionState::Autocommit;
            self.log
                .statement_fault(statement, "no active transaction");
            return Outcome::Error;
        }
        let Some(connection) = self.connection.as_ref() else {
            return Outcome::Error;
        };

        match connection.execute_batch(statement) {
            Ok(()) => {
                self.transaction_state = TransactionState::Autocommit;
                self.log.executed(statement, finished, 0);
                finished
            }
            Err(e) => {
                self.log.statement_fault(statement, &e.to_string());
                if !connection.is_autocommit() {
                    if let Err(e) = connection.execute_batch("ROLLBACK") {
                        self.log.statement_fault("ROLLBACK", &e.to_string());
                    }
                }
                self.transaction_state = if connection.is_autocommit() {
                    TransactionState::Failed
                } else {
                    TransactionState::Transaction
                };
                Outcome::Error
            }
        }
    }
}

impl Readable for Connector {
    fn execute_query(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet> {
        self.get_data(sql, parameters)
    }
}

impl Writable for Connector {
    fn execute_command(&self, sql: &str, parameters: Option<&Parameters>) -> Result<ResultSet> {
        self.set_data(sql, parameters)
    }
}

impl Drop for Connector {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!("Connector dropped without a clean close: {}", e);
        }
    }
}

/// Applies connection defaults and registers the password hash function.
fn initialize(connection: &Connection) -> rusqlite::Result<()> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    security::register_functions(connection)
}

/// Interrupts the running statement once the timeout passes.
struct Deadline<'c> {
    connection: &'c Connection,
    started: Instant,
    timeout: Duration,
}

impl<'c> Deadline<'c> {
    fn arm(connection: &'c Connection, timeout: Duration) -> Self {
        let started = Instant::now();
        let expires_at = started + timeout;
        connection.progress_handler(PROGRESS_INTERVAL, Some(move || Instant::now() >= expires_at));
        Deadline {
            connection,
            started,
            timeout,
        }
    }

    /// Removes the handler; returns the elapsed time if the deadline passed.
    fn disarm(self) -> Option<Duration> {
        self.connection.progress_handler(0, None::<fn() -> bool>);
        let elapsed = self.started.elapsed();
        (elapsed >= self.timeout).then_some(elapsed)
    }
}
