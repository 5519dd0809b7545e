/// Transaction Handling Module
///
/// A `TransactionHandler` runs a `TransactionStrategy` inside one physical
/// transaction on a `Connector` and tracks a transaction-wide status:
///
/// - `Null` until `execute_transaction` runs the strategy
/// - the strategy result's outcome after it ran
/// - `Success` after `commit`, `Failure` after `rollback`, `Error` when
///   either finds no live transaction
///
/// A handler dropped with its transaction still open rolls it back.
use crate::core::db::connection::Connector;
use crate::core::db::operation::Operation;
use crate::core::Result;
use crate::model::{Outcome, ResultSet};
use std::fmt;
use tracing::{debug, warn};

/// Tag identifying what a transaction does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TransactionType {
    Authentication,
    Batch,
    Custom(String),
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Authentication => f.write_str("authentication"),
            TransactionType::Batch => f.write_str("batch"),
            TransactionType::Custom(name) => f.write_str(name),
        }
    }
}

/// The work a handler runs inside its transaction.
pub trait TransactionStrategy {
    fn transaction_type(&self) -> TransactionType;

    /// Runs the statements, in order, and returns the aggregate result.
    ///
    /// Statement faults belong in the returned set's outcome; `Err` is for
    /// connection-level faults only.
    fn execute(&mut self, connector: &Connector) -> Result<ResultSet>;
}

pub struct TransactionHandler<'c, S: TransactionStrategy> {
    connector: &'c mut Connector,
    strategy: S,
    transaction_id: TransactionType,
    status: Outcome,
    cached_result: Option<ResultSet>,
    live: bool,
    committed: bool,
}

impl<'c, S: TransactionStrategy> TransactionHandler<'c, S> {
    pub fn new(connector: &'c mut Connector, strategy: S) -> Self {
        let transaction_id = strategy.transaction_type();
        TransactionHandler {
            connector,
            strategy,
            transaction_id,
            status: Outcome::Null,
            cached_result: None,
            live: false,
            committed: false,
        }
    }

    pub fn transaction_id(&self) -> &TransactionType {
        &self.transaction_id
    }

    pub fn status(&self) -> Outcome {
        self.status
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    /// Read-only view of the cached result.
    pub fn result(&self) -> Option<&ResultSet> {
        self.cached_result.as_ref()
    }

    /// True once `commit` has succeeded.
    pub fn is_committed(&self) -> bool {
        self.committed
    }

    /// True while this handler's transaction is open.
    pub fn is_live(&self) -> bool {
        self.live && self.connector.in_transaction()
    }

    /// Begins the transaction, runs the strategy once and caches its result.
    ///
    /// Later calls return the cached result without running anything.
    ///
    /// # Errors
    ///
    /// Connection-level faults from `BEGIN` or the strategy. A transaction
    /// begun here is rolled back before the error is returned.
    pub fn execute_transaction(&mut self) -> Result<ResultSet> {
        if let Some(cached) = &self.cached_result {
            return Ok(cached.clone());
        }

        self.connector.begin_transaction()?;
        self.live = true;
        debug!("Executing {} transaction", self.transaction_id);

        let result = match self.strategy.execute(self.connector) {
            Ok(result) => result,
            Err(e) => {
                self.connector.rollback();
                self.live = false;
                self.status = Outcome::Error;
                return Err(e);
            }
        };

        self.status = result.outcome();
        self.cached_result = Some(result.clone().into_read_only());
        Ok(result)
    }

    /// Commits. `Success` on commit, `Error` without a live transaction.
    pub fn commit(&mut self) -> Outcome {
        self.finish(true)
    }

    /// Rolls back. `Failure` once rolled back, `Error` without a live
    /// transaction.
    pub fn rollback(&mut self) -> Outcome {
        self.finish(false)
    }

    /// Commits when the strategy succeeded, rolls back otherwise.
    pub fn complete(&mut self) -> Outcome {
        if self.status.is_success() {
            self.commit()
        } else {
            self.rollback()
        }
    }

    fn finish(&mut self, commit: bool) -> Outcome {
        self.status = if !self.is_live() {
            self.connector
                .log()
                .statement_fault(&self.transaction_id.to_string(), "no active transaction");
            Outcome::Error
        } else if commit {
            let outcome = self.connector.commit();
            self.committed = outcome.is_success();
            outcome
        } else {
            self.connector.rollback()
        };
        self.live = false;
        self.status
    }
}

impl<S: TransactionStrategy> Drop for TransactionHandler<'_, S> {
    fn drop(&mut self) {
        if self.is_live() {
            warn!("{} transaction dropped while open; rolling back", self.transaction_id);
            self.connector.rollback();
        }
    }
}

/// Runs operations in order, stopping at the first one that does not
/// succeed.
///
/// The aggregate result is the last executed operation's set; its outcome is
/// `Success` only when every operation succeeded.
#[derive(Debug, Clone, Default)]
pub struct BatchTransaction {
    operations: Vec<Operation>,
}

impl BatchTransaction {
    pub fn new(operations: Vec<Operation>) -> Self {
        BatchTransaction { operations }
    }

    pub fn push(&mut self, operation: Operation) {
        self.operations.push(operation);
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }
}

impl TransactionStrategy for BatchTransaction {
    fn transaction_type(&self) -> TransactionType {
        TransactionType::Batch
    }

    fn execute(&mut self, connector: &Connector) -> Result<ResultSet> {
        let mut last = ResultSet::new();
        last.pass();
        for operation in &mut self.operations {
            last = operation.execute(connector)?;
            if !operation.state().is_success() {
                debug!("Batch stopped at '{}' ({})", operation.sql(), operation.state());
                break;
            }
        }
        Ok(last)
    }
}
