/// Database Module
///
/// This module provides the query-execution and transaction layer, organized
/// into focused submodules:
///
/// - **Parameters** (`parameters.rs`): validated `@name` statement parameters
/// - **Query Execution** (`query.rs`): read/write pipelines and the
///   `Readable`/`Writable` capabilities
/// - **Connection Management** (`connection.rs`): the `Connector`, which owns
///   the physical connection and its transaction state
/// - **Operations** (`operation.rs`): deferred single-statement units of work
/// - **Transactions** (`transaction.rs`, `auth.rs`): handlers that run
///   strategies inside one physical transaction
///
/// ## Error Handling
///
/// Statement faults end up in the `ResultSet` outcome; only connection-level
/// faults and caller contract violations surface as `DalError`.
pub mod auth;
pub mod connection;
pub mod operation;
pub mod parameters;
pub mod query;
pub mod transaction;

pub use auth::{authenticate, AuthenticationTransaction};
pub use connection::{Connector, TransactionState};
pub use operation::Operation;
pub use parameters::Parameters;
pub use query::{Readable, StatementType, Writable};
pub use transaction::{BatchTransaction, TransactionHandler, TransactionStrategy, TransactionType};
