// Core infrastructure modules
pub mod core;
pub mod model;

// Supporting modules
pub mod config;
pub mod printer;
pub mod security;

pub use crate::core::db::{
    AuthenticationTransaction, BatchTransaction, Connector, Operation, Parameters, Readable,
    TransactionHandler, TransactionStrategy, TransactionType, Writable,
};
pub use crate::core::{DalError, Result};
pub use crate::model::{Entry, Nullable, Outcome, ResultSet, Row};
