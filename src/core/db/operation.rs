/// Deferred Operation Module
///
/// An `Operation` is one SQL statement waiting to run: the SQL, its
/// parameters and whether it reads or writes. Running it records the outcome
/// of that run on the operation.
use crate::core::db::parameters::Parameters;
use crate::core::db::query::{Readable, StatementType, Writable};
use crate::core::Result;
use crate::model::{Outcome, ResultSet};

#[derive(Debug, Clone)]
pub struct Operation {
    query: String,
    parameters: Parameters,
    is_query: bool,
    state: Outcome,
    last_result: Option<ResultSet>,
}

impl Operation {
    /// An operation whose read/write kind is inferred from the statement.
    pub fn new(sql: impl Into<String>, parameters: Parameters) -> Self {
        let sql = sql.into();
        let is_query = StatementType::from_sql(&sql).returns_rows();
        Self::build(sql, parameters, is_query)
    }

    /// An operation run through the read path.
    pub fn query(sql: impl Into<String>, parameters: Parameters) -> Self {
        Self::build(sql.into(), parameters, true)
    }

    /// An operation run through the write path.
    pub fn command(sql: impl Into<String>, parameters: Parameters) -> Self {
        Self::build(sql.into(), parameters, false)
    }

    fn build(query: String, parameters: Parameters, is_query: bool) -> Self {
        Operation {
            query,
            parameters,
            is_query,
            state: Outcome::Null,
            last_result: None,
        }
    }

    pub fn sql(&self) -> &str {
        &self.query
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.parameters
    }

    pub fn is_query(&self) -> bool {
        self.is_query
    }

    pub fn state(&self) -> Outcome {
        self.state
    }

    /// Result of the most recent run.
    pub fn last_result(&self) -> Option<&ResultSet> {
        self.last_result.as_ref()
    }

    /// Runs the statement against `source` and adopts the result's outcome.
    ///
    /// Every call executes again. The returned set is the caller's own copy;
    /// the operation keeps a separate one for `last_result`.
    ///
    /// # Errors
    ///
    /// Only connection-level faults are returned; the operation's state is
    /// left as it was in that case.
    pub fn execute<S>(&mut self, source: &S) -> Result<ResultSet>
    where
        S: Readable + Writable + ?Sized,
    {
        let parameters = Some(&self.parameters).filter(|p| !p.is_empty());
        let set = if self.is_query {
            source.execute_query(&self.query, parameters)?
        } else {
            source.execute_command(&self.query, parameters)?
        };
        self.state = set.outcome();
        self.last_result = Some(set.clone());
        Ok(set)
    }
}
