use crate::core::{DalError, Result};
use crate::model::outcome::Outcome;
use crate::model::row::Row;
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[\r\n]+\s*").expect("line break pattern is valid"));

/// Rows produced by one statement execution, plus its metadata.
///
/// - `rows_affected`: `-1` when nothing was executed, otherwise the count
///   reported for the statement (reads report `0`)
/// - `query`: the statement text on a single line
/// - `outcome`: `Null` until the execution attempt concludes
///
/// A read-only set ignores every mutation. Mutators return quietly instead of
/// raising so cached sets can be handed out safely; callers wanting a mutable
/// copy clone it, since a clone is always writable.
#[derive(Debug, PartialEq, Eq)]
pub struct ResultSet {
    rows: Vec<Row>,
    rows_affected: i64,
    query: String,
    read_only: bool,
    outcome: Outcome,
}

impl Default for ResultSet {
    fn default() -> Self {
        ResultSet {
            rows: Vec::new(),
            rows_affected: -1,
            query: String::new(),
            read_only: false,
            outcome: Outcome::Null,
        }
    }
}

impl Clone for ResultSet {
    fn clone(&self) -> Self {
        ResultSet {
            rows: self.rows.clone(),
            rows_affected: self.rows_affected,
            query: self.query.clone(),
            read_only: false,
            outcome: self.outcome,
        }
    }
}

impl ResultSet {
    pub fn new() -> Self {
        ResultSet::default()
    }

    /// Creates an empty set tagged with `sql`.
    pub fn for_query(sql: &str) -> Self {
        let mut set = ResultSet::new();
        set.set_query(sql);
        set
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    pub fn rows_affected(&self) -> i64 {
        self.rows_affected
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_pass(&self) -> bool {
        self.outcome == Outcome::Success
    }

    pub fn is_fail(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    pub fn is_error(&self) -> bool {
        self.outcome == Outcome::Error
    }

    /// Marks the set (un)modifiable. This is the one setter that is never
    /// guarded.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Returns the set frozen as read-only.
    pub fn into_read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn add_item(&mut self, row: Row) {
        if self.read_only {
            return;
        }
        self.rows.push(row);
    }

    pub fn add_items<I: IntoIterator<Item = Row>>(&mut self, rows: I) {
        if self.read_only {
            return;
        }
        self.rows.extend(rows);
    }

    /// Inserts `row` at `index`; indexes past the end append.
    pub fn insert_item(&mut self, index: usize, row: Row) {
        if self.read_only {
            return;
        }
        let index = index.min(self.rows.len());
        self.rows.insert(index, row);
    }

    /// Removes the row at `index`. Read-only sets and bad indexes yield `None`.
    pub fn remove_item(&mut self, index: usize) -> Option<Row> {
        if self.read_only || index >= self.rows.len() {
            return None;
        }
        Some(self.rows.remove(index))
    }

    pub fn clear(&mut self) {
        if self.read_only {
            return;
        }
        self.rows.clear();
    }

    /// Stores the affected-row count; anything below `-1` is stored as `-1`.
    pub fn set_rows_affected(&mut self, rows_affected: i64) {
        if self.read_only {
            return;
        }
        self.rows_affected = rows_affected.max(-1);
    }

    /// Stores `sql` with line breaks collapsed to single spaces and outer
    /// whitespace trimmed.
    pub fn set_query(&mut self, sql: &str) {
        if self.read_only {
            return;
        }
        self.query = LINE_BREAKS.replace_all(sql.trim(), " ").into_owned();
    }

    pub fn error(&mut self) {
        self.set_outcome(Outcome::Error);
    }

    pub fn fail(&mut self) {
        self.set_outcome(Outcome::Failure);
    }

    pub fn pass(&mut self) {
        self.set_outcome(Outcome::Success);
    }

    pub(crate) fn set_outcome(&mut self, outcome: Outcome) {
        if self.read_only {
            return;
        }
        self.outcome = outcome;
    }

    /// Row at `index`.
    ///
    /// # Errors
    ///
    /// Returns `DalError::IndexOutOfRange` for an invalid index.
    pub fn get(&self, index: usize) -> Result<&Row> {
        self.rows.get(index).ok_or(DalError::IndexOutOfRange {
            index,
            len: self.rows.len(),
        })
    }

    /// Mutable row access; `None` for read-only sets or bad indexes.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        if self.read_only {
            return None;
        }
        self.rows.get_mut(index)
    }

    /// Copies up to `length` rows starting at `index` into a new set that
    /// keeps this set's query, count and outcome.
    ///
    /// # Errors
    ///
    /// Returns `DalError::IndexOutOfRange` if `index` is not a valid row.
    pub fn range(&self, index: usize, length: usize) -> Result<ResultSet> {
        if index >= self.rows.len() {
            return Err(DalError::IndexOutOfRange {
                index,
                len: self.rows.len(),
            });
        }
        let end = index.saturating_add(length).min(self.rows.len());
        Ok(ResultSet {
            rows: self.rows[index..end].to_vec(),
            rows_affected: self.rows_affected,
            query: self.query.clone(),
            read_only: false,
            outcome: self.outcome,
        })
    }

    /// Field names of the first row.
    pub fn field_names(&self) -> Vec<String> {
        self.rows
            .first()
            .map(|row| row.fields().to_vec())
            .unwrap_or_default()
    }

    /// Every row's value for `name`, null sentinel where missing.
    pub fn column(&self, name: &str) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.get_value(name).to_string())
            .collect()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
