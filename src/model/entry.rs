use crate::core::Result;
use crate::model::capability::{FieldNameValidator, Nullable, NULL_SENTINEL};
use std::cmp::Ordering;
use std::fmt;

/// A single field/value pair, the atomic unit of the tabular model.
///
/// The field is stored normalized (trimmed, upper-cased); the value is stored
/// verbatim. An unset value holds the `"NULL"` sentinel, so an entry whose
/// value is literally the text `NULL` is also null.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    field: String,
    value: String,
}

impl FieldNameValidator for Entry {}

impl Entry {
    /// Creates a null entry for `field`.
    pub fn new(field: &str) -> Result<Self> {
        Self::with_value(field, NULL_SENTINEL)
    }

    /// Creates an entry holding `value`.
    ///
    /// # Errors
    ///
    /// Returns `DalError::Validation` if `field` is empty after trimming.
    pub fn with_value(field: &str, value: impl Into<String>) -> Result<Self> {
        Ok(Entry {
            field: Self::normalize_field(field)?,
            value: value.into(),
        })
    }

    /// Replaces both field and value. On error the entry is left untouched.
    pub fn set_data(&mut self, field: &str, value: impl Into<String>) -> Result<()> {
        self.field = Self::normalize_field(field)?;
        self.value = value.into();
        Ok(())
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn has_field(&self, candidate: &str) -> bool {
        Self::normalize_field(candidate)
            .map(|name| name == self.field)
            .unwrap_or(false)
    }

    /// Exact, case-sensitive value comparison.
    pub fn has_value(&self, candidate: &str) -> bool {
        self.value == candidate
    }

    pub fn into_value(self) -> String {
        self.value
    }
}

impl Nullable for Entry {
    fn is_null(&self) -> bool {
        self.value == NULL_SENTINEL
    }

    fn make_null(&mut self) {
        self.value = NULL_SENTINEL.to_string();
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.field.cmp(&other.field) {
            Ordering::Equal => self.value.cmp(&other.value),
            unequal => unequal,
        }
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}
