//! Small capability traits composed by the model types.

use crate::core::{DalError, Result};

/// Literal stored in place of an absent value.
pub const NULL_SENTINEL: &str = "NULL";

/// Values that can be absent.
pub trait Nullable {
    fn is_null(&self) -> bool;

    /// Replaces the value(s) with the null sentinel. Idempotent.
    fn make_null(&mut self);
}

/// Field-name identity shared by `Entry` and `Row`.
///
/// Names compare after trimming outer whitespace and upper-casing, so
/// `" student_id"` and `"STUDENT_ID"` refer to the same field.
pub trait FieldNameValidator {
    /// Normalizes `name`, failing when nothing is left after trimming.
    fn normalize_field(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DalError::Validation(
                "field name must not be empty".to_string(),
            ));
        }
        Ok(trimmed.to_uppercase())
    }

    fn is_valid_field(name: &str) -> bool {
        !name.trim().is_empty()
    }

    /// Compares two names under field identity. Empty names never match.
    fn same_field(a: &str, b: &str) -> bool {
        match (Self::normalize_field(a), Self::normalize_field(b)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Names;
    impl FieldNameValidator for Names {}

    #[test]
    fn test_normalize_field() {
        assert_eq!(Names::normalize_field("  grade ").unwrap(), "GRADE");
        assert!(matches!(
            Names::normalize_field("   "),
            Err(DalError::Validation(_))
        ));
    }

    #[test]
    fn test_same_field() {
        assert!(Names::same_field("Course_Id", " COURSE_ID"));
        assert!(!Names::same_field("course", "course_id"));
        assert!(!Names::same_field("", ""));
    }
}
