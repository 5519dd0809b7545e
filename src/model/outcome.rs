use std::fmt;

/// Execution outcome of a statement, operation or transaction.
///
/// `Null` is the initial, not-yet-run state. Each execution attempt moves it
/// to exactly one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    Null,
    /// The statement faulted (bad SQL, binding, constraint, no transaction)
    Error,
    /// The statement ran but had no effect
    Failure,
    Success,
}

impl Outcome {
    /// Derives a write outcome from the driver's affected-row count.
    pub fn from_rows_affected(rows_affected: i64) -> Self {
        match rows_affected {
            n if n <= -1 => Outcome::Error,
            0 => Outcome::Failure,
            _ => Outcome::Success,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }

    /// True once any execution attempt has concluded.
    pub fn is_terminal(self) -> bool {
        self != Outcome::Null
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Null => "NULL",
            Outcome::Error => "ERROR",
            Outcome::Failure => "FAILURE",
            Outcome::Success => "SUCCESS",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
