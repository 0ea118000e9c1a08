use std::fmt::Display;

use crate::planner::{BuildError, SelectionRole};

/// User-visible failure of a whole analysis. Per-request failures inside a
/// batch are recovered locally and only surface here when nothing usable is
/// left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A field could not be bound to a column; the user must choose one
    SelectionRequired { role: SelectionRole, hint: String },
    /// Every request succeeded but none returned rows
    NoMatchingRecords { suggestion: String },
    /// No request produced usable data and at least one failed
    NoDataFound { failed: Vec<String> },
}

impl Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::SelectionRequired { role, hint } => {
                write!(f, "Selection required: choose a {role} field ('{hint}' is not available)")
            }
            EngineError::NoMatchingRecords { suggestion } => write!(f, "No matching records. {suggestion}"),
            EngineError::NoDataFound { failed } if failed.is_empty() => write!(f, "No data found"),
            EngineError::NoDataFound { failed } => write!(f, "No data found for {}", failed.join(", ")),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<BuildError> for EngineError {
    fn from(err: BuildError) -> Self {
        match err {
            BuildError::SelectionRequired { role, hint } => EngineError::SelectionRequired { role, hint },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        let err: EngineError = BuildError::SelectionRequired { role: SelectionRole::GroupBy, hint: "customer".into() }.into();
        assert_eq!(err.to_string(), "Selection required: choose a group by field ('customer' is not available)");

        let err = EngineError::NoDataFound { failed: vec!["Drawer".into(), "Tool Box".into()] };
        assert_eq!(err.to_string(), "No data found for Drawer, Tool Box");
    }
}
