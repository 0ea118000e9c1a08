use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Which part of a selection could not be bound to a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionRole {
    Metric,
    GroupBy,
    SecondaryGroupBy,
}

impl Display for SelectionRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionRole::Metric => write!(f, "metric"),
            SelectionRole::GroupBy => write!(f, "group by"),
            SelectionRole::SecondaryGroupBy => write!(f, "secondary group by"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No safe column binding; the user has to pick one.
    SelectionRequired { role: SelectionRole, hint: String },
}

impl Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::SelectionRequired { role, hint } => {
                write!(f, "Please select a {role} field: '{hint}' does not match any available column")
            }
        }
    }
}

impl std::error::Error for BuildError {}
