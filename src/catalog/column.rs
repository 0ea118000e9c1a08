use serde::{Deserialize, Serialize};

use crate::catalog::ColumnDataType;

/// A queryable field of the freight data source.
///
/// Columns are immutable once loaded; identity is `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub label: String,
    pub category: String,
    pub data_type: ColumnDataType,
    #[serde(default)]
    pub restricted: bool,
}

impl Column {
    pub fn new(id: &str, label: &str, category: &str, data_type: ColumnDataType) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            category: category.to_string(),
            data_type,
            restricted: false,
        }
    }

    pub fn restricted(mut self) -> Self { self.restricted = true; self }

    pub fn is_numeric(&self) -> bool {
        self.data_type.is_numeric()
    }
}
