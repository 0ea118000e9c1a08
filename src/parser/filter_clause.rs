use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Eq,
    Gte,
    Lte,
    Ilike,
    ContainsAny,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Eq => "eq",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::Ilike => "ilike",
            FilterOperator::ContainsAny => "contains_any",
        }
    }
}

/// Right-hand side of a filter. `Any` only appears with `contains_any` and
/// is the OR-of-contains form used for product terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Single(String),
    Any(Vec<String>),
}

impl FilterValue {
    /// Wire representation: the backend only accepts strings.
    pub fn to_wire(&self) -> String {
        match self {
            FilterValue::Single(v) => v.clone(),
            FilterValue::Any(values) => values.join(","),
        }
    }
}

/// One filter condition. Clauses in a list are AND-ed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub field: String,
    pub operator: FilterOperator,
    pub value: FilterValue,
}

impl FilterClause {
    pub fn new(field: &str, operator: FilterOperator, value: &str) -> Self {
        Self { field: field.to_string(), operator, value: FilterValue::Single(value.to_string()) }
    }

    pub fn eq(field: &str, value: &str) -> Self { Self::new(field, FilterOperator::Eq, value) }

    pub fn gte(field: &str, value: &str) -> Self { Self::new(field, FilterOperator::Gte, value) }

    pub fn lte(field: &str, value: &str) -> Self { Self::new(field, FilterOperator::Lte, value) }

    /// Substring match on `term` (`%term%`).
    pub fn contains(field: &str, term: &str) -> Self {
        Self::new(field, FilterOperator::Ilike, &format!("%{term}%"))
    }

    pub fn contains_any(field: &str, terms: &[String]) -> Self {
        Self { field: field.to_string(), operator: FilterOperator::ContainsAny, value: FilterValue::Any(terms.to_vec()) }
    }

    pub fn with_field(&self, field: &str) -> Self {
        Self { field: field.to_string(), ..self.clone() }
    }
}
