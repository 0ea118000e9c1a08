use serde::{Deserialize, Serialize};

use crate::{aggregators::AggregationFn, parser::FilterClause};

/// One aggregation the backend can run: group `table` by one or two fields
/// and aggregate `metric_field` under the AND of `filters`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationRequest {
    pub table: String,
    pub group_by_fields: Vec<String>,
    pub metric_field: String,
    pub aggregation_fn: AggregationFn,
    pub filters: Vec<FilterClause>,
    pub limit: usize,
}

impl AggregationRequest {
    pub fn is_two_dimensional(&self) -> bool {
        self.group_by_fields.len() == 2
    }

    /// Comma-joined group-by list, as the backend expects it.
    pub fn group_by(&self) -> String {
        self.group_by_fields.join(",")
    }

    /// Every column the request touches, in order of first appearance.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        let fields = self.group_by_fields
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.metric_field.as_str()))
            .chain(self.filters.iter().map(|f| f.field.as_str()));
        for field in fields {
            if !out.contains(&field) {
                out.push(field);
            }
        }
        out
    }
}

/// A request plus the product term it was fanned out for, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedRequest {
    pub term: Option<String>,
    pub request: AggregationRequest,
}

impl PlannedRequest {
    /// Key the request's results are attributed to in a batch.
    pub fn label(&self) -> &str {
        self.term.as_deref().unwrap_or("all")
    }
}
