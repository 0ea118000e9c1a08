use serde::{Deserialize, Serialize};

/// One group of a backend aggregation.
///
/// `support_count` is the number of underlying records behind `value`; it is
/// what lets partial averages be re-weighted when results are merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationRow {
    pub group_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_group_value: Option<String>,
    pub value: f64,
    pub support_count: u64,
}

impl AggregationRow {
    pub fn new(group_value: &str, value: f64, support_count: u64) -> Self {
        Self { group_value: group_value.to_string(), secondary_group_value: None, value, support_count }
    }

    pub fn with_secondary(mut self, secondary: &str) -> Self {
        self.secondary_group_value = Some(secondary.to_string());
        self
    }
}
