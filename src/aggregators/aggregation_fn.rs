use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Aggregation applied by the backend to the metric field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregationFn {
    #[default]
    Sum,
    Avg,
    Count,
    Min,
    Max,
}

impl AggregationFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationFn::Sum => "sum",
            AggregationFn::Avg => "avg",
            AggregationFn::Count => "count",
            AggregationFn::Min => "min",
            AggregationFn::Max => "max",
        }
    }

    /// Case-insensitive parse; accepts the common long forms too.
    pub fn parse(name: &str) -> Option<AggregationFn> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sum" | "total" => Some(AggregationFn::Sum),
            "avg" | "average" | "mean" => Some(AggregationFn::Avg),
            "count" => Some(AggregationFn::Count),
            "min" | "minimum" => Some(AggregationFn::Min),
            "max" | "maximum" => Some(AggregationFn::Max),
            _ => None,
        }
    }

    pub fn all() -> [AggregationFn; 5] {
        [AggregationFn::Sum, AggregationFn::Avg, AggregationFn::Count, AggregationFn::Min, AggregationFn::Max]
    }
}

impl Display for AggregationFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
