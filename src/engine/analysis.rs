use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    aggregators::{GroupedChartRow, LabelValue},
    engine::BatchId,
    executor::Scope,
    parser::{DateRange, ParsedQuery},
    planner::PlanShape,
    profiler::DataProfile,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub text: String,
    /// Active dashboard range
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub scope: Scope,
}

impl AnalysisRequest {
    pub fn new(text: &str) -> Self {
        Self { text: text.to_string(), date_range: None, scope: Scope::default() }
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }
}

/// Chart-ready result of a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Outcome {
    MultiDimension { rows: Vec<GroupedChartRow>, secondary_groups: Vec<String> },
    SingleDimension(Vec<LabelValue>),
}

impl Outcome {
    pub fn len(&self) -> usize {
        match self {
            Outcome::MultiDimension { rows, .. } => rows.len(),
            Outcome::SingleDimension(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The outcome as plain JSON records, the shape the profiler reads.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        let values: Vec<Value> = match self {
            Outcome::MultiDimension { rows, .. } => rows.iter().filter_map(|r| serde_json::to_value(r).ok()).collect(),
            Outcome::SingleDimension(values) => values.iter().filter_map(|v| serde_json::to_value(v).ok()).collect(),
        };
        values
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResponse {
    pub batch_id: BatchId,
    /// Absent for manual selections
    pub parsed: Option<ParsedQuery>,
    pub shape: PlanShape,
    pub outcome: Outcome,
    pub profile: Option<DataProfile>,
    /// Terms whose request failed and were skipped
    pub failed_terms: Vec<String>,
    /// Terms whose request succeeded without rows
    pub empty_terms: Vec<String>,
}
