use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{aggregators::AggregationFn, parser::FilterClause};

/// Coarse analytical goal of a request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    #[default]
    Analyze,
    Compare,
    Trend,
    Breakdown,
    Find,
    Summarize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Day,
    Week,
    Month,
}

impl Granularity {
    /// Bucket size that keeps a chart readable for a range of `days`.
    pub fn for_span(days: i64) -> Granularity {
        match days {
            d if d <= 31 => Granularity::Day,
            d if d <= 92 => Granularity::Week,
            _ => Granularity::Month,
        }
    }
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub granularity: Granularity,
}

impl TimeRange {
    /// Range with a granularity derived from its length.
    pub fn spanning(start: NaiveDate, end: NaiveDate) -> Self {
        let granularity = Granularity::for_span((end - start).num_days());
        Self { start, end, granularity }
    }

    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start, self.end)
    }
}

/// Which multi-dimension rule produced a [`DimensionPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiDimensionStrategy {
    StructuredTemplate,
    KeywordProximity,
    ByConjunction,
}

/// Two grouping dimensions: `primary` becomes the row axis of the chart and
/// `secondary` the column axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionPair {
    pub primary: String,
    pub secondary: String,
    pub strategy: MultiDimensionStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeographicScope {
    /// Two-letter region codes mentioned in the request, in mention order
    pub region_codes: Vec<String>,
    /// Geographic dimension the request groups by, if any
    pub dimension: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Best-effort structured reading of a free-text request.
///
/// Field names in `metrics`, `dimensions` and filter clauses are vocabulary
/// ids ("cost", "state"), not catalog column ids; binding them to columns is
/// the resolver's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedQuery {
    pub intent: Intent,
    pub metrics: Vec<String>,
    pub dimensions: Vec<String>,
    pub filters: Vec<FilterClause>,
    pub time_range: Option<TimeRange>,
    pub geographic: Option<GeographicScope>,
    pub comparison_targets: Vec<String>,
    pub aggregation: AggregationFn,
    pub terms: Vec<String>,
    pub multi_dimension: Option<DimensionPair>,
    pub limit: Option<usize>,
    pub sort: Option<SortDirection>,
}

impl ParsedQuery {
    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}
