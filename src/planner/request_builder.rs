use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    aggregators::AggregationFn,
    catalog::{Column, ColumnCatalog},
    config::EngineConfig,
    parser::{DateRange, FilterClause, ParsedQuery, SortDirection},
    planner::{AggregationRequest, BuildError, PlannedRequest, SelectionRole, TableRouter},
    resolver::ColumnResolver,
};

/// Caller-side inputs that are not part of the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildContext {
    /// Active dashboard range, used when the text names no time phrase
    pub date_range: Option<DateRange>,
    pub now: DateTime<Utc>,
}

impl BuildContext {
    pub fn new(date_range: Option<DateRange>, now: DateTime<Utc>) -> Self {
        Self { date_range, now }
    }
}

/// Explicit group/metric choices made in the UI, bypassing the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualSelection {
    pub group_by: String,
    #[serde(default)]
    pub secondary_group_by: Option<String>,
    pub metric: String,
    #[serde(default)]
    pub aggregation: AggregationFn,
    #[serde(default)]
    pub terms: Vec<String>,
    #[serde(default)]
    pub date_range: Option<DateRange>,
}

/// How the results of a plan are reduced to chart output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanShape {
    /// One request per term grouped by a secondary field: term × group matrix
    PerTerm,
    /// One request per term with no secondary field: one value per term
    PerTermTotals,
    /// One request grouped by two fields
    TwoDimension,
    /// One request grouped by one field
    SingleDimension,
}

impl PlanShape {
    pub fn is_multi_dimension(&self) -> bool {
        matches!(self, PlanShape::PerTerm | PlanShape::TwoDimension)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub requests: Vec<PlannedRequest>,
    pub shape: PlanShape,
    pub aggregation: AggregationFn,
    pub date_range: DateRange,
    pub sort: Option<SortDirection>,
}

impl BuildPlan {
    pub fn is_fan_out(&self) -> bool {
        matches!(self.shape, PlanShape::PerTerm | PlanShape::PerTermTotals)
    }
}

// Source-independent view of what to build, shared by parsed and manual input.
struct PlanInputs {
    metric_hint: String,
    aggregation: AggregationFn,
    dimensions: Vec<String>,
    pair: Option<(String, String)>,
    terms: Vec<String>,
    filters: Vec<FilterClause>,
    date_range: DateRange,
    limit: usize,
    sort: Option<SortDirection>,
}

/// Assembles aggregation requests from a parsed query or a manual selection.
///
/// Product terms at or above the fan-out threshold become one request per
/// term, each carrying a single `ilike %term%` clause, so every term keeps its
/// own row in the merged output. Below the threshold a single consolidated
/// request is built. Every request carries the effective date-range filter.
#[derive(Debug, Clone)]
pub struct RequestBuilder<'c> {
    config: &'c EngineConfig,
    catalog: &'c ColumnCatalog,
    resolver: &'c ColumnResolver,
    router: TableRouter,
}

impl<'c> RequestBuilder<'c> {
    pub fn new(config: &'c EngineConfig, catalog: &'c ColumnCatalog, resolver: &'c ColumnResolver) -> Self {
        Self { config, catalog, resolver, router: TableRouter::from_config(config) }
    }

    /// Effective range: time phrase in the text, then the caller's range,
    /// then the default lookback ending today.
    pub fn effective_date_range(&self, parsed: Option<&ParsedQuery>, ctx: &BuildContext) -> DateRange {
        if let Some(range) = parsed.and_then(|p| p.time_range) {
            return range.date_range();
        }
        if let Some(range) = ctx.date_range {
            return range;
        }
        self.default_range(ctx.now)
    }

    fn default_range(&self, now: DateTime<Utc>) -> DateRange {
        let today = now.date_naive();
        let start = today
            .checked_sub_signed(Duration::days(self.config.default_lookback_days))
            .unwrap_or(today);
        DateRange::new(start, today)
    }

    pub fn build(&self, parsed: &ParsedQuery, ctx: &BuildContext) -> Result<BuildPlan, BuildError> {
        let mut filters = Vec::new();
        for clause in &parsed.filters {
            match self.resolver.resolve(&clause.field, self.catalog) {
                Some(column) => filters.push(clause.with_field(&column.id)),
                None => warn!(field = %clause.field, "dropping filter on unknown field"),
            }
        }

        self.assemble(PlanInputs {
            metric_hint: parsed
                .primary_metric()
                .unwrap_or(&self.config.default_metric)
                .to_string(),
            aggregation: parsed.aggregation,
            dimensions: parsed.dimensions.clone(),
            pair: parsed
                .multi_dimension
                .as_ref()
                .map(|p| (p.primary.clone(), p.secondary.clone())),
            terms: parsed.terms.clone(),
            filters,
            date_range: self.effective_date_range(Some(parsed), ctx),
            limit: parsed.limit.unwrap_or(self.config.default_limit),
            sort: parsed.sort,
        })
    }

    pub fn build_manual(&self, selection: &ManualSelection, now: DateTime<Utc>) -> Result<BuildPlan, BuildError> {
        let date_range = selection.date_range.unwrap_or_else(|| self.default_range(now));
        self.assemble(PlanInputs {
            metric_hint: selection.metric.clone(),
            aggregation: selection.aggregation,
            dimensions: vec![selection.group_by.clone()],
            pair: selection
                .secondary_group_by
                .as_ref()
                .map(|s| (selection.group_by.clone(), s.clone())),
            terms: selection.terms.clone(),
            filters: Vec::new(),
            date_range,
            limit: self.config.default_limit,
            sort: None,
        })
    }

    fn bind(&self, hint: &str, role: SelectionRole) -> Result<&'c Column, BuildError> {
        self.resolver
            .resolve(hint, self.catalog)
            .ok_or_else(|| BuildError::SelectionRequired { role, hint: hint.to_string() })
    }

    /// Metric column and the aggregation actually applied to it. A metric that
    /// binds to the count field, or has no numeric binding under `count`, is
    /// counted on the count field.
    fn bind_metric(&self, hint: &str, aggregation: AggregationFn) -> Result<(String, AggregationFn), BuildError> {
        let count_field = self.config.count_field.as_str();
        match self.resolver.resolve(hint, self.catalog) {
            Some(column) if column.id == count_field => Ok((column.id.clone(), AggregationFn::Count)),
            Some(column) if column.is_numeric() => Ok((column.id.clone(), aggregation)),
            _ if aggregation == AggregationFn::Count => Ok((count_field.to_string(), AggregationFn::Count)),
            _ => Err(BuildError::SelectionRequired { role: SelectionRole::Metric, hint: hint.to_string() }),
        }
    }

    fn date_filters(&self, range: &DateRange) -> Vec<FilterClause> {
        vec![
            FilterClause::gte(&self.config.date_field, &range.start.to_string()),
            FilterClause::lte(&self.config.date_field, &range.end.to_string()),
        ]
    }

    fn request(
        &self,
        group_by_fields: Vec<String>,
        metric_field: &str,
        aggregation_fn: AggregationFn,
        filters: Vec<FilterClause>,
        limit: usize,
    ) -> AggregationRequest {
        let mut request = AggregationRequest {
            table: String::new(),
            group_by_fields,
            metric_field: metric_field.to_string(),
            aggregation_fn,
            filters,
            limit,
        };
        request.table = self.router.route(request.referenced_fields()).to_string();
        request
    }

    /// Group-by of the per-term requests: the first requested dimension that
    /// is not the product field. The term already occupies the product axis, so
    /// only one further dimension fits and the rest are dropped.
    fn fan_out_axis(&self, inputs: &PlanInputs) -> Result<Option<&'c Column>, BuildError> {
        let product_field = self.config.product_field.as_str();
        let candidates: Vec<&'c Column> = match &inputs.pair {
            Some((primary, secondary)) => vec![
                self.bind(primary, SelectionRole::GroupBy)?,
                self.bind(secondary, SelectionRole::SecondaryGroupBy)?,
            ],
            None => inputs
                .dimensions
                .iter()
                .filter_map(|d| self.resolver.resolve(d, self.catalog))
                .collect(),
        };

        let mut axes: Vec<&'c Column> = Vec::new();
        for column in candidates {
            if column.id != product_field && !axes.iter().any(|a| a.id == column.id) {
                axes.push(column);
            }
        }

        let Some((first, rest)) = axes.split_first() else {
            return Ok(None);
        };
        if !rest.is_empty() {
            let dropped: Vec<&str> = rest.iter().map(|c| c.id.as_str()).collect();
            warn!(group_by = %first.id, ?dropped, "per-term requests take a single group-by, dropping extra dimensions");
        }
        Ok(Some(*first))
    }

    fn assemble(&self, inputs: PlanInputs) -> Result<BuildPlan, BuildError> {
        let (metric_field, aggregation) = self.bind_metric(&inputs.metric_hint, inputs.aggregation)?;
        let product_field = self.config.product_field.as_str();

        let mut base_filters = self.date_filters(&inputs.date_range);
        base_filters.extend(inputs.filters.iter().cloned());

        let (requests, shape) = if inputs.terms.len() >= self.config.fanout_threshold {
            let (group_field, shape) = match self.fan_out_axis(&inputs)? {
                Some(column) => (column.id.clone(), PlanShape::PerTerm),
                None => (product_field.to_string(), PlanShape::PerTermTotals),
            };

            let requests = inputs
                .terms
                .iter()
                .map(|term| {
                    let mut filters = base_filters.clone();
                    filters.push(FilterClause::contains(product_field, term));
                    PlannedRequest {
                        term: Some(term.clone()),
                        request: self.request(vec![group_field.clone()], &metric_field, aggregation, filters, inputs.limit),
                    }
                })
                .collect();
            (requests, shape)
        } else {
            let (group_by_fields, shape) = match &inputs.pair {
                Some((primary, secondary)) => (
                    vec![
                        self.bind(primary, SelectionRole::GroupBy)?.id.clone(),
                        self.bind(secondary, SelectionRole::SecondaryGroupBy)?.id.clone(),
                    ],
                    PlanShape::TwoDimension,
                ),
                None => {
                    let hint = inputs.dimensions.first().unwrap_or(&self.config.fallback_dimension);
                    (vec![self.bind(hint, SelectionRole::GroupBy)?.id.clone()], PlanShape::SingleDimension)
                }
            };

            let mut filters = base_filters;
            match inputs.terms.as_slice() {
                [] => {}
                [term] => filters.push(FilterClause::contains(product_field, term)),
                terms => filters.push(FilterClause::contains_any(product_field, terms)),
            }
            let request = self.request(group_by_fields, &metric_field, aggregation, filters, inputs.limit);
            (vec![PlannedRequest { term: None, request }], shape)
        };

        debug!(requests = requests.len(), ?shape, metric = %metric_field, %aggregation, "built aggregation plan");
        Ok(BuildPlan { requests, shape, aggregation, date_range: inputs.date_range, sort: inputs.sort })
    }
}
