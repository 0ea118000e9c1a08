use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    aggregators::{LabelValue, MultiDimensionMerger},
    catalog::ColumnCatalog,
    config::EngineConfig,
    engine::{AnalysisRequest, AnalysisResponse, BatchId, BatchTracker, EngineError, Outcome},
    executor::{AggregationBackend, AggregationExecutor, BatchOutcome, BatchRunner, ResultCache, Scope},
    parser::{IntentParser, ParsedQuery, SortDirection, TermExtractor, Vocabulary},
    planner::{BuildContext, BuildPlan, ManualSelection, PlanShape, RequestBuilder},
    profiler::DataProfiler,
    resolver::{AliasTable, ColumnResolver},
};

/// Free text in, chart rows out.
///
/// Parsing, resolution, planning and merging are synchronous; the only
/// suspension points are the backend calls. Requests that fail inside a batch
/// are skipped, and an error is returned only when no usable data is left.
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    catalog: ColumnCatalog,
    parser: IntentParser,
    resolver: ColumnResolver,
    executor: AggregationExecutor,
    tracker: BatchTracker,
}

impl Engine {
    pub fn new(config: EngineConfig, catalog: ColumnCatalog, backend: Arc<dyn AggregationBackend>) -> Self {
        let vocabulary = Vocabulary::default().with_fallback_metric(&config.default_metric);
        let parser = IntentParser::new(vocabulary, TermExtractor::new(config.terms.clone()));

        let mut aliases = AliasTable::default();
        for (hint, column_id) in &config.aliases {
            aliases.insert(hint, column_id);
        }

        Self {
            parser,
            resolver: ColumnResolver::new(aliases),
            executor: AggregationExecutor::new(backend),
            tracker: BatchTracker::new(),
            config,
            catalog,
        }
    }

    /// Share `cache` across requests. Ignored when the configured TTL is 0.
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        if let Some(ttl) = self.config.cache_ttl() {
            self.executor = self.executor.with_cache(cache, ttl);
        }
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn parser(&self) -> &IntentParser {
        &self.parser
    }

    pub fn parse(&self, text: &str) -> ParsedQuery {
        self.parser.parse(text)
    }

    /// Whether `id` belongs to the most recently started batch.
    pub fn is_current(&self, id: &BatchId) -> bool {
        self.tracker.is_current(id)
    }

    fn visible_catalog(&self, scope: Scope) -> ColumnCatalog {
        self.catalog.visible(scope.is_admin)
    }

    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResponse, EngineError> {
        self.analyze_at(request, Utc::now()).await
    }

    /// [`analyze`](Self::analyze) with relative dates anchored at `now`.
    pub async fn analyze_at(&self, request: &AnalysisRequest, now: DateTime<Utc>) -> Result<AnalysisResponse, EngineError> {
        let batch_id = self.tracker.begin();
        let parsed = self.parser.parse_at(&request.text, now);

        let plan = {
            let catalog = self.visible_catalog(request.scope);
            let builder = RequestBuilder::new(&self.config, &catalog, &self.resolver);
            builder.build(&parsed, &BuildContext::new(request.date_range, now))?
        };

        info!(%batch_id, intent = ?parsed.intent, requests = plan.requests.len(), "analysis started");
        self.execute(batch_id, Some(parsed), plan, request.scope).await
    }

    pub async fn run_selection(&self, selection: &ManualSelection, scope: Scope) -> Result<AnalysisResponse, EngineError> {
        self.run_selection_at(selection, scope, Utc::now()).await
    }

    pub async fn run_selection_at(
        &self,
        selection: &ManualSelection,
        scope: Scope,
        now: DateTime<Utc>,
    ) -> Result<AnalysisResponse, EngineError> {
        let batch_id = self.tracker.begin();
        let plan = {
            let catalog = self.visible_catalog(scope);
            RequestBuilder::new(&self.config, &catalog, &self.resolver).build_manual(selection, now)?
        };

        info!(%batch_id, requests = plan.requests.len(), "manual selection started");
        self.execute(batch_id, None, plan, scope).await
    }

    async fn execute(
        &self,
        batch_id: BatchId,
        parsed: Option<ParsedQuery>,
        plan: BuildPlan,
        scope: Scope,
    ) -> Result<AnalysisResponse, EngineError> {
        let runner = BatchRunner::new(self.executor.clone(), self.config.execution);
        let batch = runner.run(&plan.requests, scope).await;

        if !batch.has_data() {
            return Err(if batch.failures.is_empty() {
                EngineError::NoMatchingRecords {
                    suggestion: format!(
                        "Nothing was found between {} and {}. Try widening the date range or removing filters.",
                        plan.date_range.start, plan.date_range.end
                    ),
                }
            } else {
                EngineError::NoDataFound { failed: batch.failed_terms() }
            });
        }

        let outcome = Self::reduce(&plan, &batch);
        let profile = self
            .config
            .profile_results
            .then(|| DataProfiler::profile(&outcome.records(), None));

        Ok(AnalysisResponse {
            batch_id,
            parsed,
            shape: plan.shape,
            outcome,
            profile,
            failed_terms: batch.failed_terms(),
            empty_terms: batch.empty,
        })
    }

    fn reduce(plan: &BuildPlan, batch: &BatchOutcome) -> Outcome {
        let merger = MultiDimensionMerger::new(plan.aggregation);
        match plan.shape {
            PlanShape::PerTerm => {
                let merged = merger.merge(&batch.results);
                Outcome::MultiDimension { rows: merged.rows, secondary_groups: merged.secondary_groups }
            }
            PlanShape::TwoDimension => {
                let merged = merger.merge_rows(&batch.all_rows());
                Outcome::MultiDimension { rows: merged.rows, secondary_groups: merged.secondary_groups }
            }
            PlanShape::PerTermTotals => Outcome::SingleDimension(merger.collapse(&batch.results)),
            PlanShape::SingleDimension => {
                let mut values = merger.single_dimension(&batch.all_rows());
                if plan.sort == Some(SortDirection::Asc) {
                    sort_ascending(&mut values);
                }
                Outcome::SingleDimension(values)
            }
        }
    }
}

fn sort_ascending(values: &mut [LabelValue]) {
    values.sort_by(|a, b| a.value.total_cmp(&b.value).then_with(|| a.label.cmp(&b.label)));
}
