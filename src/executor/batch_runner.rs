use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokio::{sync::Semaphore, task::JoinSet};
use tracing::{info, warn};

use crate::{
    executor::{AggregationExecutor, AggregationRow, BackendError, ExecutorError, Scope},
    planner::PlannedRequest,
};

/// How a batch of planned requests is issued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One request at a time, in plan order
    #[default]
    Sequential,
    /// Up to `n` requests in flight
    Bounded(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFailure {
    pub term: String,
    pub error: ExecutorError,
}

/// Per-term results of a batch. Every planned request lands in exactly one
/// of `results`, `empty` or `failures`, in plan order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub results: IndexMap<String, Vec<AggregationRow>>,
    pub empty: Vec<String>,
    pub failures: Vec<TermFailure>,
}

impl BatchOutcome {
    pub fn has_data(&self) -> bool {
        !self.results.is_empty()
    }

    pub fn attempted(&self) -> usize {
        self.results.len() + self.empty.len() + self.failures.len()
    }

    pub fn all_failed(&self) -> bool {
        self.attempted() > 0 && self.failures.len() == self.attempted()
    }

    pub fn failed_terms(&self) -> Vec<String> {
        self.failures.iter().map(|f| f.term.clone()).collect()
    }

    /// Rows of every successful request, in plan order.
    pub fn all_rows(&self) -> Vec<AggregationRow> {
        self.results.values().flatten().cloned().collect()
    }

    fn record(&mut self, term: &str, result: Result<Vec<AggregationRow>, ExecutorError>) {
        match result {
            Ok(rows) if rows.is_empty() => self.empty.push(term.to_string()),
            Ok(rows) => {
                self.results.entry(term.to_string()).or_default().extend(rows);
            }
            Err(error) => {
                warn!(term, %error, "aggregation failed, skipping term");
                self.failures.push(TermFailure { term: term.to_string(), error });
            }
        }
    }
}

/// Executes a plan's requests and attributes every outcome to its term. A
/// failing request never affects the others.
#[derive(Debug, Clone)]
pub struct BatchRunner {
    executor: AggregationExecutor,
    mode: ExecutionMode,
}

impl BatchRunner {
    pub fn new(executor: AggregationExecutor, mode: ExecutionMode) -> Self {
        Self { executor, mode }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub async fn run(&self, requests: &[PlannedRequest], scope: Scope) -> BatchOutcome {
        let outcome = match self.mode {
            ExecutionMode::Bounded(workers) if workers > 1 && requests.len() > 1 => {
                self.run_bounded(requests, scope, workers).await
            }
            _ => self.run_sequential(requests, scope).await,
        };
        info!(
            requests = requests.len(),
            with_data = outcome.results.len(),
            empty = outcome.empty.len(),
            failed = outcome.failures.len(),
            "aggregation batch finished"
        );
        outcome
    }

    async fn run_sequential(&self, requests: &[PlannedRequest], scope: Scope) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for planned in requests {
            let result = self.executor.execute(&planned.request, scope).await;
            outcome.record(planned.label(), result);
        }
        outcome
    }

    async fn run_bounded(&self, requests: &[PlannedRequest], scope: Scope, workers: usize) -> BatchOutcome {
        let permits = Arc::new(Semaphore::new(workers));
        let mut tasks = JoinSet::new();

        for (idx, planned) in requests.iter().enumerate() {
            let executor = self.executor.clone();
            let request = planned.request.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => executor.execute(&request, scope).await,
                    Err(_) => Err(ExecutorError::Backend(BackendError::Transport("worker pool closed".into()))),
                };
                (idx, result)
            });
        }

        let mut slots: Vec<Option<Result<Vec<AggregationRow>, ExecutorError>>> = vec![None; requests.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => slots[idx] = Some(result),
                Err(err) => warn!(error = %err, "aggregation task did not complete"),
            }
        }

        let mut outcome = BatchOutcome::default();
        for (planned, slot) in requests.iter().zip(slots) {
            let result = slot.unwrap_or_else(|| {
                Err(ExecutorError::Backend(BackendError::Transport("aggregation task aborted".into())))
            });
            outcome.record(planned.label(), result);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        aggregators::AggregationFn,
        executor::{AggregationBackend, BackendRequest},
        parser::FilterClause,
        planner::AggregationRequest,
    };
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    /// Answers by the term in the request's `%term%` filter.
    struct ByTerm {
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ByTerm {
        fn new() -> Self {
            Self { in_flight: AtomicUsize::new(0), max_in_flight: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl AggregationBackend for ByTerm {
        async fn execute_aggregation(&self, request: &BackendRequest) -> Result<Value, BackendError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let term = request.filters.last().map(|f| f.value.as_str()).unwrap_or_default();
            match term {
                "%down%" => Err(BackendError::Transport("timeout".into())),
                "%broken%" => Ok(json!({ "error": "bad column" })),
                "%none%" => Ok(json!({ "data": [] })),
                _ => Ok(json!({ "data": [{ "group": "TX", "value": 1.0, "count": 1 }] })),
            }
        }
    }

    fn planned(term: &str) -> PlannedRequest {
        PlannedRequest {
            term: Some(term.to_string()),
            request: AggregationRequest {
                table: "shipment_items".into(),
                group_by_fields: vec!["destination_state".into()],
                metric_field: "total_charge".into(),
                aggregation_fn: AggregationFn::Sum,
                filters: vec![FilterClause::contains("item_description", term)],
                limit: 10,
            },
        }
    }

    fn plan() -> Vec<PlannedRequest> {
        ["a", "down", "b", "none", "broken", "c"].iter().map(|t| planned(t)).collect()
    }

    fn check(outcome: &BatchOutcome) {
        assert_eq!(outcome.results.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(outcome.empty, vec!["none"]);
        assert_eq!(outcome.failed_terms(), vec!["down", "broken"]);
        assert!(matches!(outcome.failures[1].error, ExecutorError::Embedded(_)));
        assert_eq!(outcome.attempted(), 6);
        assert!(!outcome.all_failed());
    }

    #[tokio::test]
    async fn sequential_attributes_each_term() {
        let backend = Arc::new(ByTerm::new());
        let runner = BatchRunner::new(AggregationExecutor::new(backend.clone()), ExecutionMode::Sequential);
        let outcome = runner.run(&plan(), Scope::admin()).await;
        check(&outcome);
        assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bounded_keeps_plan_order_and_limit() {
        let backend = Arc::new(ByTerm::new());
        let runner = BatchRunner::new(AggregationExecutor::new(backend.clone()), ExecutionMode::Bounded(2));
        let outcome = runner.run(&plan(), Scope::admin()).await;
        check(&outcome);
        assert!(backend.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn every_request_failing() {
        let runner = BatchRunner::new(AggregationExecutor::new(Arc::new(ByTerm::new())), ExecutionMode::Sequential);
        let outcome = runner.run(&[planned("down"), planned("broken")], Scope::default()).await;
        assert!(outcome.all_failed());
        assert!(!outcome.has_data());
    }
}
