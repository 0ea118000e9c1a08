use std::{fmt, sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    executor::{normalize_payload, AggregationBackend, AggregationRow, BackendRequest, ExecutorError, ResultCache, Scope},
    planner::AggregationRequest,
};

/// Runs single aggregation requests against the backend.
///
/// Cheap to clone: the backend and the optional cache are shared.
#[derive(Clone)]
pub struct AggregationExecutor {
    backend: Arc<dyn AggregationBackend>,
    cache: Option<(Arc<dyn ResultCache>, Duration)>,
}

impl fmt::Debug for AggregationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationExecutor")
            .field("cached", &self.cache.is_some())
            .finish()
    }
}

impl AggregationExecutor {
    pub fn new(backend: Arc<dyn AggregationBackend>) -> Self {
        Self { backend, cache: None }
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    /// Zero rows is a success; only transport, embedded and payload errors
    /// are failures.
    pub async fn execute(&self, request: &AggregationRequest, scope: Scope) -> Result<Vec<AggregationRow>, ExecutorError> {
        let wire = BackendRequest::from_request(request, scope);
        let key = self.cache.as_ref().and_then(|_| wire.cache_key());

        if let (Some((cache, _)), Some(key)) = (&self.cache, &key) {
            if let Some(rows) = cache.get(key) {
                debug!(table = %wire.table, group_by = %wire.group_by, "aggregation served from cache");
                return Ok(rows);
            }
        }

        debug!(table = %wire.table, group_by = %wire.group_by, metric = %wire.metric, aggregation = %wire.aggregation, "executing aggregation");
        let payload = self.backend.execute_aggregation(&wire).await?;
        let rows = normalize_payload(payload, request.aggregation_fn)?;

        if let (Some((cache, ttl)), Some(key)) = (&self.cache, &key) {
            cache.put(key, rows.clone(), *ttl);
        }
        Ok(rows)
    }
}
