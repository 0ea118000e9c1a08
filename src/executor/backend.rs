use std::fmt::Display;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{aggregators::AggregationFn, planner::AggregationRequest};

/// Caller visibility scope. Opaque to the engine and forwarded verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub customer_id: Option<i64>,
    pub is_admin: bool,
}

impl Scope {
    pub fn customer(customer_id: i64) -> Self {
        Self { customer_id: Some(customer_id), is_admin: false }
    }

    pub fn admin() -> Self {
        Self { customer_id: None, is_admin: true }
    }
}

/// Filter as the backend receives it: every value is a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireFilter {
    pub field: String,
    pub operator: String,
    pub value: String,
}

/// Argument set of one `execute_aggregation` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendRequest {
    pub table: String,
    /// Comma-joined list of one or two fields
    pub group_by: String,
    pub metric: String,
    pub aggregation: AggregationFn,
    pub filters: Vec<WireFilter>,
    pub limit: usize,
    pub scope: Scope,
}

impl BackendRequest {
    pub fn from_request(request: &AggregationRequest, scope: Scope) -> Self {
        Self {
            table: request.table.clone(),
            group_by: request.group_by(),
            metric: request.metric_field.clone(),
            aggregation: request.aggregation_fn,
            filters: request
                .filters
                .iter()
                .map(|f| WireFilter {
                    field: f.field.clone(),
                    operator: f.operator.as_str().to_string(),
                    value: f.value.to_wire(),
                })
                .collect(),
            limit: request.limit,
            scope,
        }
    }

    /// Canonical JSON of every argument; equal requests give equal keys.
    pub fn cache_key(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The call never produced a response (network, timeout, ...)
    Transport(String),
    /// The backend answered with a failure status
    Rejected { status: u16, message: String },
}

impl Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Transport(msg) => write!(f, "backend unreachable: {msg}"),
            BackendError::Rejected { status, message } => write!(f, "backend rejected request ({status}): {message}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The hosted data backend.
///
/// The returned payload is `{"data": [...]}` or `{"error": "..."}`, either as
/// a JSON value or as a string holding the encoded JSON.
#[async_trait]
pub trait AggregationBackend: Send + Sync {
    async fn execute_aggregation(&self, request: &BackendRequest) -> Result<Value, BackendError>;
}
