#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use freight_intent::{AggregationBackend, BackendError, BackendRequest, ColumnCatalog, Engine, EngineConfig};
use serde_json::{json, Value};

/// Reference instant for every relative date in the suite.
pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap()
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    /// Payload delivered as a string holding encoded JSON
    Text(String),
    Fail(BackendError),
}

impl Reply {
    pub fn rows(rows: Value) -> Self {
        Reply::Json(json!({ "data": rows }))
    }

    pub fn empty() -> Self {
        Reply::rows(json!([]))
    }
}

/// Answers by the product term in the request's `ilike` filter, or with the
/// default reply when the request carries none.
#[derive(Debug)]
pub struct ScriptedBackend {
    by_term: HashMap<String, Reply>,
    default: Reply,
    calls: Mutex<Vec<BackendRequest>>,
}

impl ScriptedBackend {
    pub fn new(default: Reply) -> Self {
        Self { by_term: HashMap::new(), default, calls: Mutex::new(Vec::new()) }
    }

    pub fn on(mut self, term: &str, reply: Reply) -> Self {
        self.by_term.insert(term.to_string(), reply);
        self
    }

    pub fn calls(&self) -> Vec<BackendRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn term_of(request: &BackendRequest) -> Option<String> {
        request
            .filters
            .iter()
            .find(|f| f.operator == "ilike")
            .map(|f| f.value.trim_matches('%').to_string())
    }
}

#[async_trait]
impl AggregationBackend for ScriptedBackend {
    async fn execute_aggregation(&self, request: &BackendRequest) -> Result<Value, BackendError> {
        self.calls.lock().unwrap().push(request.clone());
        let reply = Self::term_of(request)
            .and_then(|term| self.by_term.get(&term))
            .unwrap_or(&self.default);
        match reply {
            Reply::Json(value) => Ok(value.clone()),
            Reply::Text(text) => Ok(Value::String(text.clone())),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}

pub fn engine(backend: Arc<ScriptedBackend>) -> Engine {
    engine_with(EngineConfig::default(), backend)
}

pub fn engine_with(config: EngineConfig, backend: Arc<ScriptedBackend>) -> Engine {
    Engine::new(config, ColumnCatalog::freight_default(), backend)
}
