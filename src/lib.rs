pub mod catalog;
pub use catalog::{Column, ColumnCatalog, ColumnDataType};

pub mod parser;
pub use parser::{IntentParser, ParsedQuery, TermTable, Vocabulary};

pub mod resolver;
pub use resolver::{AliasTable, ColumnResolver};

pub mod config;
pub use config::{ConfigError, EngineConfig};

pub mod planner;

pub mod aggregators;

pub mod executor;
pub use executor::{AggregationBackend, BackendError, BackendRequest, ExecutionMode, MemoryCache, ResultCache, Scope};

pub mod profiler;
pub use profiler::{DataProfile, DataProfiler};

pub mod engine;
pub use engine::{AnalysisRequest, AnalysisResponse, Engine, EngineError, Outcome};
