use std::{fs, path::Path, time::Duration};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{config::ConfigError, executor::ExecutionMode, parser::TermTable};

/// Engine configuration.
///
/// Every field has a default so a partial JSON file only needs to name what
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Table holding one record per shipment
    pub shipment_table: String,
    /// Table holding one record per shipment line item
    pub item_table: String,
    /// Column every request is date-filtered on
    pub date_field: String,
    /// Columns that only exist on the item table
    pub item_level_fields: Vec<String>,
    /// Column product terms are matched against
    pub product_field: String,
    /// Column counted when the metric has no numeric binding
    pub count_field: String,
    pub default_metric: String,
    /// Group-by hint used when the request names no dimension
    pub fallback_dimension: String,
    pub default_lookback_days: i64,
    pub default_limit: usize,
    /// Number of product terms at which requests fan out one per term
    pub fanout_threshold: usize,
    pub execution: ExecutionMode,
    /// Result cache lifetime; 0 disables caching
    pub cache_ttl_secs: u64,
    pub profile_results: bool,
    pub terms: TermTable,
    /// Extra resolver aliases (hint → column id) on top of the built-in table
    pub aliases: IndexMap<String, String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shipment_table: "shipments".to_string(),
            item_table: "shipment_items".to_string(),
            date_field: "ship_date".to_string(),
            item_level_fields: vec![
                "item_description".to_string(),
                "item_class".to_string(),
                "item_quantity".to_string(),
            ],
            product_field: "item_description".to_string(),
            count_field: "shipment_id".to_string(),
            default_metric: "cost".to_string(),
            fallback_dimension: "state".to_string(),
            default_lookback_days: 30,
            default_limit: 1000,
            fanout_threshold: 2,
            execution: ExecutionMode::Sequential,
            cache_ttl_secs: 300,
            profile_results: true,
            terms: TermTable::default(),
            aliases: IndexMap::new(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.execution = execution;
        self
    }

    pub fn with_terms(mut self, terms: TermTable) -> Self {
        self.terms = terms;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache_ttl_secs = 0;
        self
    }

    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.cache_ttl_secs > 0).then(|| Duration::from_secs(self.cache_ttl_secs))
    }

    pub fn is_item_level(&self, field: &str) -> bool {
        self.item_level_fields.iter().any(|f| f == field)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shipment_table.trim().is_empty() || self.item_table.trim().is_empty() {
            return Err(ConfigError::Invalid("table names must not be empty".into()));
        }
        if self.date_field.trim().is_empty() {
            return Err(ConfigError::Invalid("date_field must not be empty".into()));
        }
        if self.fanout_threshold == 0 {
            return Err(ConfigError::Invalid("fanout_threshold must be at least 1".into()));
        }
        if self.default_lookback_days <= 0 {
            return Err(ConfigError::Invalid("default_lookback_days must be positive".into()));
        }
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid("default_limit must be positive".into()));
        }
        if self.execution == ExecutionMode::Bounded(0) {
            return Err(ConfigError::Invalid("bounded execution needs at least one worker".into()));
        }
        Ok(())
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fanout_threshold, 2);
        assert_eq!(config.default_lookback_days, 30);
        assert!(config.is_item_level("item_description"));
        assert!(!config.is_item_level("carrier_name"));
        assert_eq!(config.cache_ttl(), Some(Duration::from_secs(300)));
        assert_eq!(config.clone().without_cache().cache_ttl(), None);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json_str(r#"{ "fanout_threshold": 3, "execution": { "bounded": 4 } }"#).unwrap();
        assert_eq!(config.fanout_threshold, 3);
        assert_eq!(config.execution, ExecutionMode::Bounded(4));
        assert_eq!(config.shipment_table, "shipments");
        assert!(!config.terms.entries.is_empty());
    }

    #[test]
    fn custom_terms_replace_the_default_table() {
        let config = EngineConfig::from_json_str(
            r#"{ "terms": [ { "term": "Pallet", "keywords": ["pallet", "pallets"] } ] }"#,
        )
        .unwrap();
        assert_eq!(config.terms.entries.len(), 1);
        assert_eq!(config.terms.entries[0].term, "Pallet");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(EngineConfig::from_json_str(r#"{ "fanout_threshold": 0 }"#), Err(ConfigError::Invalid(_))));
        assert!(matches!(EngineConfig::from_json_str(r#"{ "execution": { "bounded": 0 } }"#), Err(ConfigError::Invalid(_))));
        assert!(matches!(EngineConfig::from_json_str("{ nope"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "item_table": "lines", "profile_results": false }}"#).unwrap();
        let config = EngineConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.item_table, "lines");
        assert!(!config.profile_results);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EngineConfig::load_from_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
