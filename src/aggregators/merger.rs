use std::collections::BTreeSet;

use indexmap::IndexMap;
use serde::{ser::SerializeMap, Deserialize, Serialize, Serializer};

use crate::{
    aggregators::{AccumulatorRegistry, AggregationFn, CellAccumulator},
    executor::AggregationRow,
};

/// Label used when a two-field row arrives without its secondary value.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Key holding the primary group in a flattened chart row.
pub const PRIMARY_GROUP_KEY: &str = "primaryGroup";

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// One chart row: the primary group plus one value per secondary group that
/// had data. Missing secondary groups are absent, never zero.
///
/// Serializes flat: `{"primaryGroup": "Drawer System", "CA": 12.5, "TX": 9.1}`.
/// A secondary group named like the primary key is left out of the flat form.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedChartRow {
    pub primary_group: String,
    pub values: IndexMap<String, f64>,
}

impl GroupedChartRow {
    pub fn get(&self, secondary: &str) -> Option<f64> {
        self.values.get(secondary).copied()
    }
}

impl Serialize for GroupedChartRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values: Vec<_> = self.values.iter().filter(|(k, _)| k.as_str() != PRIMARY_GROUP_KEY).collect();
        let mut map = serializer.serialize_map(Some(values.len() + 1))?;
        map.serialize_entry(PRIMARY_GROUP_KEY, &self.primary_group)?;
        for (secondary, value) in values {
            map.serialize_entry(secondary, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelValue {
    pub label: String,
    pub value: f64,
}

impl LabelValue {
    pub fn new(label: &str, value: f64) -> Self {
        Self { label: label.to_string(), value }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiDimensionResult {
    pub rows: Vec<GroupedChartRow>,
    /// Every secondary group seen, sorted ascending; the column set of `rows`
    pub secondary_groups: Vec<String>,
}

impl MultiDimensionResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

type Cells = IndexMap<String, IndexMap<String, Box<dyn CellAccumulator>>>;

/// Reduces partial aggregation rows into chart output.
///
/// Every cell combines its partials with the rule registered for the
/// aggregation function, so averages are always re-weighted by support.
#[derive(Debug, Clone)]
pub struct MultiDimensionMerger {
    aggregation: AggregationFn,
    registry: AccumulatorRegistry,
}

impl MultiDimensionMerger {
    pub fn new(aggregation: AggregationFn) -> Self {
        Self::with_registry(aggregation, AccumulatorRegistry::default_registry())
    }

    pub fn with_registry(aggregation: AggregationFn, registry: AccumulatorRegistry) -> Self {
        Self { aggregation, registry }
    }

    pub fn aggregation(&self) -> AggregationFn {
        self.aggregation
    }

    fn feed(&self, cells: &mut Cells, primary: &str, secondary: &str, row: &AggregationRow) {
        cells
            .entry(primary.to_string())
            .or_default()
            .entry(secondary.to_string())
            .or_insert_with(|| self.registry.create(self.aggregation))
            .update(row);
    }

    fn finish(cells: Cells) -> MultiDimensionResult {
        let secondary_groups: Vec<String> = cells
            .values()
            .flat_map(|by_secondary| by_secondary.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = cells
            .into_iter()
            .filter(|(_, by_secondary)| !by_secondary.is_empty())
            .map(|(primary_group, by_secondary)| {
                let values = secondary_groups
                    .iter()
                    .filter_map(|s| by_secondary.get(s).map(|cell| (s.clone(), round2(cell.finalize()))))
                    .collect();
                GroupedChartRow { primary_group, values }
            })
            .collect();

        MultiDimensionResult { rows, secondary_groups }
    }

    /// Merge fanned-out results: each key is a primary group (a term) and the
    /// `group_value` of its rows is the secondary group. Terms without rows
    /// produce no output row.
    pub fn merge(&self, per_term: &IndexMap<String, Vec<AggregationRow>>) -> MultiDimensionResult {
        let mut cells: Cells = IndexMap::new();
        for (term, rows) in per_term {
            for row in rows {
                self.feed(&mut cells, term, &row.group_value, row);
            }
        }
        Self::finish(cells)
    }

    /// Merge the rows of one request grouped by two fields.
    pub fn merge_rows(&self, rows: &[AggregationRow]) -> MultiDimensionResult {
        let mut cells: Cells = IndexMap::new();
        for row in rows {
            let secondary = row.secondary_group_value.as_deref().unwrap_or(UNKNOWN_GROUP);
            self.feed(&mut cells, &row.group_value, secondary, row);
        }
        Self::finish(cells)
    }

    /// One value per term, across all of the term's rows.
    pub fn collapse(&self, per_term: &IndexMap<String, Vec<AggregationRow>>) -> Vec<LabelValue> {
        per_term
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(term, rows)| {
                let mut cell = self.registry.create(self.aggregation);
                for row in rows {
                    cell.update(row);
                }
                LabelValue::new(term, round2(cell.finalize()))
            })
            .collect()
    }

    /// Flat label/value output for a single grouping, largest value first.
    /// Rows sharing a label are combined with the same cell rule.
    pub fn single_dimension(&self, rows: &[AggregationRow]) -> Vec<LabelValue> {
        let mut cells: IndexMap<String, Box<dyn CellAccumulator>> = IndexMap::new();
        for row in rows {
            cells
                .entry(row.group_value.clone())
                .or_insert_with(|| self.registry.create(self.aggregation))
                .update(row);
        }

        let mut out: Vec<LabelValue> = cells
            .into_iter()
            .map(|(label, cell)| LabelValue { label, value: round2(cell.finalize()) })
            .collect();
        out.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
        out
    }
}
