use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Column, ColumnDataType};

/// Read-only registry of the queryable columns, keyed by column id.
///
/// Iteration order is insertion order, which keeps fuzzy resolution
/// deterministic: the first column that matches always wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Column>", into = "Vec<Column>")]
pub struct ColumnCatalog {
    columns: IndexMap<String, Column>,
}

impl From<Vec<Column>> for ColumnCatalog {
    fn from(columns: Vec<Column>) -> Self {
        Self::new(columns)
    }
}

impl From<ColumnCatalog> for Vec<Column> {
    fn from(catalog: ColumnCatalog) -> Self {
        catalog.columns.into_values().collect()
    }
}

impl ColumnCatalog {
    /// Build a catalog from a list of columns. A later column with an id
    /// already present replaces the earlier one in place.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut map = IndexMap::new();
        for column in columns {
            map.insert(column.id.clone(), column);
        }
        Self { columns: map }
    }

    pub fn get(&self, id: &str) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Case-insensitive lookup on the column id.
    pub fn get_ignore_case(&self, id: &str) -> Option<&Column> {
        self.columns.get(id).or_else(|| {
            self.columns.values().find(|c| c.id.eq_ignore_ascii_case(id))
        })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.columns.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.values()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn ids(&self) -> Vec<String> {
        self.columns.keys().cloned().collect()
    }

    /// The catalog as seen by a caller. Restricted columns are removed unless
    /// the caller may see them, so the resolver never binds to a column the
    /// caller is not allowed to query.
    pub fn visible(&self, include_restricted: bool) -> ColumnCatalog {
        let columns = self.columns
            .iter()
            .filter(|(_, c)| include_restricted || !c.restricted)
            .map(|(k, c)| (k.clone(), c.clone()))
            .collect();
        ColumnCatalog { columns }
    }

    /// Parse a catalog from a JSON array of column objects.
    pub fn from_json_str(text: &str) -> Result<ColumnCatalog, serde_json::Error> {
        serde_json::from_str::<Vec<Column>>(text).map(ColumnCatalog::new)
    }

    /// Default freight schema: shipment-level fields followed by the
    /// item-level (line item) fields.
    pub fn freight_default() -> ColumnCatalog {
        use ColumnDataType::*;
        ColumnCatalog::new(vec![
            Column::new("shipment_id", "Shipment ID", "Shipment", String),
            Column::new("ship_date", "Ship Date", "Shipment", Date),
            Column::new("origin_state", "Origin State", "Location", String),
            Column::new("destination_state", "Destination State", "Location", String),
            Column::new("origin_city", "Origin City", "Location", String),
            Column::new("destination_city", "Destination City", "Location", String),
            Column::new("carrier_name", "Carrier", "Carrier", String),
            Column::new("mode", "Mode", "Carrier", String),
            Column::new("total_charge", "Total Cost", "Financial", Number),
            Column::new("weight", "Weight", "Shipment", Number),
            Column::new("miles", "Miles", "Shipment", Number),
            Column::new("margin", "Margin", "Financial", Number).restricted(),
            Column::new("customer_name", "Customer", "Customer", String).restricted(),
            Column::new("item_description", "Item Description", "Item", String),
            Column::new("item_class", "Freight Class", "Item", String),
            Column::new("item_quantity", "Item Quantity", "Item", Number),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order_and_replaces_duplicates() {
        let catalog = ColumnCatalog::new(vec![
            Column::new("b", "B", "x", ColumnDataType::String),
            Column::new("a", "A", "x", ColumnDataType::Number),
            Column::new("b", "B2", "x", ColumnDataType::String),
        ]);
        assert_eq!(catalog.ids(), vec!["b", "a"]);
        assert_eq!(catalog.get("b").unwrap().label, "B2");
    }

    #[test]
    fn visible_drops_restricted_columns() {
        let catalog = ColumnCatalog::freight_default();
        assert!(catalog.contains("margin"));

        let public = catalog.visible(false);
        assert!(!public.contains("margin"));
        assert!(!public.contains("customer_name"));
        assert_eq!(public.len(), catalog.len() - 2);

        let admin = catalog.visible(true);
        assert_eq!(admin, catalog);
    }

    #[test]
    fn lookup_ignores_case() {
        let catalog = ColumnCatalog::freight_default();
        assert_eq!(catalog.get_ignore_case("TOTAL_CHARGE").unwrap().id, "total_charge");
        assert!(catalog.get_ignore_case("nope").is_none());
    }

    #[test]
    fn parses_from_json_array() {
        let text = r#"[
            {"id": "lane", "label": "Lane", "category": "Location", "data_type": "string"},
            {"id": "cost", "label": "Cost", "category": "Financial", "data_type": "number", "restricted": true}
        ]"#;
        let catalog = ColumnCatalog::from_json_str(text).unwrap();
        assert_eq!(catalog.ids(), vec!["lane", "cost"]);
        assert!(catalog.get("cost").unwrap().restricted);
        assert!(!catalog.get("lane").unwrap().restricted);
    }
}
