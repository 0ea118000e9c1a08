use tracing::debug;

use crate::config::EngineConfig;

/// Picks the table a request runs against from the fields it references.
///
/// Any item-level field sends the request to the item table; everything else
/// stays on the shipment table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRouter {
    shipment_table: String,
    item_table: String,
    item_level_fields: Vec<String>,
}

impl TableRouter {
    pub fn new(shipment_table: &str, item_table: &str, item_level_fields: &[String]) -> Self {
        Self {
            shipment_table: shipment_table.to_string(),
            item_table: item_table.to_string(),
            item_level_fields: item_level_fields.to_vec(),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(&config.shipment_table, &config.item_table, &config.item_level_fields)
    }

    pub fn route<'f, I>(&self, fields: I) -> &str
    where
        I: IntoIterator<Item = &'f str>,
    {
        let item_field = fields
            .into_iter()
            .find(|f| self.item_level_fields.iter().any(|i| i == f));
        match item_field {
            Some(field) => {
                debug!(field, table = %self.item_table, "routing to item table");
                &self.item_table
            }
            None => &self.shipment_table,
        }
    }
}
