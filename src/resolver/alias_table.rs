use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Normalized field hint → canonical column id.
///
/// Keys are normalized with [`AliasTable::normalize`], so "Total Cost",
/// "total_cost" and "totalCost" all land on the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self::freight()
    }
}

impl AliasTable {
    pub fn empty() -> Self {
        Self { aliases: HashMap::new() }
    }

    /// Lower-cases and strips everything that is not a letter.
    pub fn normalize(hint: &str) -> String {
        hint.chars()
            .filter(|c| c.is_alphabetic())
            .flat_map(char::to_lowercase)
            .collect()
    }

    pub fn insert(&mut self, hint: &str, column_id: &str) {
        let key = Self::normalize(hint);
        if !key.is_empty() {
            self.aliases.insert(key, column_id.to_string());
        }
    }

    pub fn with(mut self, column_id: &str, hints: &[&str]) -> Self {
        for hint in hints {
            self.insert(hint, column_id);
        }
        self
    }

    pub fn get(&self, hint: &str) -> Option<&str> {
        self.aliases.get(&Self::normalize(hint)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    pub fn freight() -> Self {
        Self::empty()
            .with("total_charge", &["cost", "costs", "totalcost", "total charge", "spend", "charge", "charges", "freightcost", "amount", "price"])
            .with("destination_state", &["state", "states", "deststate", "destination", "destinationstate", "consigneestate", "deliverystate"])
            .with("origin_state", &["origin", "originstate", "shipperstate", "pickupstate", "fromstate"])
            .with("destination_city", &["city", "destcity", "destinationcity"])
            .with("origin_city", &["origincity", "shippercity"])
            .with("carrier_name", &["carrier", "carriers", "carriername", "scac"])
            .with("mode", &["mode", "transportmode", "servicetype", "shippingmode"])
            .with("item_description", &["product", "products", "item", "items", "description", "itemdescription", "sku", "category"])
            .with("item_class", &["class", "freightclass", "itemclass", "nmfc"])
            .with("item_quantity", &["quantity", "qty", "units", "itemquantity"])
            .with("shipment_id", &["shipments", "shipment", "shipmentcount", "volume", "loads", "count"])
            .with("ship_date", &["date", "shipdate", "month", "week", "day", "pickupdate"])
            .with("weight", &["weight", "pounds", "lbs", "tonnage"])
            .with("miles", &["miles", "mileage", "distance"])
            .with("customer_name", &["customer", "customers", "customername", "account"])
            .with("margin", &["margin", "profit"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_non_letters() {
        assert_eq!(AliasTable::normalize("Total_Cost ($)"), "totalcost");
        assert_eq!(AliasTable::normalize("dest-state 2"), "deststate");
        assert_eq!(AliasTable::normalize("  42 "), "");
    }

    #[test]
    fn lookup_goes_through_normalization() {
        let table = AliasTable::freight();
        assert_eq!(table.get("Total Cost"), Some("total_charge"));
        assert_eq!(table.get("dest_state"), Some("destination_state"));
        assert_eq!(table.get("SCAC"), Some("carrier_name"));
        assert_eq!(table.get("pallets"), None);
    }

    #[test]
    fn empty_hints_are_not_inserted() {
        let mut table = AliasTable::empty();
        table.insert("123", "x");
        assert!(table.is_empty());
    }
}
