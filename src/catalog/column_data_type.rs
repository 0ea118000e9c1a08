use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Coarse value type of a catalog column.
///
/// This is what the resolver and the request builder look at when they need
/// to know whether a field can be aggregated (`Number`) or only grouped on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnDataType {
    /// Free text or coded values
    String,
    /// Integer or floating point values
    Number,
    /// Calendar dates (ISO `YYYY-MM-DD`)
    Date,
    /// true / false
    Boolean,
}

impl ColumnDataType {
    /// Classify a serde_json `Value` into a column type.
    ///
    /// Returns `None` for null, arrays and objects since none of them can back
    /// a catalog column.
    pub fn of_value(v: &Value) -> Option<ColumnDataType> {
        match v {
            Value::Bool(_) => Some(ColumnDataType::Boolean),
            Value::Number(_) => Some(ColumnDataType::Number),
            Value::String(s) if looks_like_iso_date(s) => Some(ColumnDataType::Date),
            Value::String(_) => Some(ColumnDataType::String),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnDataType::Number)
    }

    pub fn is_groupable(&self) -> bool {
        !self.is_numeric()
    }
}

fn looks_like_iso_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s.get(..10).unwrap_or(s), "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_json_values() {
        assert_eq!(ColumnDataType::of_value(&json!(12.5)), Some(ColumnDataType::Number));
        assert_eq!(ColumnDataType::of_value(&json!("TX")), Some(ColumnDataType::String));
        assert_eq!(ColumnDataType::of_value(&json!("2025-03-01")), Some(ColumnDataType::Date));
        assert_eq!(ColumnDataType::of_value(&json!("2025-03-01T10:00:00Z")), Some(ColumnDataType::Date));
        assert_eq!(ColumnDataType::of_value(&json!(true)), Some(ColumnDataType::Boolean));
        assert_eq!(ColumnDataType::of_value(&json!(null)), None);
    }

    #[test]
    fn serializes_lowercase() {
        let s = serde_json::to_string(&ColumnDataType::Date).unwrap();
        assert_eq!(s, "\"date\"");
    }
}
