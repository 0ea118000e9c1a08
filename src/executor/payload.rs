use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    aggregators::{AggregationFn, UNKNOWN_GROUP},
    executor::{AggregationRow, ExecutorError},
};

/// Turns a raw backend payload into typed rows.
///
/// Accepts the payload as a JSON value or as a string holding encoded JSON.
/// An `error` field fails the request even when transport succeeded. Rows
/// whose `value` is not numeric are skipped. A missing `count` means one
/// record, except under `count` where the value itself is the record count.
pub fn normalize_payload(payload: Value, aggregation: AggregationFn) -> Result<Vec<AggregationRow>, ExecutorError> {
    let payload = match payload {
        Value::String(text) => serde_json::from_str::<Value>(&text)
            .map_err(|e| ExecutorError::Malformed(format!("payload string is not JSON: {e}")))?,
        other => other,
    };

    let object = match payload {
        Value::Object(object) => object,
        other => return Err(ExecutorError::Malformed(format!("expected an object, got {}", kind_of(&other)))),
    };

    if let Some(error) = object.get("error").filter(|e| !e.is_null()) {
        let message = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ExecutorError::Embedded(message));
    }

    let data = match object.get("data") {
        Some(Value::Array(items)) => items,
        Some(other) => return Err(ExecutorError::Malformed(format!("`data` must be an array, got {}", kind_of(other)))),
        None => return Err(ExecutorError::Malformed("missing `data`".to_string())),
    };

    let mut rows = Vec::with_capacity(data.len());
    for (idx, item) in data.iter().enumerate() {
        let Value::Object(fields) = item else {
            debug!(idx, "skipping non-object row");
            continue;
        };
        match parse_row(fields, aggregation) {
            Some(row) => rows.push(row),
            None => debug!(idx, "skipping row without a numeric value"),
        }
    }
    Ok(rows)
}

fn parse_row(fields: &Map<String, Value>, aggregation: AggregationFn) -> Option<AggregationRow> {
    let value = number(fields.get("value")?)?;
    let support_count = match fields.get("count") {
        None | Some(Value::Null) if aggregation == AggregationFn::Count => record_count(value)?,
        None | Some(Value::Null) => 1,
        Some(count) => record_count(number(count)?)?,
    };
    Some(AggregationRow {
        group_value: label(fields.get("group")).unwrap_or_else(|| UNKNOWN_GROUP.to_string()),
        secondary_group_value: label(fields.get("secondary_group")),
        value,
        support_count,
    })
}

fn record_count(count: f64) -> Option<u64> {
    (count >= 0.0).then(|| count.round() as u64)
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

fn label(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(payload: Value) -> Result<Vec<AggregationRow>, ExecutorError> {
        normalize_payload(payload, AggregationFn::Sum)
    }

    #[test]
    fn object_payload() {
        let rows = normalize(json!({
            "data": [
                { "group": "TX", "value": 12.5, "count": 4 },
                { "group": "CA", "secondary_group": "LTL", "value": 3, "count": 1 }
            ]
        }))
        .unwrap();
        assert_eq!(rows, vec![
            AggregationRow::new("TX", 12.5, 4),
            AggregationRow::new("CA", 3.0, 1).with_secondary("LTL"),
        ]);
    }

    #[test]
    fn string_payload_is_decoded() {
        let payload = Value::String(r#"{"data":[{"group":"GA","value":"7.25","count":"2"}]}"#.to_string());
        let rows = normalize(payload).unwrap();
        assert_eq!(rows, vec![AggregationRow::new("GA", 7.25, 2)]);
    }

    #[test]
    fn embedded_error_fails_the_request() {
        let err = normalize(json!({ "error": "relation does not exist" })).unwrap_err();
        assert_eq!(err, ExecutorError::Embedded("relation does not exist".into()));

        let err = normalize(Value::String(r#"{"error":{"code":42}}"#.into())).unwrap_err();
        assert_eq!(err, ExecutorError::Embedded(r#"{"code":42}"#.into()));
    }

    #[test]
    fn null_error_is_ignored() {
        let rows = normalize(json!({ "error": null, "data": [] })).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn malformed_shapes() {
        assert!(matches!(normalize(Value::String("not json".into())), Err(ExecutorError::Malformed(_))));
        assert!(matches!(normalize(json!([1, 2])), Err(ExecutorError::Malformed(_))));
        assert!(matches!(normalize(json!({ "rows": [] })), Err(ExecutorError::Malformed(_))));
        assert!(matches!(normalize(json!({ "data": "x" })), Err(ExecutorError::Malformed(_))));
    }

    #[test]
    fn bad_rows_are_skipped_and_count_defaults_to_one() {
        let rows = normalize(json!({
            "data": [
                { "group": "TX", "value": "n/a" },
                { "group": "CA", "value": 5 },
                { "group": null, "value": 1, "count": 3 },
                { "group": 2024, "value": 2, "count": -1 },
                "junk"
            ]
        }))
        .unwrap();
        assert_eq!(rows, vec![AggregationRow::new("CA", 5.0, 1), AggregationRow::new(UNKNOWN_GROUP, 1.0, 3)]);
    }

    #[test]
    fn count_without_count_field_takes_the_value() {
        let payload = json!({ "data": [{ "group": "UPS", "value": 12 }, { "group": "FedEx", "value": 3, "count": 3 }] });
        let rows = normalize_payload(payload.clone(), AggregationFn::Count).unwrap();
        assert_eq!(rows, vec![AggregationRow::new("UPS", 12.0, 12), AggregationRow::new("FedEx", 3.0, 3)]);

        let rows = normalize(payload).unwrap();
        assert_eq!(rows[0].support_count, 1);
    }
}
