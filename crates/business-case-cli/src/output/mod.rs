pub mod chart;
pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` payload of a computation envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Rows to show as a record table: the result itself when it is an array, or
/// its first array-of-objects field in `TABULAR_KEYS` order.
pub(crate) fn primary_rows(result: &Value) -> Option<&[Value]> {
    const TABULAR_KEYS: [&str; 4] = ["results", "initiatives", "yearly", "cash_flows"];

    match result {
        Value::Array(arr) => Some(arr.as_slice()),
        Value::Object(map) => TABULAR_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find_map(|v| v.as_array().filter(|a| is_record_array(a)))
            .map(|a| a.as_slice()),
        _ => None,
    }
}

pub(crate) fn is_record_array(arr: &[Value]) -> bool {
    !arr.is_empty() && arr.iter().all(Value::is_object)
}

/// Scalar fields of an object (arrays and nested objects left out).
pub(crate) fn scalar_fields(map: &Map<String, Value>) -> impl Iterator<Item = (&String, &Value)> {
    map.iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
}

pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_of_envelope() {
        let v = json!({"result": {"npv": "1"}, "warnings": []});
        assert_eq!(result_of(&v), &json!({"npv": "1"}));
        assert_eq!(result_of(&json!(3)), &json!(3));
    }

    #[test]
    fn test_primary_rows_prefers_sweep_results() {
        let v = json!({
            "yearly": [{"year": 0}],
            "results": [{"discount_rate_pct": "5"}, {"discount_rate_pct": "10"}]
        });
        assert_eq!(primary_rows(&v).map(|r| r.len()), Some(2));
        assert!(primary_rows(&json!({"npv": "1"})).is_none());
        assert!(primary_rows(&json!({"labels": ["a"]})).is_none());
    }
}
