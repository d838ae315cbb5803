use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, is_record_array, result_of, scalar_fields};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into a Field/Value table; every array of records
/// in the result (yearly summary, customer table, sweep results...) gets its
/// own table underneath, headed by its field name.
pub fn print_table(value: &Value) {
    for block in render_blocks(value) {
        println!("{}", block);
    }
}

fn render_blocks(value: &Value) -> Vec<String> {
    let mut blocks = Vec::new();
    let result = result_of(value);

    match result {
        Value::Object(map) => {
            blocks.push(field_table(map));
            for (key, val) in map {
                if let Value::Array(arr) = val {
                    if is_record_array(arr) {
                        blocks.push(format!("\n{}:\n{}", key, record_table(arr)));
                    }
                }
            }
        }
        Value::Array(arr) if is_record_array(arr) => blocks.push(record_table(arr)),
        other => blocks.push(format_value(other)),
    }

    if let Some(envelope) = value.as_object() {
        if let Some(Value::Array(warnings)) = envelope.get("warnings") {
            if !warnings.is_empty() {
                let lines: Vec<String> = warnings
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|w| format!("  - {}", w))
                    .collect();
                blocks.push(format!("\nWarnings:\n{}", lines.join("\n")));
            }
        }
        if let Some(Value::String(meth)) = envelope.get("methodology") {
            blocks.push(format!("\nMethodology: {}", meth));
        }
    }

    blocks
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in scalar_fields(map) {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    // Plain arrays (cumulative NPV) and small objects (totals, payback) stay inline.
    for (key, val) in map {
        let inline = match val {
            Value::Array(arr) => !is_record_array(arr),
            Value::Object(_) => true,
            _ => false,
        };
        if inline {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
    }
    Table::from(builder).to_string()
}

fn record_table(arr: &[Value]) -> String {
    let headers: Vec<String> = match arr.first() {
        Some(Value::Object(first)) => first.keys().cloned().collect(),
        _ => return String::from("(empty)"),
    };

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }
    Table::from(builder).to_string()
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        other => format_scalar(other),
    }
}
