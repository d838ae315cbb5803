use serde_json::Value;

use super::{format_scalar, result_of};

/// Headline fields, most important first.
const PRIORITY_KEYS: [&str; 6] = [
    "npv",
    "irr_pct",
    "irr",
    "payback_period",
    "first_non_positive_rate_pct",
    "quick_wins",
];

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority,
/// then fall back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = result_of(value);

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null values)
        if let Some(val) = PRIORITY_KEYS
            .iter()
            .filter_map(|k| map.get(*k))
            .find(|v| !v.is_null())
        {
            return format_scalar(val);
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    if let Value::Array(arr) = result_obj {
        return format!("{} rows", arr.len());
    }

    format_scalar(result_obj)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_npv_wins() {
        let v = json!({"result": {"payback_period": "2 years, 10 months", "npv": "231583.07"}});
        assert_eq!(minimal_line(&v), "231583.07");
    }

    #[test]
    fn test_fallback_to_first_field() {
        let v = json!({"result": {"labels": "x"}});
        assert_eq!(minimal_line(&v), "labels: x");
    }

    #[test]
    fn test_schedule_counts_rows() {
        let v = json!({"result": [{"month": 0}, {"month": 1}]});
        assert_eq!(minimal_line(&v), "2 rows");
    }
}
