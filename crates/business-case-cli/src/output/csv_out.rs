use serde_json::Value;
use std::io;

use super::{format_scalar, primary_rows, result_of, scalar_fields};

/// Write output as CSV to stdout.
///
/// Record-shaped results (cash flow schedules, rate sweeps, yearly tables,
/// initiatives) become one row per record; anything else becomes
/// field/value pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
}

fn write_csv<W: io::Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    let result = result_of(value);

    if let Some(rows) = primary_rows(result) {
        write_records(wtr, rows)?;
    } else if let Value::Object(map) = result {
        wtr.write_record(["field", "value"])?;
        for (key, val) in scalar_fields(map) {
            wtr.write_record([key.as_str(), &format_scalar(val)])?;
        }
    } else {
        wtr.write_record([&format_scalar(result)])?;
    }

    wtr.flush()?;
    Ok(())
}

fn write_records<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = rows.first() else {
        return Ok(());
    };
    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;

    for row in rows {
        if let Value::Object(map) = row {
            let record: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            wtr.write_record(&record)?;
        }
    }
    Ok(())
}
