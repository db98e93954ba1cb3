use serde_json::Value;
use std::io::{self, Write};

use super::{flatten, format_scalar};

/// Write output as CSV to stdout.
///
/// A simulation result prints its monthly ledger (one row per month with a
/// header of the ledger field names); any other result prints `field,value`
/// pairs with nested fields in dotted form.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        log::error!("CSV output failed: {e}");
    }
}

fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let result = value.get("result").unwrap_or(value);

    match result {
        Value::Object(map) => match map.get("ledger") {
            Some(Value::Array(rows)) => write_rows(&mut wtr, rows)?,
            _ => {
                let mut pairs = Vec::new();
                flatten("", result, &mut pairs);
                wtr.write_record(["field", "value"])?;
                for (key, val) in pairs {
                    wtr.write_record([key, format_scalar(val)])?;
                }
            }
        },
        Value::Array(rows) => write_rows(&mut wtr, rows)?,
        _ => wtr.write_record([format_scalar(result)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) -> Result<(), csv::Error> {
    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(String::as_str).collect();
    wtr.write_record(&headers)?;
    for row in rows {
        if let Value::Object(map) = row {
            wtr.write_record(
                headers
                    .iter()
                    .map(|h| map.get(*h).map(format_scalar).unwrap_or_default()),
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_ledger_rows_keep_field_order() {
        let value = json!({
            "result": {
                "summary": { "net_capex": "1500000" },
                "ledger": [
                    { "month": 1, "phase": "Interest", "note": null },
                    { "month": 2, "phase": "Interest", "note": "principal repayment" }
                ]
            }
        });
        assert_eq!(
            render(&value),
            "month,phase,note\n1,Interest,\n2,Interest,principal repayment\n"
        );
    }

    #[test]
    fn test_metrics_as_field_value_pairs() {
        let value = json!({ "result": { "npv": "0", "irr": { "status": "not_converged" } } });
        assert_eq!(render(&value), "field,value\nnpv,0\nirr.status,not_converged\n");
    }
}
