use serde_json::Value;

use super::format_scalar;

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

/// The investor IRR for a simulation, the IRR for a metrics run, otherwise
/// the first field. An IRR that did not converge prints as `irr: <status>`
/// rather than falling back to another metric.
fn minimal_answer(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let irr = result
        .get("investor_metrics")
        .unwrap_or(result)
        .get("irr")
        .filter(|v| v.is_object());
    if let Some(irr) = irr {
        return match irr.get("annual").filter(|v| !v.is_null()) {
            Some(annual) => format_scalar(annual),
            None => format!(
                "irr: {}",
                irr.get("status").map(format_scalar).unwrap_or_else(|| "unknown".into())
            ),
        };
    }

    match result {
        Value::Array(items) => items
            .iter()
            .map(|item| item.get("name").map(format_scalar).unwrap_or_else(|| format_scalar(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Object(map) => map
            .iter()
            .next()
            .map(|(key, val)| format!("{key}: {}", format_scalar(val)))
            .unwrap_or_default(),
        _ => format_scalar(result),
    }
}
