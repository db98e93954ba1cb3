use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, format_scalar};

/// Print the result as titled tables: one for the scalar fields, one per
/// nested section and one per array of rows.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => print_result(result, map),
            None => print_key_values(value),
        },
        Value::Array(rows) => print_rows(rows),
        _ => println!("{}", format_scalar(value)),
    }
}

fn print_result(result: &Value, envelope: &Map<String, Value>) {
    let Value::Object(sections) = result else {
        println!("{}", format_scalar(result));
        return;
    };

    let scalars: Map<String, Value> = sections
        .iter()
        .filter(|(_, v)| !v.is_object() && !v.is_array())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    if !scalars.is_empty() {
        print_key_values(&Value::Object(scalars));
    }

    for (name, section) in sections {
        match section {
            Value::Object(_) => {
                print_title(name);
                print_key_values(section);
            }
            Value::Array(rows) => {
                print_title(name);
                print_rows(rows);
            }
            _ => {}
        }
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {w}");
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {meth}");
    }
}

fn print_title(name: &str) {
    println!("\n{}", name.replace('_', " ").to_uppercase().bold());
}

fn print_key_values(value: &Value) {
    let mut pairs = Vec::new();
    flatten("", value, &mut pairs);

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in pairs {
        builder.push_record([key, format_scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    if rows.is_empty() {
        println!("(empty)");
        return;
    }

    let Some(Value::Object(first)) = rows.first() else {
        for item in rows {
            println!("{}", format_scalar(item));
        }
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.iter().cloned());
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h).map(format_scalar).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
}
