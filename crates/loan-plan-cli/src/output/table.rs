use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// A full plan prints the installment schedule, then early repayments and the
/// summary; a bare summary prints as a field/value table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(value);
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result.get("repayments") {
        Some(Value::Array(repayments)) => {
            print_array_table(repayments);

            if let Some(Value::Array(early)) = result.get("early_repayments") {
                if !early.is_empty() {
                    println!("\nEarly repayments:");
                    print_array_table(early);
                }
            }

            if let Some(summary) = result.get("summary") {
                println!("\nSummary:");
                print_flat_object(summary);
            }
        }
        _ => print_flat_object(result),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::Object(sanity)) = envelope.get("sanity") {
        let healthy = sanity.get("healthy").and_then(Value::as_bool).unwrap_or(false);
        println!("\nSanity: {}", if healthy { "OK" } else { "KO" });
        if let Some(Value::Array(findings)) = sanity.get("findings") {
            for f in findings {
                if let Some(Value::String(message)) = f.get("message") {
                    println!("  - {}", message);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_flat_object(value: &Value) {
    if let Value::Object(map) = value {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in map {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        let table = Table::from(builder);
        println!("{}", table);
    } else {
        println!("{}", format_value(value));
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        let table = Table::from(builder);
        println!("{}", table);
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
