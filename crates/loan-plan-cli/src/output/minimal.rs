use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for the plan summary (directly under `result`, or nested under
/// `result.summary`) and prints the first well-known field it carries.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let summary = result_obj
        .as_object()
        .and_then(|m| m.get("summary"))
        .unwrap_or(result_obj);

    // Priority list of key output fields
    let priority_keys = ["last_phase_amount", "end_date", "duration", "interest"];

    if let Value::Object(map) = summary {
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(summary));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
