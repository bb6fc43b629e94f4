use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Attempt to read a YAML or JSON document from stdin if data is being piped.
/// Returns None if stdin is a TTY (interactive) or empty.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // JSON documents are valid YAML.
    let value: T = serde_yaml::from_str(trimmed)
        .map_err(|e| format!("Failed to parse stdin: {}", e))?;
    Ok(Some(value))
}
