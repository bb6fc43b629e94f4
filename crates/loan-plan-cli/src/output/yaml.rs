use serde::Serialize;
use std::fs;

/// Serialise `value` as YAML and replace the contents of `path` with it.
///
/// The document is fully rendered before the file is touched, so a
/// serialisation failure leaves the existing file intact.
pub fn write_yaml<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let contents = serde_yaml::to_string(value)
        .map_err(|e| format!("Failed to serialise '{}': {}", path, e))?;
    fs::write(path, contents).map_err(|e| format!("Failed to write '{}': {}", path, e))?;
    Ok(())
}
