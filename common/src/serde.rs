use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::file_format::FileFormat;

pub type Result<T> = anyhow::Result<T>;

pub fn serialize<T: Serialize>(value: &T, format: FileFormat) -> Result<String> {
    let mut text = match format {
        FileFormat::Yaml => serde_yml::to_string(value)?,
        FileFormat::Json => serde_json::to_string_pretty(value)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }

    Ok(text)
}

pub fn deserialize<T: DeserializeOwned + 'static>(serialized: &str, format: FileFormat) -> Result<T> {
    match format {
        FileFormat::Yaml => Ok(serde_yml::from_str(serialized)?),
        FileFormat::Json => Ok(serde_json::from_str(serialized)?),
    }
}

/// Reads and deserializes a file, picking the format from its extension.
pub fn read_file<T: DeserializeOwned + 'static>(path: &Path) -> Result<T> {
    let format = FileFormat::from_file_name(path)?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    deserialize(&text, format).with_context(|| format!("Failed to parse {}", path.display()))
}
