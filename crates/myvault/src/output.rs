//! Record rendering
//!
//! Compact one-line form for stdout, masked JSON previews for delete
//! confirmation, and pretty JSON files for `read -o`.

use serde_json::Value;
use std::path::Path;

use crate::error::Result;
use crate::record::{Record, PROPERTY};
use crate::storage;

/// Secret-ish fields, in the order they are printed after the username
const SECRET_FIELDS: [&str; 6] = ["password", "secret", "apitoken", "token", "key", "apikey"];

/// Fields hidden in previews (compared case-insensitively)
const MASKED_FIELDS: [&str; 5] = ["password", "secret", "token", "key", "apitoken"];

const MASK: &str = "***MASKED***";

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        // null, booleans, numbers and nested values print as JSON
        other => other.to_string(),
    }
}

/// One record as ` | `-separated values: property, username, secrets,
/// then every other field alphabetically
pub fn compact_line(record: &Record) -> String {
    let mut parts = Vec::new();
    let mut push = |field: &str| {
        if let Some(value) = record.get(field) {
            parts.push(display_value(value));
        }
    };

    push(PROPERTY);
    push("username");
    for field in SECRET_FIELDS {
        push(field);
    }

    let mut rest: Vec<&str> = record
        .field_names()
        .filter(|name| *name != PROPERTY && *name != "username" && !SECRET_FIELDS.contains(name))
        .collect();
    rest.sort_unstable();
    for field in rest {
        push(field);
    }

    parts.join(" | ")
}

/// All records in compact form, one per line
pub fn render_compact(records: &[Record]) -> String {
    records
        .iter()
        .map(compact_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Copy of `record` with sensitive values replaced
pub fn mask(record: &Record) -> Record {
    let masked = record
        .fields()
        .iter()
        .map(|(key, value)| {
            let value = if MASKED_FIELDS.contains(&key.to_lowercase().as_str()) {
                Value::String(MASK.to_string())
            } else {
                value.clone()
            };
            (key.clone(), value)
        })
        .collect();
    Record::from_map(masked)
}

/// Masked, pretty-printed JSON for showing an entry before deletion
pub fn preview(record: &Record) -> String {
    format!("{:#}", Value::Object(mask(record).into_map()))
}

/// Write records as pretty JSON to an owner-only file
pub fn write_json(path: &Path, records: &[Record]) -> Result<()> {
    let content = serde_json::to_string_pretty(records)?;
    storage::write_private(path, content.as_bytes())?;
    tracing::info!("Results written to: {}", path.display());
    Ok(())
}
