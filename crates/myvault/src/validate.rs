//! Input validation
//!
//! Turns parsed JSON into records. A single object is accepted as a
//! one-element list. Records are returned untouched otherwise.

use serde_json::Value;
use std::collections::{BTreeSet, HashMap};

use crate::error::{Result, VaultError};
use crate::record::{Record, PROPERTY};

/// Validate raw JSON and normalize it to a list of records
pub fn validate(raw: Value) -> Result<Vec<Record>> {
    let items = match raw {
        Value::Object(map) => vec![Value::Object(map)],
        Value::Array(items) => items,
        _ => {
            return Err(VaultError::Validation(
                "JSON must be a list of objects or a single object".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        let Value::Object(map) = item else {
            return Err(VaultError::Validation(format!("Entry {} must be an object", i)));
        };

        match map.get(PROPERTY) {
            None => {
                return Err(VaultError::Validation(format!(
                    "Entry {} missing required field: {}",
                    i, PROPERTY
                )))
            }
            Some(Value::String(s)) if !s.trim().is_empty() => {}
            Some(_) => {
                return Err(VaultError::Validation(format!(
                    "Entry {} has empty property field",
                    i
                )))
            }
        }

        records.push(Record::from_map(map));
    }

    tracing::info!("Validated {} JSON entries", records.len());
    Ok(records)
}

/// What `validate` reports about an input file
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationSummary {
    /// Properties in input order
    pub properties: Vec<String>,
    /// Properties seen more than once (case-insensitive), reported once
    /// in the spelling of the first repeat
    pub duplicates: Vec<String>,
    /// Every field name used by any record, sorted
    pub fields: Vec<String>,
}

/// Summarize validated records
pub fn summarize(records: &[Record]) -> ValidationSummary {
    let properties: Vec<String> = records.iter().map(|r| r.property().to_string()).collect();

    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for property in &properties {
        let count = seen.entry(property.to_lowercase()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(property.clone());
        }
    }

    let fields: BTreeSet<&str> = records.iter().flat_map(Record::field_names).collect();

    ValidationSummary {
        properties,
        duplicates,
        fields: fields.into_iter().map(str::to_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_support::records;
    use serde_json::json;

    fn err(raw: Value) -> String {
        validate(raw).unwrap_err().to_string()
    }

    #[test]
    fn test_list_is_returned_unchanged() {
        let raw = json!([
            {"property": "test1", "username": "user1"},
            {"property": "test2", "password": "pass2", "nested": {"a": [1, 2]}}
        ]);
        let result = validate(raw.clone()).unwrap();
        assert_eq!(result, records(raw));
    }

    #[test]
    fn test_single_object_becomes_list() {
        let raw = json!({"property": "test1", "username": "user1"});
        let result = validate(raw.clone()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result, records(json!([raw])));
    }

    #[test]
    fn test_empty_list_is_valid() {
        assert!(validate(json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_rejects_non_collections() {
        assert_eq!(
            err(json!("not a list or dict")),
            "JSON must be a list of objects or a single object"
        );
        assert!(err(json!(42)).contains("list of objects"));
    }

    #[test]
    fn test_rejects_non_object_entries() {
        let raw = json!([{"property": "ok"}, "nope"]);
        assert_eq!(err(raw), "Entry 1 must be an object");
    }

    #[test]
    fn test_rejects_missing_property() {
        let raw = json!([{"username": "user1", "password": "pass1"}]);
        assert_eq!(err(raw), "Entry 0 missing required field: property");
    }

    #[test]
    fn test_rejects_empty_property() {
        assert_eq!(
            err(json!([{"property": "", "username": "user1"}])),
            "Entry 0 has empty property field"
        );
        assert_eq!(
            err(json!([{"property": "a"}, {"property": "   "}])),
            "Entry 1 has empty property field"
        );
        assert!(err(json!({"property": null})).contains("empty property"));
    }

    #[test]
    fn test_summary() {
        let recs = records(json!([
            {"property": "Web.com", "username": "a"},
            {"property": "api", "token": "t"},
            {"property": "web.COM", "password": "p"},
            {"property": "WEB.com"}
        ]));
        let summary = summarize(&recs);

        assert_eq!(summary.properties, vec!["Web.com", "api", "web.COM", "WEB.com"]);
        assert_eq!(summary.duplicates, vec!["web.COM"]);
        assert_eq!(
            summary.fields,
            vec!["password", "property", "token", "username"]
        );
    }
}
