//! Incoming clinical-trial record.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

/// One clinical trial's metadata as submitted by the caller.
///
/// Any subset of the schema's fields is acceptable; absent fields are
/// treated as missing and unrecognized fields are ignored. Values stay as
/// raw JSON scalars until feature assembly normalizes them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrialRecord {
    #[serde(flatten)]
    fields: HashMap<String, Value>,
}

impl TrialRecord {
    /// Look up a field, treating JSON null the same as an absent field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        match self.fields.get(field) {
            Some(Value::Null) | None => None,
            present => present,
        }
    }

    /// Number of fields present on the record (nulls included).
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_arbitrary_fields() {
        let record: TrialRecord = serde_json::from_value(json!({
            "enrollment": 100,
            "sponsor": "Acme",
            "unrecognized": "ignored",
        }))
        .unwrap();

        assert_eq!(record.get("enrollment"), Some(&json!(100)));
        assert_eq!(record.get("sponsor"), Some(&json!("Acme")));
        assert_eq!(record.get("study_type"), None);
    }

    #[test]
    fn test_null_is_missing() {
        let record: TrialRecord =
            serde_json::from_value(json!({ "sponsor": null })).unwrap();
        assert_eq!(record.get("sponsor"), None);
        assert_eq!(record.len(), 1);
    }
}
