//! Feature assembly for trial match model inference.
//!
//! Rebuilds the exact feature space used during training from one raw
//! record: the numeric block, the one-hot categorical block aligned to the
//! stored column list, and the TF-IDF text block, concatenated in that
//! order. Column count and order never vary with the input shape.

use crate::error::InputError;
use crate::schema::{CAT_COLS, NUMERIC_COLS, TEXT_COLS};
use crate::types::TrialRecord;
use crate::vectorizer::TfidfVectorizer;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// Load the ordered one-hot column list produced at training time.
///
/// The stored list is authoritative for dummy-column naming and order;
/// alignment never re-derives it.
pub fn load_onehot_columns<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read one-hot column list {:?}", path))?;
    let columns: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse one-hot column list {:?}", path))?;

    if columns.is_empty() {
        anyhow::bail!("One-hot column list {:?} is empty", path);
    }

    info!(path = %path.display(), columns = columns.len(), "One-hot column list loaded");
    Ok(columns)
}

/// Assembles model input vectors matching the training-time schema.
///
/// Holds the loaded encoder state read-only for the process lifetime.
pub struct FeatureAssembler {
    onehot_columns: Vec<String>,
    vectorizer: TfidfVectorizer,
}

impl FeatureAssembler {
    pub fn new(onehot_columns: Vec<String>, vectorizer: TfidfVectorizer) -> Self {
        Self {
            onehot_columns,
            vectorizer,
        }
    }

    /// Total width of the assembled feature vector.
    pub fn feature_count(&self) -> usize {
        NUMERIC_COLS.len() + self.onehot_columns.len() + self.vectorizer.vocabulary_size()
    }

    /// Build the dense feature vector for one record.
    ///
    /// Fails only on numeric fields that cannot be coerced; missing fields
    /// of any kind fall back to their training-time defaults.
    pub fn assemble(&self, record: &TrialRecord) -> Result<Vec<f32>, InputError> {
        let mut features = Vec::with_capacity(self.feature_count());

        for col in NUMERIC_COLS {
            features.push(numeric_value(record, col)? as f32);
        }

        // Dummy-encode the categoricals as `{field}_{value}` and align to the
        // stored column list: unknown values contribute nothing, expected
        // columns absent from the encoding become zeros.
        let observed: Vec<String> = CAT_COLS
            .iter()
            .map(|col| format!("{}_{}", col, categorical_value(record, col)))
            .collect();
        for col in &self.onehot_columns {
            let hit = observed.iter().any(|o| o == col);
            features.push(if hit { 1.0 } else { 0.0 });
        }

        let combined = TEXT_COLS
            .iter()
            .map(|col| text_value(record, col))
            .collect::<Vec<_>>()
            .join(" ");
        let offset = features.len();
        features.resize(offset + self.vectorizer.vocabulary_size(), 0.0);
        for (index, weight) in self.vectorizer.transform(&combined) {
            features[offset + index] = weight;
        }

        Ok(features)
    }
}

/// Total normalization of one numeric field.
///
/// Absent -> 0. Booleans and the boolean-like strings `true/1/yes/on` and
/// `false/0/no/off` (case-insensitive, trimmed) -> 1/0. Numbers and numeric
/// strings pass through. Anything else is rejected before assembly.
fn numeric_value(record: &TrialRecord, field: &str) -> Result<f64, InputError> {
    match record.get(field) {
        None => Ok(0.0),
        Some(Value::Bool(flag)) => Ok(if *flag { 1.0 } else { 0.0 }),
        Some(Value::Number(number)) => {
            number.as_f64().ok_or_else(|| InputError::InvalidNumeric {
                field: field.to_string(),
                value: number.to_string(),
            })
        }
        Some(Value::String(raw)) => normalize_numeric_string(field, raw),
        Some(_) => Err(InputError::UnsupportedType {
            field: field.to_string(),
        }),
    }
}

fn normalize_numeric_string(field: &str, raw: &str) -> Result<f64, InputError> {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(1.0),
        "false" | "0" | "no" | "off" => Ok(0.0),
        _ => trimmed
            .parse::<f64>()
            .map_err(|_| InputError::InvalidNumeric {
                field: field.to_string(),
                value: raw.to_string(),
            }),
    }
}

fn categorical_value(record: &TrialRecord, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => "Unknown".to_string(),
    }
}

fn text_value(record: &TrialRecord, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(value)) => value.clone(),
        Some(Value::Number(value)) => value.to_string(),
        Some(Value::Bool(value)) => value.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn record(value: serde_json::Value) -> TrialRecord {
        serde_json::from_value(value).unwrap()
    }

    fn sample_assembler() -> FeatureAssembler {
        let vocabulary = HashMap::from([
            ("cancer".to_string(), 0),
            ("randomized".to_string(), 1),
        ]);
        let vectorizer = TfidfVectorizer::from_parts(vocabulary, vec![1.0, 1.0]);
        let onehot_columns = vec![
            "sponsor_Acme".to_string(),
            "sponsor_Globex".to_string(),
            "study_type_Interventional".to_string(),
            "study_type_Observational".to_string(),
            "study_design_Randomized".to_string(),
        ];
        FeatureAssembler::new(onehot_columns, vectorizer)
    }

    #[test]
    fn test_feature_count_is_fixed() {
        let assembler = sample_assembler();
        assert_eq!(assembler.feature_count(), 22 + 5 + 2);

        let empty = assembler.assemble(&record(json!({}))).unwrap();
        let full = assembler
            .assemble(&record(json!({
                "enrollment": 100,
                "sponsor": "Acme",
                "study_title": "Randomized cancer trial",
            })))
            .unwrap();
        assert_eq!(empty.len(), assembler.feature_count());
        assert_eq!(full.len(), assembler.feature_count());
    }

    #[test]
    fn test_missing_numerics_equal_explicit_zeros() {
        let assembler = sample_assembler();
        let omitted = assembler.assemble(&record(json!({}))).unwrap();

        let mut explicit = serde_json::Map::new();
        for col in NUMERIC_COLS {
            explicit.insert(col.to_string(), json!(0));
        }
        let explicit = assembler
            .assemble(&record(serde_json::Value::Object(explicit)))
            .unwrap();

        assert_eq!(omitted, explicit);
    }

    #[test]
    fn test_boolean_like_normalization() {
        let assembler = sample_assembler();
        let features = assembler
            .assemble(&record(json!({
                "sex_all": "Yes",
                "sex_female": "OFF",
                "has_child": true,
                "phase1": " 1 ",
                "phase2": "0",
            })))
            .unwrap();

        assert_eq!(features[2], 1.0); // sex_all
        assert_eq!(features[3], 0.0); // sex_female
        assert_eq!(features[5], 1.0); // has_child
        assert_eq!(features[8], 1.0); // phase1
        assert_eq!(features[9], 0.0); // phase2
    }

    #[test]
    fn test_numeric_strings_pass_through() {
        let assembler = sample_assembler();
        let features = assembler
            .assemble(&record(json!({ "enrollment": "100", "study_duration_days": 365.5 })))
            .unwrap();
        assert_eq!(features[0], 100.0);
        assert_eq!(features[1], 365.5);
    }

    #[test]
    fn test_non_numeric_string_rejected() {
        let assembler = sample_assembler();
        let err = assembler
            .assemble(&record(json!({ "enrollment": "N/A" })))
            .unwrap_err();
        assert!(matches!(err, InputError::InvalidNumeric { .. }));
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_onehot_alignment() {
        let assembler = sample_assembler();
        let features = assembler
            .assemble(&record(json!({
                "sponsor": "Acme",
                "study_type": "Observational",
            })))
            .unwrap();

        // Block order follows the stored column list; study_design defaults
        // to "Unknown", which was never seen at training time.
        assert_eq!(&features[22..27], &[1.0, 0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_unknown_categorical_value_yields_zero_block() {
        let assembler = sample_assembler();
        let features = assembler
            .assemble(&record(json!({
                "sponsor": "Never Seen Before Inc",
                "study_type": "Expanded Access",
                "study_design": "Single Group",
            })))
            .unwrap();
        assert_eq!(&features[22..27], &[0.0; 5]);
    }

    #[test]
    fn test_text_block_from_combined_fields() {
        let assembler = sample_assembler();
        let features = assembler
            .assemble(&record(json!({
                "study_title": "Randomized trial",
                "conditions": "cancer",
            })))
            .unwrap();

        let text = &features[27..29];
        assert!(text[0] > 0.0); // cancer
        assert!(text[1] > 0.0); // randomized
        let norm: f32 = text.iter().map(|w| w * w).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let assembler = sample_assembler();
        let input = record(json!({
            "enrollment": 42,
            "sponsor": "Acme",
            "brief_summary": "a randomized cancer study",
        }));
        assert_eq!(
            assembler.assemble(&input).unwrap(),
            assembler.assemble(&input).unwrap()
        );
    }
}
