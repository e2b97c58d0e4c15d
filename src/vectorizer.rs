//! Fitted TF-IDF vectorizer state, exported from training as JSON.
//!
//! The artifact carries the fitted vocabulary (term -> column index) and the
//! per-column idf weights. `transform` reproduces the training transform:
//! word tokens of length >= 2, term counts scaled by idf, L2-normalized.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid token pattern"));

fn default_lowercase() -> bool {
    true
}

/// Fitted TF-IDF transform. Immutable after load; `transform` takes `&self`
/// and is safe to share across request handlers.
#[derive(Debug, Deserialize)]
pub struct TfidfVectorizer {
    /// Term to column index within the text block.
    vocabulary: HashMap<String, usize>,
    /// idf weight per column, indexed by vocabulary value.
    idf: Vec<f32>,
    #[serde(default = "default_lowercase")]
    lowercase: bool,
}

impl TfidfVectorizer {
    /// Load the fitted vectorizer from a JSON artifact.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vectorizer artifact {:?}", path))?;
        let vectorizer: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse vectorizer artifact {:?}", path))?;

        if vectorizer.vocabulary.len() != vectorizer.idf.len() {
            anyhow::bail!(
                "Vectorizer artifact is inconsistent: {} vocabulary terms but {} idf weights",
                vectorizer.vocabulary.len(),
                vectorizer.idf.len()
            );
        }
        if let Some((term, &index)) = vectorizer
            .vocabulary
            .iter()
            .find(|(_, &index)| index >= vectorizer.idf.len())
        {
            anyhow::bail!(
                "Vectorizer artifact is inconsistent: term '{}' maps to column {} of {}",
                term,
                index,
                vectorizer.idf.len()
            );
        }

        info!(
            path = %path.display(),
            vocabulary = vectorizer.vocabulary.len(),
            "TF-IDF vectorizer loaded"
        );
        Ok(vectorizer)
    }

    /// Width of the text block in the assembled feature vector.
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Transform one document into sparse (column, weight) pairs, sorted by
    /// column. Terms outside the fitted vocabulary are ignored.
    pub fn transform(&self, text: &str) -> Vec<(usize, f32)> {
        let lowered;
        let document = if self.lowercase {
            lowered = text.to_lowercase();
            lowered.as_str()
        } else {
            text
        };

        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in TOKEN_PATTERN.find_iter(document) {
            if let Some(&index) = self.vocabulary.get(token.as_str()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for entry in &mut entries {
                entry.1 /= norm;
            }
        }

        entries.sort_unstable_by_key(|&(index, _)| index);
        entries
    }

    #[cfg(test)]
    pub fn from_parts(vocabulary: HashMap<String, usize>, idf: Vec<f32>) -> Self {
        Self {
            vocabulary,
            idf,
            lowercase: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_vectorizer() -> TfidfVectorizer {
        let vocabulary = HashMap::from([
            ("cancer".to_string(), 0),
            ("trial".to_string(), 1),
            ("randomized".to_string(), 2),
        ]);
        TfidfVectorizer::from_parts(vocabulary, vec![1.0, 2.0, 1.5])
    }

    #[test]
    fn test_transform_counts_and_normalizes() {
        let vectorizer = sample_vectorizer();
        let entries = vectorizer.transform("Cancer trial trial");

        // tf*idf before normalization: cancer = 1.0, trial = 4.0
        let norm = (1.0f32 + 16.0).sqrt();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, 0);
        assert!((entries[0].1 - 1.0 / norm).abs() < 1e-6);
        assert_eq!(entries[1].0, 1);
        assert!((entries[1].1 - 4.0 / norm).abs() < 1e-6);
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let vectorizer = sample_vectorizer();
        let entries = vectorizer.transform("completely unrelated words");
        assert!(entries.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let vectorizer = sample_vectorizer();
        assert!(vectorizer.transform("").is_empty());
    }

    #[test]
    fn test_short_tokens_skipped() {
        // Single-character tokens are outside the token pattern.
        let vocabulary = HashMap::from([("a".to_string(), 0)]);
        let vectorizer = TfidfVectorizer::from_parts(vocabulary, vec![1.0]);
        assert!(vectorizer.transform("a a a").is_empty());
    }

    #[test]
    fn test_load_rejects_inconsistent_artifact() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"vocabulary": {{"cancer": 5}}, "idf": [1.0]}}"#
        )
        .unwrap();

        let result = TfidfVectorizer::load(file.path());
        assert!(result.is_err());
    }
}
