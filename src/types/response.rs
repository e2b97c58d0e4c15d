//! Response bodies for the prediction API.

use serde::{Deserialize, Serialize};

/// Successful prediction: the binary match decision and the positive-class
/// probability backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(rename = "match")]
    pub matched: bool,
    pub probability: f64,
}

/// Per-request failure body, returned with HTTP 400.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_response_field_name() {
        let body = MatchResponse {
            matched: true,
            probability: 0.87,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["match"], true);
        assert_eq!(json["probability"], 0.87);
    }

    #[test]
    fn test_error_response_roundtrip() {
        let body = ErrorResponse::new("field 'enrollment' has non-numeric value 'N/A'");
        let json = serde_json::to_string(&body).unwrap();
        let parsed: ErrorResponse = serde_json::from_str(&json).unwrap();
        assert!(!parsed.error.is_empty());
    }
}
