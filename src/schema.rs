//! Training-time feature schema.
//!
//! These column lists must match the preprocessing used when the model was
//! trained. The one-hot expansion of the categorical columns is not listed
//! here; it is loaded from the stored column-list artifact, which is
//! authoritative for both naming and order.

/// Numeric feature columns, in training order. Boolean-like flags are
/// encoded as 0/1.
pub const NUMERIC_COLS: [&str; 22] = [
    "enrollment",
    "study_duration_days",
    "sex_all",
    "sex_female",
    "sex_male",
    "has_child",
    "has_adult",
    "has_older_adult",
    "phase1",
    "phase2",
    "phase3",
    "funder_fed",
    "funder_indiv",
    "funder_industry",
    "funder_network",
    "funder_nih",
    "funder_other",
    "funder_other_gov",
    "funder_unknown",
    "missing_start_date",
    "missing_primary_completion_date",
    "missing_completion_date",
];

/// Categorical columns that were dummy-encoded at training time.
pub const CAT_COLS: [&str; 3] = ["sponsor", "study_type", "study_design"];

/// Free-text columns, concatenated in this order before TF-IDF.
pub const TEXT_COLS: [&str; 7] = [
    "study_title",
    "brief_summary",
    "conditions",
    "interventions",
    "primary_outcome_measures",
    "secondary_outcome_measures",
    "locations",
];
