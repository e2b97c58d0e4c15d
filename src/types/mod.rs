//! Type definitions for the trial match service

pub mod record;
pub mod response;

pub use record::TrialRecord;
pub use response::{ErrorResponse, MatchResponse};
