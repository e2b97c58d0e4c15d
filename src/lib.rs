//! Trial Match Prediction Service
//!
//! A thin HTTP wrapper around a pre-trained clinical-trial match classifier:
//! load the fitted TF-IDF vectorizer, the ONNX classifier, and the training
//! one-hot column list at startup, rebuild the training-time feature space
//! per request, and serve the model's prediction.

pub mod config;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod server;
pub mod types;
pub mod vectorizer;

pub use config::AppConfig;
pub use error::InputError;
pub use features::FeatureAssembler;
pub use metrics::ServiceMetrics;
pub use models::MatchClassifier;
pub use types::{MatchResponse, TrialRecord};
pub use vectorizer::TfidfVectorizer;
