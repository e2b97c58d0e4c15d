//! ML model inference components

pub mod classifier;
pub mod loader;

pub use classifier::{MatchClassifier, Prediction};
pub use loader::ModelLoader;
