//! Match classifier backed by an ONNX Runtime session

use crate::config::AppConfig;
use crate::models::loader::{LoadedModel, ModelLoader};
use anyhow::{Context, Result};
use ort::memory::Allocator;
use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType};
use std::sync::RwLock;
use tracing::debug;

/// Result of one classifier invocation
#[derive(Debug, Clone, Copy)]
pub struct Prediction {
    /// Binary match decision
    pub matched: bool,
    /// Positive-class probability (0.0 - 1.0)
    pub probability: f64,
}

/// Binary trial-match classifier.
///
/// The session is process-wide, immutable configuration; `run` needs
/// exclusive access, so the loaded model sits behind a `RwLock` and each
/// prediction takes the write guard.
pub struct MatchClassifier {
    model: RwLock<LoadedModel>,
}

impl MatchClassifier {
    /// Load the classifier described by the application configuration
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::from_file(&config.artifacts.model_path, config.artifacts.onnx_threads)
    }

    /// Load the classifier from an explicit path
    pub fn from_file(path: &str, onnx_threads: usize) -> Result<Self> {
        let loader = ModelLoader::with_threads(onnx_threads)?;
        let model = loader.load_model(path)?;
        Ok(Self {
            model: RwLock::new(model),
        })
    }

    /// Run inference on one assembled feature vector
    pub fn predict(&self, features: &[f32]) -> Result<Prediction> {
        let mut model = self
            .model
            .write()
            .map_err(|e| anyhow::anyhow!("Lock error: {}", e))?;
        self.run_model(&mut model, features)
    }

    fn run_model(&self, model: &mut LoadedModel, features: &[f32]) -> Result<Prediction> {
        use ort::value::Tensor;

        // Input tensor shape [1, num_features]
        let shape = vec![1_i64, features.len() as i64];
        let input_tensor = Tensor::from_array((shape, features.to_vec()))
            .context("Failed to create input tensor")?;

        let outputs = model
            .session
            .run(ort::inputs![&model.input_name => input_tensor])?;

        let probability = extract_positive_probability(&outputs, &model.output_name)?;
        let matched = extract_label(&outputs).unwrap_or(probability > 0.5);

        debug!(
            probability = probability,
            matched = matched,
            "Classifier inference complete"
        );

        Ok(Prediction {
            matched,
            probability,
        })
    }
}

/// Extract the predicted label from the model's label output, if present.
///
/// sklearn-style exports emit an int64 `output_label` tensor next to the
/// probability output; when it is absent the caller thresholds on the
/// probability instead.
fn extract_label(outputs: &ort::session::SessionOutputs) -> Option<bool> {
    for (name, output) in outputs.iter() {
        if !name.contains("label") {
            continue;
        }
        if let Ok((_, data)) = output.try_extract_tensor::<i64>() {
            return data.first().map(|&label| label != 0);
        }
    }
    None
}

/// Extract the positive-class probability from the model output.
/// Handles both tensor outputs and the seq(map) output of sklearn exports.
fn extract_positive_probability(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
) -> Result<f64> {
    // First, try the named probability output
    if let Some(output) = outputs.get(output_name) {
        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let prob = positive_prob_from_tensor(&shape, data);
            debug!(prob = prob, "Extracted from tensor");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = extract_from_sequence_map(output) {
                return Ok(prob);
            }
        }
    }

    // Fallback: iterate all outputs and try extraction
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        let dtype = output.dtype();

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let prob = positive_prob_from_tensor(&shape, data);
            debug!(output = %name, prob = prob, "Extracted from tensor (fallback)");
            return Ok(prob);
        }

        if DynSequenceValueType::can_downcast(&dtype) {
            if let Ok(prob) = extract_from_sequence_map(&output) {
                return Ok(prob);
            }
        }
    }

    anyhow::bail!("No probability output found in classifier result")
}

/// Extract probability from seq(map(int64, float)) format.
/// This is the ZipMap output shape of sklearn ONNX exports.
fn extract_from_sequence_map(output: &ort::value::DynValue) -> Result<f64> {
    let allocator = Allocator::default();

    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| anyhow::anyhow!("Failed to downcast to sequence: {}", e))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>(&allocator)?;

    if maps.is_empty() {
        return Err(anyhow::anyhow!("Empty sequence"));
    }

    // Batch size is always 1; the first map carries class -> probability
    let kv_pairs = maps[0].try_extract_key_values::<i64, f32>()?;

    for (class_id, prob) in &kv_pairs {
        if *class_id == 1 {
            debug!(prob = *prob, "Extracted from seq(map)");
            return Ok(*prob as f64);
        }
    }

    // If no class 1, invert class 0 (shouldn't happen)
    for (class_id, prob) in &kv_pairs {
        if *class_id == 0 {
            return Ok(1.0 - *prob as f64);
        }
    }

    Err(anyhow::anyhow!("No probability found in map"))
}

/// Extract the positive-class probability from tensor data
fn positive_prob_from_tensor(shape: &ort::tensor::Shape, data: &[f32]) -> f64 {
    let dims: Vec<i64> = shape.iter().copied().collect();

    if dims.len() == 2 {
        let num_classes = dims[1] as usize;
        if num_classes >= 2 {
            // [batch, num_classes] - positive class is index 1
            return data[1] as f64;
        } else if num_classes == 1 {
            // [batch, 1] - single probability
            return data[0] as f64;
        }
    } else if dims.len() == 1 {
        let num_classes = dims[0] as usize;
        if num_classes >= 2 {
            return data[1] as f64;
        } else if num_classes == 1 {
            return data[0] as f64;
        }
    }

    // Fallback: return last value
    data.last().map(|&v| v as f64).unwrap_or(0.5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_is_consistent_with_threshold() {
        let prediction = Prediction {
            matched: 0.73 > 0.5,
            probability: 0.73,
        };
        assert!(prediction.matched);
        assert!((0.0..=1.0).contains(&prediction.probability));
    }
}
