//! Inference session seam and its ONNX Runtime implementation

use crate::config::{ClassifierConfig, OptimizationLevel};
use crate::model::ModelBlob;
use crate::AngleError;
use ndarray::Array4;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::Session;
use ort::value::Tensor;
use tracing::{debug, error, info};

/// Synchronous tensor-in, scores-out inference
pub trait InferenceSession {
    /// Run the model on one `[1, C, H, W]` tensor and return the flattened output
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AngleError>;
}

/// Session construction options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionOptions {
    /// Intra- and inter-op thread count (0 = runtime default)
    pub num_threads: usize,
    pub optimization_level: OptimizationLevel,
}

impl From<&ClassifierConfig> for SessionOptions {
    fn from(config: &ClassifierConfig) -> Self {
        Self {
            num_threads: config.num_threads,
            optimization_level: config.optimization_level,
        }
    }
}

impl From<OptimizationLevel> for GraphOptimizationLevel {
    fn from(level: OptimizationLevel) -> Self {
        match level {
            OptimizationLevel::Disabled => GraphOptimizationLevel::Disable,
            OptimizationLevel::Basic => GraphOptimizationLevel::Level1,
            OptimizationLevel::Extended => GraphOptimizationLevel::Level2,
            OptimizationLevel::All => GraphOptimizationLevel::Level3,
        }
    }
}

/// ONNX Runtime session together with the input and output it is driven through
///
/// Everything is released when the value is dropped.
pub struct OrtSession {
    session: Session,
    input_name: String,
    output_name: String,
}

impl std::fmt::Debug for OrtSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrtSession")
            .field("session", &"<Session>")
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .finish()
    }
}

impl OrtSession {
    /// Build a session from an in-memory model
    pub fn from_blob(blob: &ModelBlob, options: &SessionOptions) -> Result<Self, AngleError> {
        info!(
            "Building inference session for {} ({} bytes, threads={}, optimization={:?})",
            blob.name,
            blob.len(),
            options.num_threads,
            options.optimization_level
        );

        let session = Self::builder(options)
            .and_then(|builder| builder.commit_from_memory(&blob.bytes))
            .map_err(|e| {
                error!("Failed to build session for {}: {}", blob.name, e);
                AngleError::ModelLoad(format!("{}: {}", blob.name, e))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| AngleError::ModelLoad(format!("{}: model has no inputs", blob.name)))?;
        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| AngleError::ModelLoad(format!("{}: model has no outputs", blob.name)))?;

        debug!("Session ready: input={}, output={}", input_name, output_name);

        Ok(Self {
            session,
            input_name,
            output_name,
        })
    }

    fn builder(options: &SessionOptions) -> Result<SessionBuilder, ort::Error> {
        let mut builder = Session::builder()?
            .with_optimization_level(options.optimization_level.into())?;
        if options.num_threads > 0 {
            builder = builder
                .with_intra_threads(options.num_threads)?
                .with_inter_threads(options.num_threads)?;
        }
        Ok(builder)
    }
}

impl InferenceSession for OrtSession {
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, AngleError> {
        let tensor = Tensor::from_array(input).map_err(|e| AngleError::Inference(e.to_string()))?;
        let inputs = ort::inputs![self.input_name.as_str() => tensor]
            .map_err(|e| AngleError::Inference(e.to_string()))?;

        let outputs = self
            .session
            .run(inputs)
            .map_err(|e| AngleError::Inference(e.to_string()))?;

        let (_shape, scores) = outputs[self.output_name.as_str()]
            .try_extract_raw_tensor::<f32>()
            .map_err(|e| AngleError::Inference(e.to_string()))?;

        Ok(scores.to_vec())
    }
}
