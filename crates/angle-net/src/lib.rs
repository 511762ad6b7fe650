//! Text Line Orientation Classifier
//!
//! Decides whether a cropped text line is upright or rotated 180 degrees
//! before it is handed to text recognition:
//! - Letterbox resize and per-channel normalization to an NCHW tensor
//! - ONNX Runtime inference behind the [`InferenceSession`] seam
//! - Argmax decoding into an [`AngleLabel`]
//! - Optional batch-wide majority vote

pub mod angle;
pub mod classifier;
pub mod config;
pub mod decoder;
pub mod model;
pub mod preprocess;
pub mod resize;
pub mod session;
pub mod smoother;

pub use angle::{AngleLabel, AngleResult, ANGLE_CLASSES};
pub use classifier::AngleClassifier;
pub use self::config::{ClassifierConfig, OptimizationLevel};
pub use decoder::decode;
pub use model::{DirModelLoader, ModelBlob, ModelLoader};
pub use preprocess::Preprocessor;
pub use resize::ResizeMode;
pub use session::{InferenceSession, OrtSession, SessionOptions};
pub use smoother::{majority_label, smooth, Smoothing};

use thiserror::Error;

/// Angle classification error types
#[derive(Error, Debug)]
pub enum AngleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Invalid output shape: expected {expected} scores, got {actual}")]
    OutputShape { expected: usize, actual: usize },

    #[error("Normalization expects {expected} channels, image has {actual}")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("Cannot classify empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
}
