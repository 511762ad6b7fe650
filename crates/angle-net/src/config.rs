//! Classifier configuration

use crate::resize::ResizeMode;
use crate::AngleError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "ANGLENET";

/// Graph optimization level applied when building the inference session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationLevel {
    /// No graph optimizations
    Disabled,
    /// Redundant node removal and constant folding
    Basic,
    /// Basic plus node fusions
    #[default]
    Extended,
    /// Every available optimization, including layout changes
    All,
}

/// Angle classifier configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Model file name handed to the model loader
    pub model_name: String,

    /// Inference threads (0 = runtime default)
    pub num_threads: usize,

    /// Session graph optimization level
    pub optimization_level: OptimizationLevel,

    /// Input tensor width
    pub target_width: u32,

    /// Input tensor height
    pub target_height: u32,

    /// Per-channel mean subtracted before scaling
    pub mean_values: Vec<f32>,

    /// Per-channel scale applied after mean subtraction
    pub norm_values: Vec<f32>,

    /// How crops are fitted to the target size
    pub resize_mode: ResizeMode,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_name: "angle_op.onnx".to_string(),
            num_threads: 0,
            optimization_level: OptimizationLevel::Extended,
            target_width: 192,
            target_height: 32,
            mean_values: vec![127.5; 3],
            norm_values: vec![1.0 / 127.5; 3],
            resize_mode: ResizeMode::Letterbox,
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a file, with `ANGLENET_*` environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AngleError> {
        Self::layered(Some(path.as_ref()))
    }

    /// Defaults with `ANGLENET_*` environment overrides
    pub fn from_env() -> Result<Self, AngleError> {
        Self::layered(None)
    }

    fn layered(path: Option<&Path>) -> Result<Self, AngleError> {
        let origin = path
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "environment".to_string());

        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(::config::File::from(path));
        }
        let config = builder
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|e| AngleError::Config(format!("{}: {}", origin, e)))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AngleError::Config(format!("{}: {}", origin, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Builder-style thread count override
    pub fn with_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    /// Number of channels the normalization constants cover
    pub fn channels(&self) -> usize {
        self.mean_values.len()
    }

    /// Check the configuration for values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), AngleError> {
        if self.model_name.trim().is_empty() {
            return Err(AngleError::Config("model_name is empty".into()));
        }
        if self.target_width == 0 || self.target_height == 0 {
            return Err(AngleError::Config(format!(
                "target size must be positive, got {}x{}",
                self.target_width, self.target_height
            )));
        }
        if self.mean_values.is_empty() {
            return Err(AngleError::Config("mean_values is empty".into()));
        }
        if self.mean_values.len() != self.norm_values.len() {
            return Err(AngleError::Config(format!(
                "mean_values has {} entries but norm_values has {}",
                self.mean_values.len(),
                self.norm_values.len()
            )));
        }
        if self
            .mean_values
            .iter()
            .chain(&self.norm_values)
            .any(|v| !v.is_finite())
        {
            return Err(AngleError::Config(
                "normalization constants must be finite".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_matches_anglenet_constants() {
        let config = ClassifierConfig::default();
        assert_eq!(config.target_width, 192);
        assert_eq!(config.target_height, 32);
        assert_eq!(config.channels(), 3);
        assert!((config.norm_values[0] - 0.007_843_137).abs() < 1e-7);
        assert_eq!(config.optimization_level, OptimizationLevel::Extended);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_mismatched_constants() {
        let config = ClassifierConfig {
            norm_values: vec![1.0; 2],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AngleError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let config = ClassifierConfig {
            target_height: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AngleError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_nan() {
        let config = ClassifierConfig {
            mean_values: vec![f32::NAN, 0.0, 0.0],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("anglenet.toml");
        fs::write(
            &path,
            "target_width = 160\nresize_mode = \"stretch\"\noptimization_level = \"all\"\n",
        )
        .unwrap();

        let config = ClassifierConfig::load(&path).unwrap();

        assert_eq!(config.target_width, 160);
        assert_eq!(config.target_height, 32);
        assert_eq!(config.resize_mode, ResizeMode::Stretch);
        assert_eq!(config.optimization_level, OptimizationLevel::All);
        assert_eq!(config.mean_values, vec![127.5; 3]);
    }

    #[test]
    fn test_env_overrides_without_file() {
        std::env::set_var("ANGLENET_NUM_THREADS", "3");
        let config = ClassifierConfig::from_env();
        std::env::remove_var("ANGLENET_NUM_THREADS");

        let config = config.unwrap();
        assert_eq!(config.num_threads, 3);
        assert_eq!(config.target_width, 192);
        assert_eq!(config.mean_values, vec![127.5; 3]);
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = ClassifierConfig::load("/nonexistent/anglenet.toml");
        assert!(matches!(result, Err(AngleError::Config(_))));
    }
}
