//! Model blob loading

use crate::AngleError;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error};

/// Serialized model bytes, consumed once to build a session
#[derive(Debug, Clone)]
pub struct ModelBlob {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ModelBlob {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Source of model blobs
pub trait ModelLoader {
    /// Load the model registered under `name`
    fn load(&self, name: &str) -> Result<ModelBlob, AngleError>;
}

/// Loads models from files in a directory
#[derive(Debug, Clone)]
pub struct DirModelLoader {
    root: PathBuf,
}

impl DirModelLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ModelLoader for DirModelLoader {
    fn load(&self, name: &str) -> Result<ModelBlob, AngleError> {
        let path = self.root.join(name);
        debug!("Reading model {} from {}", name, path.display());

        let bytes = fs::read(&path).map_err(|e| {
            error!("Failed to read model {}: {}", path.display(), e);
            AngleError::ModelLoad(format!("{}: {}", path.display(), e))
        })?;

        if bytes.is_empty() {
            error!("Model file {} is empty", path.display());
            return Err(AngleError::ModelLoad(format!(
                "{}: model file is empty",
                path.display()
            )));
        }

        Ok(ModelBlob::new(name, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_reads_bytes() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("angle.onnx"), b"\x08\x07model").unwrap();

        let blob = DirModelLoader::new(dir.path()).load("angle.onnx").unwrap();

        assert_eq!(blob.name, "angle.onnx");
        assert_eq!(blob.len(), 7);
    }

    #[test]
    fn test_missing_model() {
        let dir = tempdir().unwrap();
        let result = DirModelLoader::new(dir.path()).load("absent.onnx");

        assert!(matches!(result, Err(AngleError::ModelLoad(_))));
    }

    #[test]
    fn test_empty_model() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("empty.onnx"), b"").unwrap();

        let result = DirModelLoader::new(dir.path()).load("empty.onnx");

        assert!(matches!(result, Err(AngleError::ModelLoad(_))));
    }
}
