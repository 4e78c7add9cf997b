use std::path::{Path, PathBuf};

use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("model file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to load model {path}: {message}")]
    Session { path: PathBuf, message: String },
}

/// ONNX Runtime threading options shared by both models.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    pub intra_threads: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            intra_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
        }
    }
}

/// Build an optimized inference session for the model at `path`.
pub fn build_session(path: &Path, settings: &SessionSettings) -> Result<Session, ModelLoadError> {
    if !path.is_file() {
        return Err(ModelLoadError::Missing(path.to_path_buf()));
    }
    let fail = |message: String| ModelLoadError::Session {
        path: path.to_path_buf(),
        message,
    };

    Session::builder()
        .map_err(|e| fail(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .map_err(|e| fail(e.to_string()))?
        .with_inter_threads(1)
        .map_err(|e| fail(e.to_string()))?
        .with_intra_threads(settings.intra_threads.max(1))
        .map_err(|e| fail(e.to_string()))?
        .with_execution_providers(preferred_execution_providers())
        .map_err(|e| fail(e.to_string()))?
        .commit_from_file(path)
        .map_err(|e| fail(e.to_string()))
}

/// Return the preferred ONNX execution providers for the current platform.
///
/// Falls back to CPU if the platform-specific provider is unavailable.
pub fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
