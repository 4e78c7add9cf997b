use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

use faceverify_core::models::model_registry::ModelPaths;
use faceverify_core::models::model_resolver::{self, ModelResolveError};
use faceverify_core::models::onnx_session::SessionSettings;
use faceverify_core::shared::constants::{CLASSIFIER_MODEL_NAME, DETECTOR_MODEL_NAME};

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Single-face photo verification service.
#[derive(Parser, Debug)]
#[command(name = "faceverify", version)]
pub struct ServerConfig {
    /// Address to listen on.
    #[arg(long, env = "FACEVERIFY_BIND", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Face detector ONNX model (overrides lookup in --models-dir).
    #[arg(long, env = "FACEVERIFY_DETECTOR_MODEL")]
    pub detector_model: Option<PathBuf>,

    /// Gender classifier ONNX model (overrides lookup in --models-dir).
    #[arg(long, env = "FACEVERIFY_CLASSIFIER_MODEL")]
    pub classifier_model: Option<PathBuf>,

    /// Directory searched for model files by their default names.
    #[arg(long, env = "FACEVERIFY_MODELS_DIR", default_value = "models")]
    pub models_dir: PathBuf,

    /// ONNX Runtime intra-op threads per model (default: available cores).
    #[arg(long, env = "FACEVERIFY_INTRA_THREADS")]
    pub intra_threads: Option<usize>,

    /// Largest accepted request body in bytes.
    #[arg(long, env = "FACEVERIFY_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), Box<dyn std::error::Error>> {
        if self.intra_threads == Some(0) {
            return Err("--intra-threads must be at least 1".into());
        }
        if self.max_upload_bytes == 0 {
            return Err("--max-upload-bytes must be at least 1".into());
        }
        Ok(())
    }

    pub fn session_settings(&self) -> SessionSettings {
        match self.intra_threads {
            Some(intra_threads) => SessionSettings { intra_threads },
            None => SessionSettings::default(),
        }
    }

    pub fn model_paths(&self) -> Result<ModelPaths, ModelResolveError> {
        log::info!("Resolving models: {DETECTOR_MODEL_NAME}, {CLASSIFIER_MODEL_NAME}");
        Ok(ModelPaths {
            detector: model_resolver::resolve(
                DETECTOR_MODEL_NAME,
                self.detector_model.as_deref(),
                Some(&self.models_dir),
            )?,
            classifier: model_resolver::resolve(
                CLASSIFIER_MODEL_NAME,
                self.classifier_model.as_deref(),
                Some(&self.models_dir),
            )?,
        })
    }
}
