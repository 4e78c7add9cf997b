use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model file not found: {0}")]
    ExplicitMissing(PathBuf),
    #[error("model {name} not found (searched: {})", display_paths(.searched))]
    NotFound { name: String, searched: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve a model file by name. Nothing is downloaded.
///
/// Resolution order:
/// 1. Explicit path (must exist if given)
/// 2. `<models_dir>/<name>`
/// 3. User cache directory (platform-specific)
pub fn resolve(
    name: &str,
    explicit: Option<&Path>,
    models_dir: Option<&Path>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(ModelResolveError::ExplicitMissing(path.to_path_buf()));
    }

    let searched: Vec<PathBuf> = models_dir
        .map(|dir| dir.join(name))
        .into_iter()
        .chain(model_cache_dir().map(|dir| dir.join(name)))
        .collect();

    match searched.iter().find(|p| p.is_file()) {
        Some(found) => {
            log::debug!("Resolved model {name} to {}", found.display());
            Ok(found.clone())
        }
        None => Err(ModelResolveError::NotFound {
            name: name.to_string(),
            searched,
        }),
    }
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/faceverify/models/`
/// - Linux: `$XDG_CACHE_HOME/faceverify/models/` or `~/.cache/faceverify/models/`
/// - Windows: `%LOCALAPPDATA%/faceverify/models/`
pub fn model_cache_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir().map(|d| d.join("faceverify").join("models"))
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir().map(|d| d.join("faceverify").join("models"))
    }
}
