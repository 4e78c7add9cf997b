use thiserror::Error;

/// Failure inside a detector or classifier call.
///
/// Messages describe the model plumbing only, never image content.
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("inference run failed: {0}")]
    Runtime(String),
    #[error("unexpected model output: {0}")]
    UnexpectedOutput(String),
    #[error("empty input image")]
    EmptyInput,
}

impl InferenceError {
    pub fn runtime(e: impl std::fmt::Display) -> Self {
        InferenceError::Runtime(e.to_string())
    }
}

