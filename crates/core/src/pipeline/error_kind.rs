use thiserror::Error;

use crate::upload::domain::image_decoder::DecodeError;

/// Closed set of reasons a verification can be rejected.
///
/// `Display` yields the fixed, non-sensitive message shown to callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    #[error("No face detected. Please upload a clear photo of your face.")]
    NoFaceDetected,
    #[error("Multiple faces detected. Please upload a photo containing only your face.")]
    MultipleFacesDetected,
    #[error("Invalid file type. Please upload a JPEG, PNG, or WebP image.")]
    InvalidFileType,
    #[error("Empty file. Please upload an image.")]
    EmptyFile,
    #[error("Corrupted image. Please upload a valid image file.")]
    CorruptedImage,
    #[error("Internal error. Please try again later.")]
    InternalError,
}

impl ErrorKind {
    /// Rejections caused by what the client sent rather than by the photo's
    /// content or by the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ErrorKind::InvalidFileType | ErrorKind::EmptyFile | ErrorKind::CorruptedImage
        )
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ErrorKind::InternalError)
    }
}

impl From<DecodeError> for ErrorKind {
    fn from(e: DecodeError) -> Self {
        match e {
            DecodeError::InvalidFileType => ErrorKind::InvalidFileType,
            DecodeError::EmptyFile => ErrorKind::EmptyFile,
            DecodeError::CorruptedImage => ErrorKind::CorruptedImage,
        }
    }
}
