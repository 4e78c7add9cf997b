use thiserror::Error;

use crate::shared::pixel_array::PixelArray;
use crate::upload::domain::content_type::ImageContentType;
use crate::upload::domain::raw_upload::RawUpload;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("declared content type is not an accepted image type")]
    InvalidFileType,
    #[error("upload is empty")]
    EmptyFile,
    #[error("image could not be decoded")]
    CorruptedImage,
}

/// Domain interface for turning an upload into pixels.
///
/// Callers run [`validate`] first and pass on the content type it returned;
/// decoders trust it and only report [`DecodeError::CorruptedImage`].
/// Implementations must not write anything outside the returned array.
pub trait ImageDecoder: Send + Sync {
    fn decode(
        &self,
        upload: &RawUpload,
        content_type: ImageContentType,
    ) -> Result<PixelArray, DecodeError>;
}

/// Cheap checks that precede any decode attempt. The verification pipeline
/// is the only caller in production.
///
/// The content type is checked before emptiness, so an empty upload with a
/// disallowed type reports [`DecodeError::InvalidFileType`].
pub fn validate(upload: &RawUpload) -> Result<ImageContentType, DecodeError> {
    let content_type =
        ImageContentType::parse(upload.content_type()).ok_or(DecodeError::InvalidFileType)?;
    if upload.is_empty() {
        return Err(DecodeError::EmptyFile);
    }
    Ok(content_type)
}
