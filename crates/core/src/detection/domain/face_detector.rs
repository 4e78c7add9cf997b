use crate::shared::face_region::FaceRegion;
use crate::shared::inference_error::InferenceError;
use crate::shared::pixel_array::PixelArray;

/// Domain interface for face detection.
///
/// Implementations are shared by concurrent verifications, hence `&self`
/// and `Sync`; any mutable inference state must be synchronized internally.
pub trait FaceDetector: Send + Sync {
    /// Candidate faces in detector output order, in image coordinates.
    fn detect(&self, pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError>;
}
