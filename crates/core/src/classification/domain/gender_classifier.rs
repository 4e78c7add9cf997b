use crate::classification::domain::gender::GenderPrediction;
use crate::shared::face_region::FaceRegion;
use crate::shared::inference_error::InferenceError;
use crate::shared::pixel_array::PixelArray;

/// Side length multiplier for the square crop handed to the classifier.
pub const FACE_CROP_SCALE: f64 = 1.5;

/// Predicts the gender of the face at `region` within `pixels`.
pub trait GenderClassifier: Send + Sync {
    fn classify(
        &self,
        pixels: &PixelArray,
        region: &FaceRegion,
    ) -> Result<GenderPrediction, InferenceError>;
}

/// Square crop centred on the face, expanded by [`FACE_CROP_SCALE`] and
/// clamped to the image. The crop inherits the image's release tracking.
pub fn crop_face(pixels: &PixelArray, region: &FaceRegion) -> PixelArray {
    pixels.crop(&region.square_around(FACE_CROP_SCALE))
}
