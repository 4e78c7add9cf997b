use crate::detection::domain::face_detector::FaceDetector;
use crate::shared::constants::FACE_CONFIDENCE_THRESHOLD;
use crate::shared::face_region::FaceRegion;
use crate::shared::inference_error::InferenceError;
use crate::shared::pixel_array::PixelArray;

/// Runs a detector and keeps only detections at or above the policy
/// confidence threshold.
///
/// An empty result is a valid answer here; the face-count policy lives in
/// the verification pipeline.
pub struct FaceLocator<'a> {
    detector: &'a dyn FaceDetector,
    threshold: f64,
}

impl<'a> FaceLocator<'a> {
    pub fn new(detector: &'a dyn FaceDetector) -> Self {
        Self::with_threshold(detector, FACE_CONFIDENCE_THRESHOLD)
    }

    pub fn with_threshold(detector: &'a dyn FaceDetector, threshold: f64) -> Self {
        Self {
            detector,
            threshold,
        }
    }

    pub fn locate(&self, pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError> {
        let candidates = self.detector.detect(pixels)?;
        Ok(filter_by_confidence(candidates, self.threshold))
    }
}

/// Drops regions scoring below `threshold`, preserving order.
pub fn filter_by_confidence(regions: Vec<FaceRegion>, threshold: f64) -> Vec<FaceRegion> {
    regions
        .into_iter()
        .filter(|r| r.confidence >= threshold)
        .collect()
}
