use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::classification::domain::gender_classifier::GenderClassifier;
use crate::classification::infrastructure::onnx_gender_classifier::OnnxGenderClassifier;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::onnx_yolo_detector::OnnxYoloDetector;
use crate::models::onnx_session::{ModelLoadError, SessionSettings};

/// A loaded detector and classifier pair.
pub struct Models {
    pub detector: Arc<dyn FaceDetector>,
    pub classifier: Arc<dyn GenderClassifier>,
}

/// Resolved model file locations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub classifier: PathBuf,
}

/// Process-wide holder of the inference models.
///
/// Verifications take a [`snapshot`](Self::snapshot) and keep using it even
/// if the models are swapped underneath them.
pub struct ModelRegistry {
    models: RwLock<Arc<Models>>,
}

impl ModelRegistry {
    /// Load both ONNX models. Fails if either cannot be loaded.
    pub fn load(paths: &ModelPaths, settings: &SessionSettings) -> Result<Self, ModelLoadError> {
        log::info!(
            "Loading models (detector: {}, classifier: {}, intra threads: {})",
            paths.detector.display(),
            paths.classifier.display(),
            settings.intra_threads
        );
        let detector = OnnxYoloDetector::load(&paths.detector, settings)?;
        let classifier = OnnxGenderClassifier::load(&paths.classifier, settings)?;
        Ok(Self::from_models(Arc::new(detector), Arc::new(classifier)))
    }

    pub fn from_models(
        detector: Arc<dyn FaceDetector>,
        classifier: Arc<dyn GenderClassifier>,
    ) -> Self {
        Self {
            models: RwLock::new(Arc::new(Models {
                detector,
                classifier,
            })),
        }
    }

    pub fn snapshot(&self) -> Arc<Models> {
        Arc::clone(&self.models.read())
    }

    /// Replace the models, returning the previous pair.
    pub fn swap(&self, models: Models) -> Arc<Models> {
        let mut guard = self.models.write();
        std::mem::replace(&mut *guard, Arc::new(models))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::domain::gender::{Gender, GenderPrediction};
    use crate::shared::face_region::FaceRegion;
    use crate::shared::inference_error::InferenceError;
    use crate::shared::pixel_array::PixelArray;

    struct StubDetector(usize);

    impl FaceDetector for StubDetector {
        fn detect(&self, _pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError> {
            Ok(vec![FaceRegion::new(0.0, 0.0, 1.0, 1.0, 0.9); self.0])
        }
    }

    struct StubClassifier(Gender);

    impl GenderClassifier for StubClassifier {
        fn classify(
            &self,
            _pixels: &PixelArray,
            _region: &FaceRegion,
        ) -> Result<GenderPrediction, InferenceError> {
            Ok(GenderPrediction {
                gender: self.0,
                confidence: 1.0,
            })
        }
    }

    fn models(faces: usize, gender: Gender) -> Models {
        Models {
            detector: Arc::new(StubDetector(faces)),
            classifier: Arc::new(StubClassifier(gender)),
        }
    }

    fn classify_with(models: &Models) -> Gender {
        let pixels = PixelArray::new(vec![0u8; 3], 1, 1, 3);
        let region = FaceRegion::new(0.0, 0.0, 1.0, 1.0, 0.9);
        models.classifier.classify(&pixels, &region).unwrap().gender
    }

    #[test]
    fn test_snapshot_returns_loaded_models() {
        let registry = ModelRegistry::from_models(
            Arc::new(StubDetector(1)),
            Arc::new(StubClassifier(Gender::F)),
        );
        let snapshot = registry.snapshot();
        let pixels = PixelArray::new(vec![0u8; 3], 1, 1, 3);
        assert_eq!(snapshot.detector.detect(&pixels).unwrap().len(), 1);
        assert_eq!(classify_with(&snapshot), Gender::F);
    }

    #[test]
    fn test_swap_keeps_existing_snapshots_alive() {
        let registry = ModelRegistry::from_models(
            Arc::new(StubDetector(1)),
            Arc::new(StubClassifier(Gender::F)),
        );
        let before = registry.snapshot();

        let previous = registry.swap(models(1, Gender::M));

        assert!(Arc::ptr_eq(&before, &previous));
        assert_eq!(classify_with(&before), Gender::F);
        assert_eq!(classify_with(&registry.snapshot()), Gender::M);
    }

    #[test]
    fn test_load_fails_when_detector_missing() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ModelPaths {
            detector: dir.path().join("detector.onnx"),
            classifier: dir.path().join("classifier.onnx"),
        };
        let result = ModelRegistry::load(&paths, &SessionSettings::default());
        assert!(matches!(result, Err(ModelLoadError::Missing(p)) if p == paths.detector));
    }
}
