use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::classification::domain::gender::Gender;
use crate::detection::domain::face_locator::FaceLocator;
use crate::models::model_registry::{ModelRegistry, Models};
use crate::pipeline::classification_result::ClassificationResult;
use crate::pipeline::error_kind::ErrorKind;
use crate::shared::constants::REQUIRED_FACE_COUNT;
use crate::shared::transient::{BufferKind, ReleaseHook, ReleaseObserver};
use crate::upload::domain::image_decoder::{validate, ImageDecoder};
use crate::upload::domain::raw_upload::RawUpload;

/// Single-photo verification: validate → decode → locate → count → classify.
///
/// Validation happens here, once; decoders receive the validated type. Every buffer derived from the upload is owned by one call and zeroed
/// before `verify` returns, whichever branch it takes. Faults and panics
/// inside the stages become [`ErrorKind::InternalError`].
pub struct VerifyPhotoUseCase {
    registry: Arc<ModelRegistry>,
    decoder: Arc<dyn ImageDecoder>,
    hook: ReleaseHook,
}

impl VerifyPhotoUseCase {
    pub fn new(registry: Arc<ModelRegistry>, decoder: Arc<dyn ImageDecoder>) -> Self {
        Self {
            registry,
            decoder,
            hook: ReleaseHook::null(),
        }
    }

    /// Report buffer acquisition and release to `observer`.
    pub fn with_release_observer(mut self, observer: Arc<dyn ReleaseObserver>) -> Self {
        self.hook = ReleaseHook::new(observer);
        self
    }

    pub fn verify(&self, upload: RawUpload) -> ClassificationResult {
        let started = Instant::now();
        let upload = upload.tracked(&self.hook);
        let models = self.registry.snapshot();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.run(upload, &models)));
        let result = match outcome {
            Ok(Ok(gender)) => ClassificationResult::Verified { gender },
            Ok(Err(kind)) => ClassificationResult::Rejected(kind),
            Err(_) => {
                log::error!("Verification aborted by a panic in an inference stage");
                ClassificationResult::Rejected(ErrorKind::InternalError)
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        match result.error() {
            None => log::info!("Verification succeeded in {elapsed_ms:.1}ms"),
            Some(kind) if kind.is_internal() => {
                log::error!("Verification failed with {kind:?} after {elapsed_ms:.1}ms")
            }
            Some(kind) => log::warn!("Verification rejected: {kind:?} after {elapsed_ms:.1}ms"),
        }
        result
    }

    fn run(&self, upload: RawUpload, models: &Models) -> Result<Gender, ErrorKind> {
        let content_type = validate(&upload)?;

        let stage = Instant::now();
        let pixels = self
            .decoder
            .decode(&upload, content_type)?
            .tracked(&self.hook, BufferKind::Pixels);
        drop(upload);
        log_stage("decode", stage);

        let stage = Instant::now();
        let faces = FaceLocator::new(models.detector.as_ref())
            .locate(&pixels)
            .map_err(|e| {
                log::error!("Face detection failed: {e}");
                ErrorKind::InternalError
            })?;
        log_stage("detect", stage);
        log::debug!("Faces above threshold: {}", faces.len());

        if faces.is_empty() {
            return Err(ErrorKind::NoFaceDetected);
        }
        if faces.len() > REQUIRED_FACE_COUNT {
            return Err(ErrorKind::MultipleFacesDetected);
        }
        let face = &faces[0];

        let stage = Instant::now();
        let prediction = models.classifier.classify(&pixels, face).map_err(|e| {
            log::error!("Gender classification failed: {e}");
            ErrorKind::InternalError
        })?;
        log_stage("classify", stage);

        Ok(prediction.gender)
    }
}

fn log_stage(stage: &str, started: Instant) {
    log::debug!(
        "Stage {stage} took {:.1}ms",
        started.elapsed().as_secs_f64() * 1000.0
    );
}
