use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};

use faceverify_core::pipeline::classification_result::ClassificationResult;
use faceverify_core::pipeline::error_kind::ErrorKind;
use faceverify_core::pipeline::verify_photo_use_case::VerifyPhotoUseCase;
use faceverify_core::upload::domain::raw_upload::RawUpload;

use crate::dto::{HealthResponse, ServiceInfo};

/// Multipart field carrying the photo.
pub const IMAGE_FIELD: &str = "image";

pub struct AppState {
    pub use_case: Arc<VerifyPhotoUseCase>,
}

pub fn create_router(state: Arc<AppState>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/verify", post(verify_handler))
        .route("/health", get(health_handler))
        .route("/", get(info_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

async fn verify_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> (StatusCode, Json<ClassificationResult>) {
    let upload = match multipart {
        Ok(multipart) => read_image_field(multipart).await,
        Err(rejection) => {
            log::debug!("Request is not a readable multipart body: {rejection}");
            None
        }
    };
    let Some(upload) = upload else {
        log::warn!("Verification rejected: {:?}", ErrorKind::EmptyFile);
        return respond(ClassificationResult::Rejected(ErrorKind::EmptyFile));
    };

    // The blocking task owns the upload, so its buffers are released even if
    // the client goes away before the verdict is ready.
    let use_case = Arc::clone(&state.use_case);
    let result = match tokio::task::spawn_blocking(move || use_case.verify(upload)).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Verification task did not complete: {e}");
            ClassificationResult::Rejected(ErrorKind::InternalError)
        }
    };
    respond(result)
}

/// First `image` part of the form, with its declared content type.
async fn read_image_field(mut multipart: Multipart) -> Option<RawUpload> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return None,
            Err(e) => {
                log::debug!("Multipart body could not be read: {e}");
                return None;
            }
        };
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().unwrap_or_default().to_string();
        return match field.bytes().await {
            Ok(bytes) => Some(RawUpload::new(Vec::from(bytes), content_type)),
            Err(e) => {
                log::debug!("Image field could not be read: {e}");
                None
            }
        };
    }
}

fn respond(result: ClassificationResult) -> (StatusCode, Json<ClassificationResult>) {
    (status_for(&result), Json(result))
}

pub fn status_for(result: &ClassificationResult) -> StatusCode {
    match result.error() {
        None => StatusCode::OK,
        Some(kind) if kind.is_internal() => StatusCode::INTERNAL_SERVER_ERROR,
        Some(kind) if kind.is_client_error() => StatusCode::BAD_REQUEST,
        Some(_) => StatusCode::OK,
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

async fn info_handler() -> Json<ServiceInfo> {
    Json(ServiceInfo::current())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use faceverify_core::classification::domain::gender::{Gender, GenderPrediction};
    use faceverify_core::classification::domain::gender_classifier::GenderClassifier;
    use faceverify_core::detection::domain::face_detector::FaceDetector;
    use faceverify_core::models::model_registry::ModelRegistry;
    use faceverify_core::shared::face_region::FaceRegion;
    use faceverify_core::shared::inference_error::InferenceError;
    use faceverify_core::shared::pixel_array::PixelArray;
    use faceverify_core::upload::infrastructure::image_crate_decoder::ImageCrateDecoder;
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
    use rstest::rstest;
    use serde_json::{json, Value};
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "faceverify-test-boundary";

    // --- Stubs ---

    struct StubDetector {
        faces: usize,
    }

    impl FaceDetector for StubDetector {
        fn detect(&self, _pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError> {
            Ok((0..self.faces)
                .map(|i| FaceRegion::new(10.0 * i as f64, 0.0, 8.0, 8.0, 0.9))
                .collect())
        }
    }

    struct FailingDetector;

    impl FaceDetector for FailingDetector {
        fn detect(&self, _pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError> {
            Err(InferenceError::Runtime("boom".into()))
        }
    }

    struct StubClassifier;

    impl GenderClassifier for StubClassifier {
        fn classify(
            &self,
            _pixels: &PixelArray,
            _region: &FaceRegion,
        ) -> Result<GenderPrediction, InferenceError> {
            Ok(GenderPrediction {
                gender: Gender::M,
                confidence: 0.9,
            })
        }
    }

    // --- Helpers ---

    fn app_with(detector: Arc<dyn FaceDetector>, max_upload_bytes: usize) -> Router {
        let registry = Arc::new(ModelRegistry::from_models(detector, Arc::new(StubClassifier)));
        let use_case = VerifyPhotoUseCase::new(registry, Arc::new(ImageCrateDecoder::new()));
        create_router(
            Arc::new(AppState {
                use_case: Arc::new(use_case),
            }),
            max_upload_bytes,
        )
    }

    fn app(faces: usize) -> Router {
        app_with(Arc::new(StubDetector { faces }), 1024 * 1024)
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(w, h, Rgb([90, 120, 150])));
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn multipart_body(field: &str, content_type: Option<&str>, bytes: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"photo\"\r\n")
                .as_bytes(),
        );
        if let Some(content_type) = content_type {
            body.extend_from_slice(format!("Content-Type: {content_type}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn verify_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/verify")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn rejection(kind: ErrorKind) -> Value {
        json!({"verified": false, "error": kind.to_string()})
    }

    // --- /verify ---

    #[tokio::test]
    async fn test_single_face_is_verified() {
        let body = multipart_body("image", Some("image/png"), &png(32, 32));
        let (status, json) = send(app(1), verify_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"verified": true, "gender": "M"}));
    }

    #[rstest]
    #[case::no_face(0, ErrorKind::NoFaceDetected)]
    #[case::two_faces(2, ErrorKind::MultipleFacesDetected)]
    #[tokio::test]
    async fn test_face_count_rejections_are_ok_status(
        #[case] faces: usize,
        #[case] kind: ErrorKind,
    ) {
        let body = multipart_body("image", Some("image/png"), &png(32, 32));
        let (status, json) = send(app(faces), verify_request(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, rejection(kind));
    }

    #[tokio::test]
    async fn test_empty_file_is_bad_request() {
        let body = multipart_body("image", Some("image/jpeg"), b"");
        let (status, json) = send(app(1), verify_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::EmptyFile));
    }

    #[rstest]
    #[case::gif(Some("image/gif"))]
    #[case::text(Some("text/plain"))]
    #[case::undeclared(None)]
    #[tokio::test]
    async fn test_disallowed_type_is_bad_request(#[case] content_type: Option<&str>) {
        let body = multipart_body("image", content_type, &png(8, 8));
        let (status, json) = send(app(1), verify_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::InvalidFileType));
    }

    #[tokio::test]
    async fn test_text_labelled_as_jpeg_is_corrupted() {
        let body = multipart_body("image", Some("image/jpeg"), b"definitely not a jpeg");
        let (status, json) = send(app(1), verify_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::CorruptedImage));
    }

    #[tokio::test]
    async fn test_missing_image_field_is_empty_file() {
        let body = multipart_body("photo", Some("image/png"), &png(8, 8));
        let (status, json) = send(app(1), verify_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::EmptyFile));
    }

    #[tokio::test]
    async fn test_non_multipart_request_is_empty_file() {
        let request = Request::builder()
            .method("POST")
            .uri("/verify")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let (status, json) = send(app(1), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::EmptyFile));
    }

    #[tokio::test]
    async fn test_body_over_limit_is_rejected() {
        let body = multipart_body("image", Some("image/png"), &vec![7u8; 4096]);
        let app = app_with(Arc::new(StubDetector { faces: 1 }), 512);
        let (status, json) = send(app, verify_request(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json, rejection(ErrorKind::EmptyFile));
    }

    #[tokio::test]
    async fn test_detector_failure_is_internal_error() {
        let body = multipart_body("image", Some("image/png"), &png(16, 16));
        let (status, json) = send(
            app_with(Arc::new(FailingDetector), 1024 * 1024),
            verify_request(body),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json, rejection(ErrorKind::InternalError));
    }

    // --- Constant endpoints ---

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, json) = send(app(1), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "healthy", "service": "faceverify"}));
    }

    #[tokio::test]
    async fn test_info_lists_endpoints() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let (status, json) = send(app(1), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "faceverify");
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
        let paths: Vec<&str> = json["endpoints"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|e| e["path"].as_str())
            .collect();
        assert_eq!(paths, vec!["/verify", "/health", "/"]);
    }

    #[rstest]
    #[case(ClassificationResult::Verified { gender: Gender::F }, StatusCode::OK)]
    #[case(ClassificationResult::Rejected(ErrorKind::NoFaceDetected), StatusCode::OK)]
    #[case(ClassificationResult::Rejected(ErrorKind::MultipleFacesDetected), StatusCode::OK)]
    #[case(ClassificationResult::Rejected(ErrorKind::InvalidFileType), StatusCode::BAD_REQUEST)]
    #[case(ClassificationResult::Rejected(ErrorKind::EmptyFile), StatusCode::BAD_REQUEST)]
    #[case(ClassificationResult::Rejected(ErrorKind::CorruptedImage), StatusCode::BAD_REQUEST)]
    #[case(
        ClassificationResult::Rejected(ErrorKind::InternalError),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_status_mapping(#[case] result: ClassificationResult, #[case] expected: StatusCode) {
        assert_eq!(status_for(&result), expected);
    }
}
