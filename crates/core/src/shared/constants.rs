pub const DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const CLASSIFIER_MODEL_NAME: &str = "genderage.onnx";

/// Detections scoring below this are discarded as noise (inclusive floor).
pub const FACE_CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Exactly this many faces must be present for a verification to proceed.
pub const REQUIRED_FACE_COUNT: usize = 1;

/// Largest accepted width or height of a decoded image.
pub const MAX_IMAGE_DIMENSION: u32 = 8192;
