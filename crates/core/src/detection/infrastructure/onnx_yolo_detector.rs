/// YOLO face detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference, NMS post-processing and the
/// mapping of boxes back to image coordinates. Keypoints emitted by pose
/// variants of the model are ignored.
use std::path::Path;

use parking_lot::Mutex;

use crate::detection::domain::face_detector::FaceDetector;
use crate::models::onnx_session::{build_session, ModelLoadError, SessionSettings};
use crate::shared::face_region::FaceRegion;
use crate::shared::inference_error::InferenceError;
use crate::shared::input_tensor::InputTensor;
use crate::shared::pixel_array::PixelArray;

/// Fallback YOLO model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Candidate floor applied before NMS. The policy threshold is applied
/// later by the face locator.
pub const DEFAULT_CANDIDATE_CONFIDENCE: f64 = 0.25;

/// NMS IoU threshold.
pub const DETECTOR_NMS_IOU: f64 = 0.45;

/// Letterbox padding value (YOLO convention).
const PAD_VALUE: f32 = 114.0 / 255.0;

/// YOLO face detector backed by an ONNX Runtime session.
pub struct OnnxYoloDetector {
    session: Mutex<ort::session::Session>,
    input_size: u32,
}

impl OnnxYoloDetector {
    /// Load a YOLO ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 640 if the shape is dynamic or unreadable.
    pub fn load(model_path: &Path, settings: &SessionSettings) -> Result<Self, ModelLoadError> {
        let session = build_session(model_path, settings)?;

        // NCHW: [1, 3, H, W]; H and W are equal for square input
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Face detector loaded from {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            input_size,
        })
    }

    /// Run the model and return candidates in letterbox coordinates.
    fn infer(&self, tensor: &InputTensor) -> Result<Vec<FaceRegion>, InferenceError> {
        let input_value = ort::value::TensorRef::from_array_view(tensor.view())
            .map_err(InferenceError::runtime)?;
        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(InferenceError::runtime)?;
        if outputs.len() == 0 {
            return Err(InferenceError::UnexpectedOutput(
                "YOLO model produced no outputs".into(),
            ));
        }
        let output = outputs[0]
            .try_extract_array::<f32>()
            .map_err(InferenceError::runtime)?;
        let shape = output.shape().to_vec();
        let data = output
            .as_slice()
            .ok_or_else(|| InferenceError::UnexpectedOutput("non-contiguous output".into()))?;
        parse_detections(data, &shape, DEFAULT_CANDIDATE_CONFIDENCE)
    }
}

impl FaceDetector for OnnxYoloDetector {
    fn detect(&self, pixels: &PixelArray) -> Result<Vec<FaceRegion>, InferenceError> {
        if pixels.is_empty() {
            return Err(InferenceError::EmptyInput);
        }

        // 1. Preprocess: letterbox + normalize → NCHW float32
        let (tensor, geometry) = letterbox(pixels, self.input_size);

        // 2. Inference + parse; the tensor is wiped as soon as the run is over
        let candidates = self.infer(&tensor);
        drop(tensor);

        // 3. NMS, then back to image coordinates
        Ok(nms(candidates?, DETECTOR_NMS_IOU)
            .iter()
            .filter_map(|det| geometry.to_image_region(det, pixels.width(), pixels.height()))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Scale and padding applied by [`letterbox`].
struct Letterbox {
    scale: f64,
    pad_x: u32,
    pad_y: u32,
}

impl Letterbox {
    /// Map a detection from letterbox space to a region clamped to the image.
    /// Boxes with no area left after clamping are dropped.
    fn to_image_region(&self, det: &FaceRegion, width: u32, height: u32) -> Option<FaceRegion> {
        let unpad = |v: f64, pad: u32, limit: u32| {
            ((v - pad as f64) / self.scale).clamp(0.0, limit as f64)
        };
        let x1 = unpad(det.x, self.pad_x, width);
        let y1 = unpad(det.y, self.pad_y, height);
        let x2 = unpad(det.x + det.width, self.pad_x, width);
        let y2 = unpad(det.y + det.height, self.pad_y, height);
        if x2 <= x1 || y2 <= y1 {
            return None;
        }
        Some(FaceRegion::from_corners(x1, y1, x2, y2, det.confidence))
    }
}

/// Letterbox-resize an image to `target_size` × `target_size`.
fn letterbox(pixels: &PixelArray, target_size: u32) -> (InputTensor, Letterbox) {
    let fw = pixels.width() as f64;
    let fh = pixels.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).clamp(1, target_size);
    let new_h = ((fh * scale).round() as u32).clamp(1, target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    let mut tensor = InputTensor::filled(
        (1, 3, target_size as usize, target_size as usize),
        PAD_VALUE,
    );

    let src = pixels.as_ndarray(); // [H, W, C] u8
    let src_h = pixels.height() as usize;
    let src_w = pixels.width() as usize;

    // Nearest-neighbor resize + copy into padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor.set([0, c, ty, tx], src[[src_y, src_x, c]] as f32 / 255.0);
            }
        }
    }

    (
        tensor,
        Letterbox {
            scale,
            pad_x,
            pad_y,
        },
    )
}

// ---------------------------------------------------------------------------
// Postprocessing
// ---------------------------------------------------------------------------

/// Parse `[cx, cy, w, h, conf, ...]` rows from a `[1, F, N]` or `[1, N, F]`
/// output, keeping rows with `conf >= min_confidence`.
fn parse_detections(
    data: &[f32],
    shape: &[usize],
    min_confidence: f64,
) -> Result<Vec<FaceRegion>, InferenceError> {
    if shape.len() != 3 {
        return Err(InferenceError::UnexpectedOutput(format!(
            "YOLO output shape {shape:?}"
        )));
    }
    // Fewer features than detections means the transposed layout
    let transposed = shape[1] < shape[2];
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < 5 || data.len() < num_dets * num_feats {
        return Err(InferenceError::UnexpectedOutput(format!(
            "YOLO output shape {shape:?} with {} values",
            data.len()
        )));
    }

    let value = |det: usize, feat: usize| -> f64 {
        if transposed {
            data[feat * num_dets + det] as f64
        } else {
            data[det * num_feats + feat] as f64
        }
    };

    let mut dets = Vec::new();
    for i in 0..num_dets {
        let conf = value(i, 4);
        if conf < min_confidence {
            continue;
        }
        let (cx, cy, w, h) = (value(i, 0), value(i, 1), value(i, 2), value(i, 3));
        dets.push(FaceRegion::new(cx - w / 2.0, cy - h / 2.0, w, h, conf));
    }
    Ok(dets)
}

/// Greedy NMS: sort by confidence descending, suppress overlapping boxes.
fn nms(mut dets: Vec<FaceRegion>, iou_thresh: f64) -> Vec<FaceRegion> {
    dets.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep: Vec<FaceRegion> = Vec::new();
    for det in dets {
        if keep.iter().all(|kept| kept.iou(&det) <= iou_thresh) {
            keep.push(det);
        }
    }
    keep
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
