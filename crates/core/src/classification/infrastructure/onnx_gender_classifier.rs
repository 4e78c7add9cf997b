/// Gender classifier using an InsightFace-style attribute model via `ort`.
///
/// The model takes a 96x96 RGB face crop and emits at least two scores,
/// ordered female then male. Extra outputs (age) are ignored.
use std::path::Path;

use parking_lot::Mutex;

use crate::classification::domain::gender::GenderPrediction;
use crate::classification::domain::gender_classifier::{crop_face, GenderClassifier};
use crate::models::onnx_session::{build_session, ModelLoadError, SessionSettings};
use crate::shared::face_region::FaceRegion;
use crate::shared::inference_error::InferenceError;
use crate::shared::input_tensor::InputTensor;
use crate::shared::pixel_array::PixelArray;

pub const CLASSIFIER_INPUT_SIZE: usize = 96;

const NORM_MEAN: f32 = 127.5;
const NORM_STD: f32 = 128.0;

pub struct OnnxGenderClassifier {
    session: Mutex<ort::session::Session>,
}

impl OnnxGenderClassifier {
    pub fn load(model_path: &Path, settings: &SessionSettings) -> Result<Self, ModelLoadError> {
        let session = build_session(model_path, settings)?;
        log::info!("Gender classifier loaded from {}", model_path.display());
        Ok(Self {
            session: Mutex::new(session),
        })
    }

    fn infer(&self, tensor: &InputTensor) -> Result<Vec<f32>, InferenceError> {
        let input_value = ort::value::TensorRef::from_array_view(tensor.view())
            .map_err(InferenceError::runtime)?;
        let mut session = self.session.lock();
        let outputs = session
            .run(ort::inputs![input_value])
            .map_err(InferenceError::runtime)?;
        if outputs.len() == 0 {
            return Err(InferenceError::UnexpectedOutput(
                "classifier produced no outputs".into(),
            ));
        }
        let scores = outputs[0]
            .try_extract_array::<f32>()
            .map_err(InferenceError::runtime)?;
        Ok(scores.iter().copied().collect())
    }
}

impl GenderClassifier for OnnxGenderClassifier {
    fn classify(
        &self,
        pixels: &PixelArray,
        region: &FaceRegion,
    ) -> Result<GenderPrediction, InferenceError> {
        let crop = crop_face(pixels, region);
        if crop.is_empty() {
            return Err(InferenceError::EmptyInput);
        }
        let tensor = preprocess(&crop);
        drop(crop);

        let scores = self.infer(&tensor);
        drop(tensor);
        gender_scores(&scores?).map(GenderPrediction::from_scores)
    }
}

fn gender_scores(raw: &[f32]) -> Result<[f32; 2], InferenceError> {
    match raw {
        [female, male, ..] => Ok([*female, *male]),
        _ => Err(InferenceError::UnexpectedOutput(format!(
            "classifier produced {} scores, expected at least 2",
            raw.len()
        ))),
    }
}

/// Resize crop to 96x96, normalize, NCHW layout.
fn preprocess(crop: &PixelArray) -> InputTensor {
    let src_w = crop.width() as usize;
    let src_h = crop.height() as usize;
    let src = crop.as_ndarray();

    let mut tensor =
        InputTensor::zeros((1, 3, CLASSIFIER_INPUT_SIZE, CLASSIFIER_INPUT_SIZE));

    for y in 0..CLASSIFIER_INPUT_SIZE {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / CLASSIFIER_INPUT_SIZE as f64) as usize)
            .min(src_h - 1);
        for x in 0..CLASSIFIER_INPUT_SIZE {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / CLASSIFIER_INPUT_SIZE as f64)
                as usize)
                .min(src_w - 1);
            for c in 0..3 {
                tensor.set(
                    [0, c, y, x],
                    (src[[src_y, src_x, c]] as f32 - NORM_MEAN) / NORM_STD,
                );
            }
        }
    }

    tensor
}
