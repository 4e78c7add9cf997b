pub mod onnx_gender_classifier;
