pub mod model_registry;
pub mod model_resolver;
pub mod onnx_session;
