pub mod constants;
pub mod face_region;
pub mod inference_error;
pub mod input_tensor;
pub mod pixel_array;
pub mod transient;
