pub mod content_type;
pub mod image_decoder;
pub mod raw_upload;
