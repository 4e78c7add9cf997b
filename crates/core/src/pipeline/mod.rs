pub mod classification_result;
pub mod error_kind;
pub mod verify_photo_use_case;
