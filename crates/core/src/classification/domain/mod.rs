pub mod gender;
pub mod gender_classifier;
