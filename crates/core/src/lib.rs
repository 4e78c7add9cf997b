pub mod classification;
pub mod detection;
pub mod models;
pub mod pipeline;
pub mod shared;
pub mod upload;
