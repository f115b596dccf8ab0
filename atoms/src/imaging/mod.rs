// Re-export model types and the compression entry point
pub mod compress;
pub mod model;

pub use compress::{compress_image, compress_to_jpeg, fit_dimensions};
pub use model::{CompressedImage, CompressionProfile, ImagingError};
