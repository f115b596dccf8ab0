// Re-export model types and the gallery manager
pub mod manager;
pub mod model;

pub use manager::{DraftGallery, MAX_GALLERY_IMAGES};
pub use model::{GalleryProjection, ImageAsset, SecondaryImage};
