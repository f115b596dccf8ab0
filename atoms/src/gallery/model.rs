use serde::{Deserialize, Serialize};

/// One image in a draft gallery. Owned by the editing session; only the
/// derived projection is ever persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ImageAsset {
    pub id: String,
    pub source_name: String,
    /// Embeddable data URL produced by the compression pipeline.
    pub encoded_data: String,
    pub size_estimate_bytes: u64,
    pub is_primary: bool,
}

/// `{base64, name}` pair as persisted in a record's additional images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryImage {
    pub base64: String,
    pub name: String,
}

/// Plain-old-data projection of a gallery for persistence. The primary is
/// normalized to first regardless of its position in the editing gallery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryProjection {
    pub primary_encoded_data: String,
    pub secondary_images: Vec<SecondaryImage>,
}
