use serde::Serialize;
use thiserror::Error;

/// Starting JPEG quality for re-encoding, in percent (0.8 on the 0-1 scale).
pub const START_QUALITY: u8 = 80;
/// Quality floor; the reduction loop never drops below this.
pub const MIN_QUALITY: u8 = 10;
/// Quality decrement per reduction step.
pub const QUALITY_STEP: u8 = 10;

/// Expansion from binary bytes to the embeddable data-URL string: base64
/// grows payloads by 4/3, plus header and padding slack. Size budgets are
/// compared against `budget_kb * 1024 * ENCODED_SIZE_OVERHEAD`.
pub const ENCODED_SIZE_OVERHEAD: f64 = 1.37;

/// Ratio for estimating binary size back from an encoded payload's length.
pub const BASE64_BINARY_RATIO: f64 = 0.75;

/// Per-file ceiling on raw uploads. Larger files are rejected before decode.
pub const MAX_RAW_BYTES: u64 = 5 * 1024 * 1024;

/// Ceiling on the estimated binary size of a compressed image. Files still
/// above this after the quality walk are skipped during batch ingest.
pub const MAX_COMPRESSED_ESTIMATE_BYTES: u64 = 1024 * 1024;

/// Pixel bounds and size budget for one class of uploaded image.
#[derive(Debug, Clone, Copy)]
pub struct CompressionProfile {
    pub budget_kb: u32,
    pub max_width: u32,
    pub max_height: u32,
}

/// Product gallery images.
pub const PRODUCT_IMAGE: CompressionProfile = CompressionProfile {
    budget_kb: 300,
    max_width: 800,
    max_height: 600,
};

/// Post cover image.
pub const POST_COVER: CompressionProfile = CompressionProfile {
    budget_kb: 300,
    max_width: 800,
    max_height: 600,
};

/// Images referenced from post content.
pub const POST_CONTENT: CompressionProfile = CompressionProfile {
    budget_kb: 150,
    max_width: 800,
    max_height: 600,
};

/// Result of one compression run.
#[derive(Debug, Clone, Serialize)]
pub struct CompressedImage {
    /// Self-describing data URL, directly usable as an image source.
    pub encoded_data: String,
    pub width: u32,
    pub height: u32,
    /// Quality the final encode used, in percent.
    pub quality: u8,
    pub size_estimate_bytes: u64,
}

#[derive(Debug, Error)]
pub enum ImagingError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("file is larger than the {0} MB upload limit")]
    TooLarge(u64),
    #[error("failed to decode image")]
    Decode(#[source] image::ImageError),
    #[error("failed to encode image")]
    Encode(#[source] image::ImageError),
}
