use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;

use super::model::{
    CompressedImage, CompressionProfile, ImagingError, BASE64_BINARY_RATIO,
    ENCODED_SIZE_OVERHEAD, MAX_RAW_BYTES, MIN_QUALITY, QUALITY_STEP, START_QUALITY,
};

/// Output dimensions for a raster bounded by `max_width`/`max_height`.
///
/// Scales down only, preserving aspect ratio. The bound applies to the
/// dominant dimension: landscape rasters clamp width, everything else
/// clamps height.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width > height {
        if width > max_width {
            let scaled = (height as f64 * max_width as f64 / width as f64).round() as u32;
            return (max_width, scaled.max(1));
        }
    } else if height > max_height {
        let scaled = (width as f64 * max_height as f64 / height as f64).round() as u32;
        return (scaled.max(1), max_height);
    }
    (width, height)
}

fn encode_jpeg(raster: &image::RgbImage, quality: u8) -> Result<Vec<u8>, ImagingError> {
    let mut bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut bytes, quality);
    encoder
        .encode(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            image::ColorType::Rgb8,
        )
        .map_err(ImagingError::Encode)?;
    Ok(bytes)
}

const DATA_URL_PREFIX: &str = "data:image/jpeg;base64,";

fn to_data_url(jpeg: &[u8]) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(jpeg))
}

/// Length of the data URL a JPEG of `jpeg_len` bytes would produce.
/// Padded base64 emits 4 characters per 3 input bytes.
fn data_url_len(jpeg_len: usize) -> usize {
    DATA_URL_PREFIX.len() + (jpeg_len + 2) / 3 * 4
}

/// Validate, decode, and scale an upload onto the profile's bounds.
/// Scales down only, preserving aspect ratio.
fn fit_surface(
    bytes: &[u8],
    content_type: &str,
    profile: &CompressionProfile,
) -> Result<image::RgbImage, ImagingError> {
    if !content_type.starts_with("image/") {
        return Err(ImagingError::UnsupportedType(content_type.to_string()));
    }
    if bytes.len() as u64 > MAX_RAW_BYTES {
        return Err(ImagingError::TooLarge(MAX_RAW_BYTES / (1024 * 1024)));
    }

    let raster = image::load_from_memory(bytes).map_err(ImagingError::Decode)?;
    let (width, height) = (raster.width(), raster.height());
    let (out_width, out_height) =
        fit_dimensions(width, height, profile.max_width, profile.max_height);

    if (out_width, out_height) == (width, height) {
        Ok(raster.to_rgb8())
    } else {
        Ok(raster
            .resize_exact(out_width, out_height, image::imageops::FilterType::Triangle)
            .to_rgb8())
    }
}

/// Walk quality down from 0.8 in 0.1 steps until the data-URL form of the
/// encode fits `budget_kb * 1024 * ENCODED_SIZE_OVERHEAD` or the 0.1 floor
/// is hit. The floor bounds the loop at 8 encodes for any budget. A budget
/// miss at the floor is not an error; the smallest encode is returned as-is.
fn walk_quality(
    surface: &image::RgbImage,
    profile: &CompressionProfile,
) -> Result<(Vec<u8>, u8), ImagingError> {
    let size_limit = profile.budget_kb as f64 * 1024.0 * ENCODED_SIZE_OVERHEAD;
    let mut quality = START_QUALITY;
    let mut jpeg = encode_jpeg(surface, quality)?;
    while data_url_len(jpeg.len()) as f64 > size_limit && quality > MIN_QUALITY {
        quality -= QUALITY_STEP;
        jpeg = encode_jpeg(surface, quality)?;
    }
    Ok((jpeg, quality))
}

/// Compress one uploaded image into an embeddable JPEG data URL.
pub async fn compress_image(
    bytes: &[u8],
    content_type: &str,
    profile: &CompressionProfile,
) -> Result<CompressedImage, ImagingError> {
    let surface = fit_surface(bytes, content_type, profile)?;
    let (jpeg, quality) = walk_quality(&surface, profile)?;

    let encoded = to_data_url(&jpeg);
    let size_estimate_bytes = (encoded.len() as f64 * BASE64_BINARY_RATIO) as u64;
    Ok(CompressedImage {
        encoded_data: encoded,
        width: surface.width(),
        height: surface.height(),
        quality,
        size_estimate_bytes,
    })
}

/// Same pipeline as [`compress_image`], returning raw JPEG bytes instead
/// of a data URL. The media upload path stores these in object storage and
/// hands back a URL.
pub async fn compress_to_jpeg(
    bytes: &[u8],
    content_type: &str,
    profile: &CompressionProfile,
) -> Result<Vec<u8>, ImagingError> {
    let surface = fit_surface(bytes, content_type, profile)?;
    let (jpeg, _) = walk_quality(&surface, profile)?;
    Ok(jpeg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::model::PRODUCT_IMAGE;

    fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let mut bytes = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut bytes, 85);
        encoder
            .encode(img.as_raw(), width, height, image::ColorType::Rgb8)
            .unwrap();
        bytes
    }

    #[test]
    fn keeps_dimensions_inside_bounds() {
        assert_eq!(fit_dimensions(640, 480, 800, 600), (640, 480));
        assert_eq!(fit_dimensions(800, 600, 800, 600), (800, 600));
    }

    #[test]
    fn clamps_landscape_width() {
        assert_eq!(fit_dimensions(3000, 2000, 800, 600), (800, 533));
    }

    #[test]
    fn clamps_portrait_height() {
        assert_eq!(fit_dimensions(2000, 3000, 800, 600), (533, 600));
    }

    #[test]
    fn square_raster_clamps_height() {
        assert_eq!(fit_dimensions(1000, 1000, 800, 600), (600, 600));
    }

    #[test]
    fn bound_applies_to_dominant_dimension_only() {
        // Width is dominant and fits, so the height bound is not consulted.
        assert_eq!(fit_dimensions(700, 650, 800, 600), (700, 650));
    }

    #[test]
    fn downscale_preserves_aspect_ratio() {
        let (w, h) = fit_dimensions(3000, 2000, 800, 600);
        let original = 3000.0 / 2000.0;
        let scaled = w as f64 / h as f64;
        assert!((original - scaled).abs() < 0.01);
    }

    #[tokio::test]
    async fn compress_returns_data_url_within_budget() {
        let bytes = sample_jpeg(640, 480);
        let result = compress_image(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap();
        assert!(result.encoded_data.starts_with("data:image/jpeg;base64,"));
        assert_eq!((result.width, result.height), (640, 480));
        assert_eq!(result.quality, START_QUALITY);
        let limit = PRODUCT_IMAGE.budget_kb as f64 * 1024.0 * ENCODED_SIZE_OVERHEAD;
        assert!((result.encoded_data.len() as f64) <= limit);
    }

    #[tokio::test]
    async fn compress_downscales_oversized_raster() {
        let bytes = sample_jpeg(3000, 2000);
        let result = compress_image(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap();
        assert_eq!((result.width, result.height), (800, 533));
    }

    #[tokio::test]
    async fn quality_floor_bounds_the_walk() {
        let bytes = sample_jpeg(640, 480);
        let starved = CompressionProfile {
            budget_kb: 0,
            max_width: 800,
            max_height: 600,
        };
        let result = compress_image(&bytes, "image/jpeg", &starved).await.unwrap();
        // An unreachable budget walks all the way to the floor and stops:
        // 1 initial encode plus at most 7 reductions.
        assert_eq!(result.quality, MIN_QUALITY);
        assert!((START_QUALITY - result.quality) / QUALITY_STEP <= 7);
        assert!(!result.encoded_data.is_empty());
    }

    #[tokio::test]
    async fn raw_jpeg_variant_matches_the_data_url_payload() {
        let bytes = sample_jpeg(3000, 2000);
        let jpeg = compress_to_jpeg(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap();
        let raster = image::load_from_memory(&jpeg).unwrap();
        assert_eq!((raster.width(), raster.height()), (800, 533));

        let embedded = compress_image(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap();
        assert_eq!(embedded.encoded_data.len(), data_url_len(jpeg.len()));
    }

    #[tokio::test]
    async fn size_estimate_tracks_payload_length() {
        let bytes = sample_jpeg(320, 240);
        let result = compress_image(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap();
        let expected = (result.encoded_data.len() as f64 * BASE64_BINARY_RATIO) as u64;
        assert_eq!(result.size_estimate_bytes, expected);
    }

    #[tokio::test]
    async fn rejects_non_image_content_type() {
        let err = compress_image(b"hello", "text/plain", &PRODUCT_IMAGE)
            .await
            .unwrap_err();
        assert!(matches!(err, ImagingError::UnsupportedType(_)));
    }

    #[tokio::test]
    async fn rejects_file_over_raw_ceiling() {
        let bytes = vec![0u8; (MAX_RAW_BYTES + 1) as usize];
        let err = compress_image(&bytes, "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap_err();
        assert!(matches!(err, ImagingError::TooLarge(_)));
    }

    #[tokio::test]
    async fn fails_on_undecodable_bytes() {
        let err = compress_image(b"not an image at all", "image/jpeg", &PRODUCT_IMAGE)
            .await
            .unwrap_err();
        assert!(matches!(err, ImagingError::Decode(_)));
    }
}
