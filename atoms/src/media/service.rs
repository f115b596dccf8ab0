use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use base64::{engine::general_purpose::STANDARD, Engine};

use super::model::{UploadPayload, UploadResult};
use crate::imaging::compress_to_jpeg;
use crate::imaging::model::POST_CONTENT;

/// Replace path-hostile characters so the file name can ride in the key.
fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Stored objects are always re-encoded JPEGs, so the key carries a `.jpg`
/// extension regardless of what the upload was called.
fn jpeg_file_name(name: &str) -> String {
    let cleaned = sanitize_file_name(name);
    let stem = cleaned
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(&cleaned);
    if stem.is_empty() {
        "file.jpg".to_string()
    } else {
        format!("{}.jpg", stem)
    }
}

fn sanitize_prefix(prefix: &str) -> Result<String, String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        return Err("Upload prefix is required".to_string());
    }
    if trimmed.contains("..") || trimmed.contains(' ') {
        return Err(format!("Invalid upload prefix: {}", prefix));
    }
    Ok(trimmed.to_string())
}

/// Compress one uploaded image and store it, returning its public URL.
///
/// These images ride in post bodies by reference, so they get the tighter
/// post-content budget before the write. Keys are
/// `{prefix}/{unix_millis}_{file_name}`, so every call produces a new
/// object; a retried upload is a new object, never an overwrite.
pub async fn upload_media(
    client: &S3Client,
    bucket: &str,
    payload: UploadPayload,
) -> Result<UploadResult, String> {
    let bytes = STANDARD
        .decode(&payload.data)
        .map_err(|_| "Could not read file data".to_string())?;
    let jpeg = compress_to_jpeg(&bytes, &payload.content_type, &POST_CONTENT)
        .await
        .map_err(|e| e.to_string())?;

    let prefix = sanitize_prefix(&payload.prefix)?;
    let key = format!(
        "{}/{}_{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        jpeg_file_name(&payload.file_name)
    );

    client
        .put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(jpeg))
        .content_type("image/jpeg")
        .send()
        .await
        .map_err(|e| format!("S3 put_object error: {}", e))?;

    tracing::info!("✅ Uploaded media to {}", key);
    let url = format!("https://{}.s3.amazonaws.com/{}", bucket, key);
    Ok(UploadResult { url, key })
}
