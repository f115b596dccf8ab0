use aws_sdk_s3::Client as S3Client;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::UploadPayload;
use super::service::upload_media;

/// HTTP Handler: POST /media/uploads
pub async fn upload_media_handler(
    client: &S3Client,
    bucket: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UploadPayload = serde_json::from_slice(body)?;

    match upload_media(client, bucket, payload).await {
        Ok(result) => Ok(Response::builder()
            .status(StatusCode::CREATED)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&result)?.into())
            .map_err(Box::new)?),
        Err(e) if e.starts_with("S3 ") => Ok(Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
        Err(e) => Ok(Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::json!({"error": e}).to_string().into())
            .map_err(Box::new)?),
    }
}
