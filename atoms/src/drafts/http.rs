use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};
use serde::Deserialize;

use super::model::{Draft, DraftKind, FilePayload};
use super::store::DraftStore;
use crate::posts::service::{create_post, get_post, update_post};
use crate::products::service::{create_product, get_product, update_product};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenDraftPayload {
    pub kind: DraftKind,
    /// Set to edit an existing record; the draft is seeded from it.
    pub record_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IngestPayload {
    pub files: Vec<FilePayload>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderPayload {
    pub from: usize,
    pub to: usize,
}

fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

fn error_response(status: StatusCode, message: &str) -> Result<Response<Body>, LambdaError> {
    json_response(status, serde_json::json!({"error": message}).to_string())
}

fn service_error(e: &str) -> Result<Response<Body>, LambdaError> {
    if e.ends_with("not found") {
        error_response(StatusCode::NOT_FOUND, e)
    } else if e.contains("store limit") {
        error_response(StatusCode::PAYLOAD_TOO_LARGE, e)
    } else {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, e)
    }
}

async fn seed_draft(
    store: &DraftStore,
    client: &DynamoClient,
    table_name: &str,
    kind: DraftKind,
    record_id: &str,
) -> Result<Draft, String> {
    match kind {
        DraftKind::Product => {
            let product = get_product(client, table_name, record_id).await?;
            let mut fields = serde_json::to_value(&product)
                .map_err(|e| format!("Could not serialize product: {}", e))?
                .as_object()
                .cloned()
                .unwrap_or_default();
            for key in ["id", "imageBase64", "additionalImages", "createdAt", "updatedAt"] {
                fields.remove(key);
            }
            Ok(store
                .open_for_record(
                    kind,
                    record_id,
                    fields,
                    Some(&product.image_base64),
                    &product.additional_images,
                )
                .await)
        }
        DraftKind::Post => {
            let post = get_post(client, table_name, record_id).await?;
            let mut fields = serde_json::to_value(&post)
                .map_err(|e| format!("Could not serialize post: {}", e))?
                .as_object()
                .cloned()
                .unwrap_or_default();
            for key in ["id", "imageBase64", "author", "authorName", "createdAt", "updatedAt"] {
                fields.remove(key);
            }
            Ok(store
                .open_for_record(kind, record_id, fields, Some(&post.image_base64), &[])
                .await)
        }
    }
}

/// HTTP Handler: POST /drafts
pub async fn open_draft_handler(
    store: &DraftStore,
    client: &DynamoClient,
    table_name: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: OpenDraftPayload = serde_json::from_slice(body)?;

    match &payload.record_id {
        None => {
            let draft = store.open(payload.kind).await;
            json_response(StatusCode::CREATED, serde_json::to_string(&draft)?)
        }
        Some(record_id) => {
            match seed_draft(store, client, table_name, payload.kind, record_id).await {
                Ok(draft) => json_response(StatusCode::CREATED, serde_json::to_string(&draft)?),
                Err(e) => service_error(&e),
            }
        }
    }
}

/// HTTP Handler: GET /drafts/{id}
pub async fn get_draft_handler(
    store: &DraftStore,
    draft_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match store.get(draft_id).await {
        Some(draft) => json_response(StatusCode::OK, serde_json::to_string(&draft)?),
        None => error_response(StatusCode::NOT_FOUND, "Draft not found"),
    }
}

/// HTTP Handler: PUT /drafts/{id}
pub async fn update_draft_fields_handler(
    store: &DraftStore,
    draft_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let patch: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(body)?;

    match store.update_fields(draft_id, patch).await {
        Ok(draft) => json_response(StatusCode::OK, serde_json::to_string(&draft)?),
        Err(e) => service_error(&e),
    }
}

/// HTTP Handler: POST /drafts/{id}/images
pub async fn ingest_draft_images_handler(
    store: &DraftStore,
    draft_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: IngestPayload = serde_json::from_slice(body)?;
    let count = payload.files.len();

    match store.ingest_files(draft_id, payload.files).await {
        Ok((draft, report)) => {
            tracing::info!(
                "📥 Draft {}: ingested {}/{} files, {} warnings",
                draft_id,
                report.added.len(),
                count,
                report.warnings.len()
            );
            json_response(
                StatusCode::OK,
                serde_json::json!({"draft": draft, "report": report}).to_string(),
            )
        }
        Err(e) if e == "Draft not found" => error_response(StatusCode::NOT_FOUND, &e),
        Err(e) if e.starts_with("At most") => error_response(StatusCode::BAD_REQUEST, &e),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &e),
    }
}

/// HTTP Handler: PATCH /drafts/{id}/images/{assetId}/primary
pub async fn set_primary_image_handler(
    store: &DraftStore,
    draft_id: &str,
    asset_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match store.set_primary(draft_id, asset_id).await {
        Ok(draft) => json_response(StatusCode::OK, serde_json::to_string(&draft)?),
        Err(e) => service_error(&e),
    }
}

/// HTTP Handler: DELETE /drafts/{id}/images/{assetId}
pub async fn remove_draft_image_handler(
    store: &DraftStore,
    draft_id: &str,
    asset_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match store.remove_asset(draft_id, asset_id).await {
        Ok(draft) => json_response(StatusCode::OK, serde_json::to_string(&draft)?),
        Err(e) => service_error(&e),
    }
}

/// HTTP Handler: PATCH /drafts/{id}/images
pub async fn reorder_draft_images_handler(
    store: &DraftStore,
    draft_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: ReorderPayload = serde_json::from_slice(body)?;

    match store.reorder(draft_id, payload.from, payload.to).await {
        Ok(draft) => json_response(StatusCode::OK, serde_json::to_string(&draft)?),
        Err(e) => service_error(&e),
    }
}

/// HTTP Handler: POST /drafts/{id}/submit
///
/// Validates the draft into a typed input, persists it, and drops the
/// session. On a persistence failure the draft is restored so the caller
/// can retry without redoing compression.
pub async fn submit_draft_handler(
    store: &DraftStore,
    client: &DynamoClient,
    table_name: &str,
    draft_id: &str,
    author: &str,
    author_name: &str,
) -> Result<Response<Body>, LambdaError> {
    let Some(draft) = store.take(draft_id).await else {
        return error_response(StatusCode::NOT_FOUND, "Draft not found");
    };
    let record_id = draft.record_id.clone();

    match draft.kind {
        DraftKind::Product => {
            let input = match draft.product_input() {
                Ok(input) => input,
                Err(e) => {
                    store.restore(draft).await;
                    return error_response(StatusCode::BAD_REQUEST, &e);
                }
            };
            let result = match &record_id {
                Some(id) => update_product(client, table_name, id, input.into()).await,
                None => create_product(client, table_name, input).await,
            };
            match result {
                Ok(product) => {
                    tracing::info!("✅ Draft {} submitted as product {}", draft_id, product.id);
                    let status = if record_id.is_some() {
                        StatusCode::OK
                    } else {
                        StatusCode::CREATED
                    };
                    json_response(status, serde_json::to_string(&product)?)
                }
                Err(e) => {
                    store.restore(draft).await;
                    service_error(&e)
                }
            }
        }
        DraftKind::Post => {
            let input = match draft.post_input() {
                Ok(input) => input,
                Err(e) => {
                    store.restore(draft).await;
                    return error_response(StatusCode::BAD_REQUEST, &e);
                }
            };
            let result = match &record_id {
                Some(id) => update_post(client, table_name, id, input.into()).await,
                None => create_post(client, table_name, input, author, author_name).await,
            };
            match result {
                Ok(post) => {
                    tracing::info!("✅ Draft {} submitted as post {}", draft_id, post.id);
                    let status = if record_id.is_some() {
                        StatusCode::OK
                    } else {
                        StatusCode::CREATED
                    };
                    json_response(status, serde_json::to_string(&post)?)
                }
                Err(e) => {
                    store.restore(draft).await;
                    service_error(&e)
                }
            }
        }
    }
}

/// HTTP Handler: DELETE /drafts/{id}
pub async fn discard_draft_handler(
    store: &DraftStore,
    draft_id: &str,
) -> Result<Response<Body>, LambdaError> {
    if store.discard(draft_id).await {
        Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?)
    } else {
        error_response(StatusCode::NOT_FOUND, "Draft not found")
    }
}
