use catalog_block::types::ProductFilter;
use catalog_block::{browse, detail};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, RequestExt, Response,
};
use shopfront_atoms as atoms;
use shopfront_shared::{auth, contact, AppState};
use std::sync::Arc;

use shopfront_shared::auth::AuthContext;

/// Main Lambda handler - routes requests to public and admin endpoints
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("🚀 API invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        return Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Access-Control-Allow-Origin", "*")
            .header(
                "Access-Control-Allow-Methods",
                "GET,POST,PUT,PATCH,DELETE,OPTIONS",
            )
            .header("Access-Control-Allow-Headers", "Content-Type,Authorization")
            .body(Body::Empty)
            .map_err(Box::new)?);
    }

    // Login (public)
    if path == "/auth/login" {
        return match method {
            &Method::POST => {
                auth::login(
                    &state.cognito_client,
                    &state.cognito_client_id,
                    &state.cognito_client_secret,
                    body,
                )
                .await
            }
            _ => method_not_allowed(),
        };
    }

    // Contact form (public)
    if path == "/contact" {
        return match method {
            &Method::POST => {
                contact::handle_contact(
                    &state.ses_client,
                    &state.contact_from_email,
                    &state.contact_email,
                    body,
                )
                .await
            }
            _ => method_not_allowed(),
        };
    }

    // Storefront page compositions (public)
    if path.starts_with("/catalog") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        return match (method, parts.as_slice()) {
            // GET /catalog/home - per-category carousel sections
            (&Method::GET, ["catalog", "home"]) => {
                browse::home_page_handler(&state.dynamo_client, &state.table_name).await
            }
            // GET /catalog/browse - filtered and sorted product listing
            (&Method::GET, ["catalog", "browse"]) => {
                let filter = ProductFilter {
                    search: query_param(&event, "search"),
                    category: query_param(&event, "category"),
                    price_range: query_param(&event, "priceRange"),
                    sort: query_param(&event, "sort"),
                };
                browse::browse_page_handler(&state.dynamo_client, &state.table_name, &filter)
                    .await
            }
            // GET /catalog/products/{id} - product page with display gallery
            (&Method::GET, ["catalog", "products", product_id]) => {
                detail::product_detail_handler(&state.dynamo_client, &state.table_name, product_id)
                    .await
            }
            _ => not_found(),
        };
    }

    // Products: reads are public, writes need an admin principal
    if path.starts_with("/products") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, parts.as_slice()) {
            // GET /products - list catalog
            (&Method::GET, ["products"]) => {
                return atoms::products::http::list_products_handler(
                    &state.dynamo_client,
                    &state.table_name,
                )
                .await;
            }
            // GET /products/{id} - get product
            (&Method::GET, ["products", product_id]) => {
                return atoms::products::http::get_product_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    product_id,
                )
                .await;
            }
            _ => {}
        }

        let _auth_ctx = match authenticate_admin(&state, &event).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(resp),
        };

        return match (method, parts.as_slice()) {
            // POST /products - create product
            (&Method::POST, ["products"]) => {
                atoms::products::http::create_product_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    body.as_ref(),
                )
                .await
            }
            // PUT /products/{id} - update product
            (&Method::PUT, ["products", product_id]) => {
                atoms::products::http::update_product_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    product_id,
                    body.as_ref(),
                )
                .await
            }
            // DELETE /products/{id} - delete product
            (&Method::DELETE, ["products", product_id]) => {
                atoms::products::http::delete_product_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    product_id,
                )
                .await
            }
            _ => not_found(),
        };
    }

    // Categories: reads are public, writes need an admin principal
    if path.starts_with("/categories") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        if let (&Method::GET, ["categories"]) = (method, parts.as_slice()) {
            // GET /categories - list categories (default bucket included)
            return atoms::categories::http::list_categories_handler(
                &state.dynamo_client,
                &state.table_name,
            )
            .await;
        }

        let auth_ctx = match authenticate_admin(&state, &event).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(resp),
        };

        return match (method, parts.as_slice()) {
            // POST /categories - create category
            (&Method::POST, ["categories"]) => {
                atoms::categories::http::create_category_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    body.as_ref(),
                    &auth_ctx.email,
                )
                .await
            }
            // PUT /categories/{id} - rename category
            (&Method::PUT, ["categories", category_id]) => {
                atoms::categories::http::update_category_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    category_id,
                    body.as_ref(),
                )
                .await
            }
            // DELETE /categories/{id} - delete category
            (&Method::DELETE, ["categories", category_id]) => {
                atoms::categories::http::delete_category_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    category_id,
                )
                .await
            }
            _ => not_found(),
        };
    }

    // Posts: the published feed is public, everything else is admin
    if path.starts_with("/posts") {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, parts.as_slice()) {
            // GET /posts/published - public feed
            (&Method::GET, ["posts", "published"]) => {
                return atoms::posts::http::list_published_posts_handler(
                    &state.dynamo_client,
                    &state.table_name,
                )
                .await;
            }
            // GET /posts/published/{id} - public single post
            (&Method::GET, ["posts", "published", post_id]) => {
                return atoms::posts::http::get_published_post_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    post_id,
                )
                .await;
            }
            _ => {}
        }

        let auth_ctx = match authenticate_admin(&state, &event).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(resp),
        };

        return match (method, parts.as_slice()) {
            // GET /posts - admin list, any status, optional ?search=
            (&Method::GET, ["posts"]) => {
                let search = query_param(&event, "search");
                let search = if search.is_empty() {
                    None
                } else {
                    Some(search.as_str())
                };
                atoms::posts::http::list_posts_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    search,
                )
                .await
            }
            // GET /posts/{id} - admin get, any status
            (&Method::GET, ["posts", post_id]) => {
                atoms::posts::http::get_post_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    post_id,
                )
                .await
            }
            // POST /posts - create post, author fields from the principal
            (&Method::POST, ["posts"]) => {
                atoms::posts::http::create_post_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    body.as_ref(),
                    &auth_ctx.email,
                    &auth_ctx.display_name,
                )
                .await
            }
            // PUT /posts/{id} - update post
            (&Method::PUT, ["posts", post_id]) => {
                atoms::posts::http::update_post_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    post_id,
                    body.as_ref(),
                )
                .await
            }
            // DELETE /posts/{id} - delete post
            (&Method::DELETE, ["posts", post_id]) => {
                atoms::posts::http::delete_post_handler(
                    &state.dynamo_client,
                    &state.table_name,
                    post_id,
                )
                .await
            }
            _ => not_found(),
        };
    }

    // Draft sessions (admin)
    if path.starts_with("/drafts") {
        let auth_ctx = match authenticate_admin(&state, &event).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(resp),
        };
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        return match (method, parts.as_slice()) {
            // POST /drafts - open a session (blank or seeded from a record)
            (&Method::POST, ["drafts"]) => {
                atoms::drafts::http::open_draft_handler(
                    &state.drafts,
                    &state.dynamo_client,
                    &state.table_name,
                    body.as_ref(),
                )
                .await
            }
            // GET /drafts/{id} - current session state
            (&Method::GET, ["drafts", draft_id]) => {
                atoms::drafts::http::get_draft_handler(&state.drafts, draft_id).await
            }
            // PUT /drafts/{id} - merge form fields
            (&Method::PUT, ["drafts", draft_id]) => {
                atoms::drafts::http::update_draft_fields_handler(
                    &state.drafts,
                    draft_id,
                    body.as_ref(),
                )
                .await
            }
            // DELETE /drafts/{id} - discard session
            (&Method::DELETE, ["drafts", draft_id]) => {
                atoms::drafts::http::discard_draft_handler(&state.drafts, draft_id).await
            }
            // POST /drafts/{id}/images - compress and add a file batch
            (&Method::POST, ["drafts", draft_id, "images"]) => {
                atoms::drafts::http::ingest_draft_images_handler(
                    &state.drafts,
                    draft_id,
                    body.as_ref(),
                )
                .await
            }
            // PATCH /drafts/{id}/images - reorder gallery
            (&Method::PATCH, ["drafts", draft_id, "images"]) => {
                atoms::drafts::http::reorder_draft_images_handler(
                    &state.drafts,
                    draft_id,
                    body.as_ref(),
                )
                .await
            }
            // PATCH /drafts/{id}/images/{assetId}/primary - choose cover
            (&Method::PATCH, ["drafts", draft_id, "images", asset_id, "primary"]) => {
                atoms::drafts::http::set_primary_image_handler(&state.drafts, draft_id, asset_id)
                    .await
            }
            // DELETE /drafts/{id}/images/{assetId} - remove one image
            (&Method::DELETE, ["drafts", draft_id, "images", asset_id]) => {
                atoms::drafts::http::remove_draft_image_handler(&state.drafts, draft_id, asset_id)
                    .await
            }
            // POST /drafts/{id}/submit - validate and persist the record
            (&Method::POST, ["drafts", draft_id, "submit"]) => {
                atoms::drafts::http::submit_draft_handler(
                    &state.drafts,
                    &state.dynamo_client,
                    &state.table_name,
                    draft_id,
                    &auth_ctx.email,
                    &auth_ctx.display_name,
                )
                .await
            }
            _ => not_found(),
        };
    }

    // Media uploads to object storage (admin)
    if path.starts_with("/media") {
        let _auth_ctx = match authenticate_admin(&state, &event).await {
            Ok(ctx) => ctx,
            Err(resp) => return Ok(resp),
        };
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        return match (method, parts.as_slice()) {
            // POST /media/uploads - store an image, answer with its URL
            (&Method::POST, ["media", "uploads"]) => {
                atoms::media::http::upload_media_handler(
                    &state.s3_client,
                    &state.media_bucket,
                    body.as_ref(),
                )
                .await
            }
            _ => not_found(),
        };
    }

    // No matching route
    tracing::warn!("⚠️ No route matched - Method: {} Path: {}", method, path);
    not_found()
}

async fn authenticate_admin(
    state: &AppState,
    event: &Request,
) -> Result<AuthContext, Response<Body>> {
    let auth_header = event
        .headers()
        .get("Authorization")
        .and_then(|v| v.to_str().ok());
    auth::authenticate_admin_request(&state.cognito_client, &state.admin_emails, auth_header).await
}

fn query_param(event: &Request, key: &str) -> String {
    event
        .query_string_parameters_ref()
        .and_then(|params| params.first(key))
        .unwrap_or_default()
        .to_string()
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(
            serde_json::json!({"error": "Method not allowed"})
                .to_string()
                .into(),
        )
        .map_err(Box::new)?)
}
