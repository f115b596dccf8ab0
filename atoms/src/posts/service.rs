use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use std::collections::HashMap;

use super::model::{valid_status, Post, PostInput, UpdatePostPayload};
use crate::products::model::{record_size_estimate, MAX_RECORD_BYTES};

fn content_images_attr(urls: &[String]) -> AttributeValue {
    AttributeValue::L(urls.iter().map(|u| AttributeValue::S(u.clone())).collect())
}

/// Load all posts, newest first.
pub async fn list_posts(client: &DynamoClient, table_name: &str) -> Result<Vec<Post>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("POST".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("POST#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut posts = Vec::new();
    for item in result.items() {
        match Post::from_item(item) {
            Ok(post) => posts.push(post),
            Err(e) => tracing::warn!("⚠️ Skipping malformed post item: {}", e),
        }
    }

    // RFC3339 timestamps sort lexicographically
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(posts)
}

/// Published posts only, newest first. This is the public feed.
pub async fn list_published_posts(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Post>, String> {
    let posts = list_posts(client, table_name).await?;
    Ok(posts
        .into_iter()
        .filter(|p| p.status == "published")
        .collect())
}

/// Get a specific post
pub async fn get_post(
    client: &DynamoClient,
    table_name: &str,
    post_id: &str,
) -> Result<Post, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("POST".to_string()))
        .key("SK", AttributeValue::S(format!("POST#{}", post_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Post::from_item(item),
        None => Err("Post not found".to_string()),
    }
}

/// Create a post. `author` and `author_name` come from the session
/// identity of the operator submitting the draft.
pub async fn create_post(
    client: &DynamoClient,
    table_name: &str,
    input: PostInput,
    author: &str,
    author_name: &str,
) -> Result<Post, String> {
    input.validate()?;

    let post_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let post = Post {
        id: post_id.clone(),
        title: input.title,
        content: input.content,
        excerpt: input.excerpt,
        image_base64: input.image_base64,
        content_images: input.content_images,
        status: input.status,
        featured: input.featured,
        author: author.to_string(),
        author_name: author_name.to_string(),
        created_at: now.clone(),
        updated_at: now,
    };

    let size = record_size_estimate(&post);
    if size > MAX_RECORD_BYTES {
        return Err(format!(
            "Record is {} KB, over the {} KB store limit",
            size / 1024,
            MAX_RECORD_BYTES / 1024
        ));
    }

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("POST".to_string()))
        .item("SK", AttributeValue::S(format!("POST#{}", post_id)))
        .item("title", AttributeValue::S(post.title.clone()))
        .item("content", AttributeValue::S(post.content.clone()))
        .item("excerpt", AttributeValue::S(post.excerpt.clone()))
        .item("image_base64", AttributeValue::S(post.image_base64.clone()))
        .item("content_images", content_images_attr(&post.content_images))
        .item("status", AttributeValue::S(post.status.clone()))
        .item("featured", AttributeValue::Bool(post.featured))
        .item("author", AttributeValue::S(post.author.clone()))
        .item("author_name", AttributeValue::S(post.author_name.clone()))
        .item("created_at", AttributeValue::S(post.created_at.clone()))
        .item("updated_at", AttributeValue::S(post.updated_at.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(post)
}

/// Update a post. Only patched fields are written; `updated_at` is always
/// refreshed. The patched record is size-checked before the write.
pub async fn update_post(
    client: &DynamoClient,
    table_name: &str,
    post_id: &str,
    payload: UpdatePostPayload,
) -> Result<Post, String> {
    if let Some(status) = &payload.status {
        if !valid_status(status) {
            return Err(format!("Unknown status: {}", status));
        }
    }

    let mut patched = get_post(client, table_name, post_id).await?;
    payload.apply_to(&mut patched);
    let size = record_size_estimate(&patched);
    if size > MAX_RECORD_BYTES {
        return Err(format!(
            "Record is {} KB, over the {} KB store limit",
            size / 1024,
            MAX_RECORD_BYTES / 1024
        ));
    }

    let mut update_expr = vec![];
    let mut expr_names = HashMap::new();
    let mut expr_values = HashMap::new();

    if let Some(title) = payload.title {
        update_expr.push("#title = :title");
        expr_names.insert("#title".to_string(), "title".to_string());
        expr_values.insert(":title".to_string(), AttributeValue::S(title));
    }
    if let Some(content) = payload.content {
        update_expr.push("#content = :content");
        expr_names.insert("#content".to_string(), "content".to_string());
        expr_values.insert(":content".to_string(), AttributeValue::S(content));
    }
    if let Some(excerpt) = payload.excerpt {
        update_expr.push("#excerpt = :excerpt");
        expr_names.insert("#excerpt".to_string(), "excerpt".to_string());
        expr_values.insert(":excerpt".to_string(), AttributeValue::S(excerpt));
    }
    if let Some(image_base64) = payload.image_base64 {
        update_expr.push("#image_base64 = :image_base64");
        expr_names.insert("#image_base64".to_string(), "image_base64".to_string());
        expr_values.insert(":image_base64".to_string(), AttributeValue::S(image_base64));
    }
    if let Some(content_images) = payload.content_images {
        update_expr.push("#content_images = :content_images");
        expr_names.insert("#content_images".to_string(), "content_images".to_string());
        expr_values.insert(
            ":content_images".to_string(),
            content_images_attr(&content_images),
        );
    }
    if let Some(status) = payload.status {
        update_expr.push("#status = :status");
        expr_names.insert("#status".to_string(), "status".to_string());
        expr_values.insert(":status".to_string(), AttributeValue::S(status));
    }
    if let Some(featured) = payload.featured {
        update_expr.push("#featured = :featured");
        expr_names.insert("#featured".to_string(), "featured".to_string());
        expr_values.insert(":featured".to_string(), AttributeValue::Bool(featured));
    }

    update_expr.push("#updated_at = :updated_at");
    expr_names.insert("#updated_at".to_string(), "updated_at".to_string());
    expr_values.insert(
        ":updated_at".to_string(),
        AttributeValue::S(chrono::Utc::now().to_rfc3339()),
    );

    let update_expression = format!("SET {}", update_expr.join(", "));
    let mut builder = client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("POST".to_string()))
        .key("SK", AttributeValue::S(format!("POST#{}", post_id)))
        .update_expression(update_expression);

    for (k, v) in expr_names {
        builder = builder.expression_attribute_names(k, v);
    }
    for (k, v) in expr_values {
        builder = builder.expression_attribute_values(k, v);
    }

    builder
        .send()
        .await
        .map_err(|e| format!("DynamoDB update_item error: {}", e))?;

    get_post(client, table_name, post_id).await
}

/// Delete a post
pub async fn delete_post(
    client: &DynamoClient,
    table_name: &str,
    post_id: &str,
) -> Result<(), String> {
    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("POST".to_string()))
        .key("SK", AttributeValue::S(format!("POST#{}", post_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}
