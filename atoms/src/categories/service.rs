use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{name_taken, with_default_bucket, Category, DEFAULT_CATEGORY_ID};

/// Load all categories, with the default bucket merged in.
pub async fn list_categories(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Category>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("CATEGORY".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("CATEGORY#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut categories = Vec::new();
    for item in result.items() {
        match Category::from_item(item) {
            Ok(category) => categories.push(category),
            Err(e) => tracing::warn!("⚠️ Skipping malformed category item: {}", e),
        }
    }
    Ok(with_default_bucket(categories))
}

/// Get a specific category
pub async fn get_category(
    client: &DynamoClient,
    table_name: &str,
    category_id: &str,
) -> Result<Category, String> {
    if category_id == DEFAULT_CATEGORY_ID {
        return Ok(Category::default_bucket());
    }

    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("CATEGORY".to_string()))
        .key("SK", AttributeValue::S(format!("CATEGORY#{}", category_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Category::from_item(item),
        None => Err("Category not found".to_string()),
    }
}

/// Create a category. Duplicate names (case-insensitive, including the
/// default bucket) are rejected. `created_by` is the operator's email.
pub async fn create_category(
    client: &DynamoClient,
    table_name: &str,
    name: &str,
    created_by: &str,
) -> Result<Category, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Category name is required".to_string());
    }
    let existing = list_categories(client, table_name).await?;
    if name_taken(&existing, name, None) {
        return Err("Category name already exists".to_string());
    }

    let category_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();

    client
        .put_item()
        .table_name(table_name)
        .item("PK", AttributeValue::S("CATEGORY".to_string()))
        .item("SK", AttributeValue::S(format!("CATEGORY#{}", category_id)))
        .item("name", AttributeValue::S(name.to_string()))
        .item("is_default", AttributeValue::Bool(false))
        .item("created_at", AttributeValue::S(now.clone()))
        .item("created_by", AttributeValue::S(created_by.to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(Category {
        id: category_id,
        name: name.to_string(),
        is_default: false,
        created_at: now,
        created_by: created_by.to_string(),
    })
}

/// Rename a category. The default bucket cannot be renamed.
pub async fn update_category(
    client: &DynamoClient,
    table_name: &str,
    category_id: &str,
    name: &str,
) -> Result<Category, String> {
    if category_id == DEFAULT_CATEGORY_ID {
        return Err("The default category cannot be changed".to_string());
    }
    let name = name.trim();
    if name.is_empty() {
        return Err("Category name is required".to_string());
    }
    let existing = list_categories(client, table_name).await?;
    if name_taken(&existing, name, Some(category_id)) {
        return Err("Category name already exists".to_string());
    }

    client
        .update_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("CATEGORY".to_string()))
        .key("SK", AttributeValue::S(format!("CATEGORY#{}", category_id)))
        .update_expression("SET #name = :name")
        .expression_attribute_names("#name", "name")
        .expression_attribute_values(":name", AttributeValue::S(name.to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB update_item error: {}", e))?;

    get_category(client, table_name, category_id).await
}

/// Delete a category. The default bucket cannot be deleted; products that
/// pointed at the deleted id fall back to it in listings.
pub async fn delete_category(
    client: &DynamoClient,
    table_name: &str,
    category_id: &str,
) -> Result<(), String> {
    if category_id == DEFAULT_CATEGORY_ID {
        return Err("The default category cannot be deleted".to_string());
    }

    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("CATEGORY".to_string()))
        .key("SK", AttributeValue::S(format!("CATEGORY#{}", category_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}
