use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::model::{
    record_size_estimate, Product, ProductInput, UpdateProductPayload, MAX_RECORD_BYTES,
};
use crate::gallery::SecondaryImage;

fn secondary_images_attr(images: &[SecondaryImage]) -> AttributeValue {
    AttributeValue::L(
        images
            .iter()
            .map(|img| {
                let mut entry = HashMap::new();
                entry.insert("base64".to_string(), AttributeValue::S(img.base64.clone()));
                entry.insert("name".to_string(), AttributeValue::S(img.name.clone()));
                AttributeValue::M(entry)
            })
            .collect(),
    )
}

/// Load every product in the catalog. Malformed items are skipped, not
/// fatal; the store is schemaless and old records may predate validation.
pub async fn list_products(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Vec<Product>, String> {
    let result = client
        .query()
        .table_name(table_name)
        .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
        .expression_attribute_values(":pk", AttributeValue::S("PRODUCT".to_string()))
        .expression_attribute_values(":sk_prefix", AttributeValue::S("PRODUCT#".to_string()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB query error: {}", e))?;

    let mut products = Vec::new();
    for item in result.items() {
        match Product::from_item(item) {
            Ok(product) => products.push(product),
            Err(e) => tracing::warn!("⚠️ Skipping malformed product item: {}", e),
        }
    }
    Ok(products)
}

/// Get a specific product
pub async fn get_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Product, String> {
    let result = client
        .get_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(format!("PRODUCT#{}", product_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB get_item error: {}", e))?;

    match result.item() {
        Some(item) => Product::from_item(item),
        None => Err("Product not found".to_string()),
    }
}

/// Create a new product from a validated submit payload.
pub async fn create_product(
    client: &DynamoClient,
    table_name: &str,
    input: ProductInput,
) -> Result<Product, String> {
    input.validate()?;

    let product_id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let product = Product {
        id: product_id.clone(),
        name: input.name,
        category: input.category,
        price: input.price,
        description: input.description,
        in_stock: input.in_stock,
        image_base64: input.image_base64,
        additional_images: input.additional_images,
        product_code: input.product_code,
        origin: input.origin,
        size: input.size,
        color: input.color,
        material: input.material,
        weight: input.weight,
        warranty: input.warranty,
        brand: input.brand,
        created_at: now.clone(),
        updated_at: now,
    };

    let size = record_size_estimate(&product);
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
        .item("PK", AttributeValue::S("PRODUCT".to_string()))
        .item("SK", AttributeValue::S(format!("PRODUCT#{}", product_id)))
        .item("name", AttributeValue::S(product.name.clone()))
        .item("category", AttributeValue::S(product.category.clone()))
        .item("price", AttributeValue::N(product.price.to_string()))
        .item("description", AttributeValue::S(product.description.clone()))
        .item("in_stock", AttributeValue::Bool(product.in_stock))
        .item("image_base64", AttributeValue::S(product.image_base64.clone()))
        .item("additional_images", secondary_images_attr(&product.additional_images))
        .item("product_code", AttributeValue::S(product.product_code.clone()))
        .item("origin", AttributeValue::S(product.origin.clone()))
        .item("size", AttributeValue::S(product.size.clone()))
        .item("color", AttributeValue::S(product.color.clone()))
        .item("material", AttributeValue::S(product.material.clone()))
        .item("weight", AttributeValue::S(product.weight.clone()))
        .item("warranty", AttributeValue::S(product.warranty.clone()))
        .item("brand", AttributeValue::S(product.brand.clone()))
        .item("created_at", AttributeValue::S(product.created_at.clone()))
        .item("updated_at", AttributeValue::S(product.updated_at.clone()))
        .send()
        .await
        .map_err(|e| format!("DynamoDB put_item error: {}", e))?;

    Ok(product)
}

/// Update a product. Only patched fields are written; `updated_at` is
/// always refreshed. The patched record is size-checked before the write.
pub async fn update_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
    payload: UpdateProductPayload,
) -> Result<Product, String> {
    let mut patched = get_product(client, table_name, product_id).await?;
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

    if let Some(name) = payload.name {
        update_expr.push("#name = :name");
        expr_names.insert("#name".to_string(), "name".to_string());
        expr_values.insert(":name".to_string(), AttributeValue::S(name));
    }
    if let Some(category) = payload.category {
        update_expr.push("#category = :category");
        expr_names.insert("#category".to_string(), "category".to_string());
        expr_values.insert(":category".to_string(), AttributeValue::S(category));
    }
    if let Some(price) = payload.price {
        update_expr.push("#price = :price");
        expr_names.insert("#price".to_string(), "price".to_string());
        expr_values.insert(":price".to_string(), AttributeValue::N(price.to_string()));
    }
    if let Some(description) = payload.description {
        update_expr.push("#description = :description");
        expr_names.insert("#description".to_string(), "description".to_string());
        expr_values.insert(":description".to_string(), AttributeValue::S(description));
    }
    if let Some(in_stock) = payload.in_stock {
        update_expr.push("#in_stock = :in_stock");
        expr_names.insert("#in_stock".to_string(), "in_stock".to_string());
        expr_values.insert(":in_stock".to_string(), AttributeValue::Bool(in_stock));
    }
    if let Some(image_base64) = payload.image_base64 {
        update_expr.push("#image_base64 = :image_base64");
        expr_names.insert("#image_base64".to_string(), "image_base64".to_string());
        expr_values.insert(":image_base64".to_string(), AttributeValue::S(image_base64));
    }
    if let Some(additional_images) = payload.additional_images {
        update_expr.push("#additional_images = :additional_images");
        expr_names.insert(
            "#additional_images".to_string(),
            "additional_images".to_string(),
        );
        expr_values.insert(
            ":additional_images".to_string(),
            secondary_images_attr(&additional_images),
        );
    }
    if let Some(product_code) = payload.product_code {
        update_expr.push("#product_code = :product_code");
        expr_names.insert("#product_code".to_string(), "product_code".to_string());
        expr_values.insert(":product_code".to_string(), AttributeValue::S(product_code));
    }
    if let Some(origin) = payload.origin {
        update_expr.push("#origin = :origin");
        expr_names.insert("#origin".to_string(), "origin".to_string());
        expr_values.insert(":origin".to_string(), AttributeValue::S(origin));
    }
    if let Some(size) = payload.size {
        update_expr.push("#size = :size");
        expr_names.insert("#size".to_string(), "size".to_string());
        expr_values.insert(":size".to_string(), AttributeValue::S(size));
    }
    if let Some(color) = payload.color {
        update_expr.push("#color = :color");
        expr_names.insert("#color".to_string(), "color".to_string());
        expr_values.insert(":color".to_string(), AttributeValue::S(color));
    }
    if let Some(material) = payload.material {
        update_expr.push("#material = :material");
        expr_names.insert("#material".to_string(), "material".to_string());
        expr_values.insert(":material".to_string(), AttributeValue::S(material));
    }
    if let Some(weight) = payload.weight {
        update_expr.push("#weight = :weight");
        expr_names.insert("#weight".to_string(), "weight".to_string());
        expr_values.insert(":weight".to_string(), AttributeValue::S(weight));
    }
    if let Some(warranty) = payload.warranty {
        update_expr.push("#warranty = :warranty");
        expr_names.insert("#warranty".to_string(), "warranty".to_string());
        expr_values.insert(":warranty".to_string(), AttributeValue::S(warranty));
    }
    if let Some(brand) = payload.brand {
        update_expr.push("#brand = :brand");
        expr_names.insert("#brand".to_string(), "brand".to_string());
        expr_values.insert(":brand".to_string(), AttributeValue::S(brand));
    }

    // updated_at is refreshed on every write
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
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(format!("PRODUCT#{}", product_id)))
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

    get_product(client, table_name, product_id).await
}

/// Delete a product
pub async fn delete_product(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<(), String> {
    client
        .delete_item()
        .table_name(table_name)
        .key("PK", AttributeValue::S("PRODUCT".to_string()))
        .key("SK", AttributeValue::S(format!("PRODUCT#{}", product_id)))
        .send()
        .await
        .map_err(|e| format!("DynamoDB delete_item error: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::BehaviorVersion;

    // The size guard fires before any DynamoDB call, so an unconfigured
    // client is enough here.
    fn dynamo_test_client() -> DynamoClient {
        let config = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .build();
        DynamoClient::from_conf(config)
    }

    #[tokio::test]
    async fn oversized_record_is_rejected_before_the_write() {
        let input = ProductInput {
            name: "Teapot".to_string(),
            image_base64: "x".repeat(MAX_RECORD_BYTES + 1),
            ..Default::default()
        };
        let err = create_product(&dynamo_test_client(), "shopfront", input)
            .await
            .unwrap_err();
        assert!(err.contains("store limit"));
    }

    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_write() {
        let err = create_product(&dynamo_test_client(), "shopfront", ProductInput::default())
            .await
            .unwrap_err();
        assert!(err.contains("name"));
    }
}
