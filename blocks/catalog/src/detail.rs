use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use shopfront_atoms::products::{self, Product};

use crate::types::ProductDetail;

/// Ordered images for the product page: primary first, then the extras,
/// empty entries dropped.
pub fn display_gallery(product: &Product) -> Vec<String> {
    let mut gallery = Vec::new();
    if !product.image_base64.is_empty() {
        gallery.push(product.image_base64.clone());
    }
    for extra in &product.additional_images {
        if !extra.base64.is_empty() {
            gallery.push(extra.base64.clone());
        }
    }
    gallery
}

/// Manual gallery navigation clamps at the ends.
pub fn step_index(current: usize, forward: bool, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if forward {
        (current + 1).min(len - 1)
    } else {
        current.saturating_sub(1)
    }
}

/// Timed advance wraps back to the first image.
pub fn auto_advance(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

/// HTTP Handler: GET /catalog/products/{id}
pub async fn product_detail_handler(
    client: &DynamoClient,
    table_name: &str,
    product_id: &str,
) -> Result<Response<Body>, Error> {
    let product = match products::get_product(client, table_name, product_id).await {
        Ok(product) => product,
        Err(e) if e == "Product not found" => {
            return Ok(Response::builder()
                .status(StatusCode::NOT_FOUND)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?);
        }
        Err(e) => {
            tracing::error!("Failed to load product {}: {}", product_id, e);
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?);
        }
    };

    let detail = ProductDetail {
        gallery: display_gallery(&product),
        product,
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&detail)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopfront_atoms::gallery::SecondaryImage;

    fn product_with_images(primary: &str, extras: &[&str]) -> Product {
        Product {
            id: "p1".to_string(),
            name: "Sencha".to_string(),
            category: "tea".to_string(),
            price: 12,
            description: String::new(),
            in_stock: true,
            image_base64: primary.to_string(),
            additional_images: extras
                .iter()
                .map(|data| SecondaryImage {
                    base64: data.to_string(),
                    name: "extra.jpg".to_string(),
                })
                .collect(),
            product_code: String::new(),
            origin: String::new(),
            size: String::new(),
            color: String::new(),
            material: String::new(),
            weight: String::new(),
            warranty: String::new(),
            brand: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn gallery_puts_primary_first_and_drops_empties() {
        let product = product_with_images("primary", &["extra1", "", "extra2"]);
        assert_eq!(display_gallery(&product), vec!["primary", "extra1", "extra2"]);
    }

    #[test]
    fn gallery_of_imageless_product_is_empty() {
        let product = product_with_images("", &[]);
        assert!(display_gallery(&product).is_empty());
    }

    #[test]
    fn manual_navigation_clamps_at_both_ends() {
        assert_eq!(step_index(0, false, 3), 0);
        assert_eq!(step_index(2, true, 3), 2);
        assert_eq!(step_index(1, true, 3), 2);
        assert_eq!(step_index(1, false, 3), 0);
        assert_eq!(step_index(0, true, 0), 0);
    }

    #[test]
    fn auto_advance_wraps_to_start() {
        assert_eq!(auto_advance(0, 3), 1);
        assert_eq!(auto_advance(2, 3), 0);
        assert_eq!(auto_advance(0, 1), 0);
        assert_eq!(auto_advance(0, 0), 0);
    }
}
