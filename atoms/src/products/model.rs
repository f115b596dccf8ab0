use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::gallery::SecondaryImage;

/// DynamoDB caps items at 400 KB; every record write is checked against
/// this before it is sent.
pub const MAX_RECORD_BYTES: usize = 400 * 1024;

/// Serialized size of a record, as counted by the record-size guard.
pub fn record_size_estimate<T: Serialize>(record: &T) -> usize {
    serde_json::to_string(record).map(|s| s.len()).unwrap_or(0)
}

/// Product domain model - one item in the store catalog
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Category id; unknown or empty ids fall back to the default bucket.
    pub category: String,
    pub price: i64,
    pub description: String,
    pub in_stock: bool,
    /// Primary image as an embeddable data URL, always stored first.
    pub image_base64: String,
    #[serde(default)]
    pub additional_images: Vec<SecondaryImage>,
    pub product_code: String,
    pub origin: String,
    pub size: String,
    pub color: String,
    pub material: String,
    pub weight: String,
    pub warranty: String,
    pub brand: String,
    pub created_at: String,
    pub updated_at: String,
}

impl Product {
    /// Build a product from a DynamoDB item. `id` (from the sort key) and
    /// `name` are required; everything else defaults when absent, matching
    /// what a schemaless store may hand back.
    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Product, String> {
        let sk = item
            .get("SK")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| "Product item has no sort key".to_string())?;
        let id = sk
            .strip_prefix("PRODUCT#")
            .ok_or_else(|| format!("Unexpected sort key: {}", sk))?;
        let name = item
            .get("name")
            .and_then(|v| v.as_s().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("Product {} has no name", id))?;

        let additional_images = item
            .get("additional_images")
            .and_then(|v| v.as_l().ok())
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|entry| entry.as_m().ok())
                    .map(|m| SecondaryImage {
                        base64: string_attr(m, "base64"),
                        name: string_attr(m, "name"),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Product {
            id: id.to_string(),
            name: name.to_string(),
            category: string_attr(item, "category"),
            price: item
                .get("price")
                .and_then(|v| v.as_n().ok())
                .and_then(|n| n.parse().ok())
                .unwrap_or(0),
            description: string_attr(item, "description"),
            in_stock: item
                .get("in_stock")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(true),
            image_base64: string_attr(item, "image_base64"),
            additional_images,
            product_code: string_attr(item, "product_code"),
            origin: string_attr(item, "origin"),
            size: string_attr(item, "size"),
            color: string_attr(item, "color"),
            material: string_attr(item, "material"),
            weight: string_attr(item, "weight"),
            warranty: string_attr(item, "warranty"),
            brand: string_attr(item, "brand"),
            created_at: string_attr(item, "created_at"),
            updated_at: string_attr(item, "updated_at"),
        })
    }
}

pub(crate) fn string_attr(item: &HashMap<String, AttributeValue>, key: &str) -> String {
    item.get(key)
        .and_then(|v| v.as_s().ok())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

/// Submit payload for a new or edited product. Missing fields default so a
/// half-filled form still parses; `validate` enforces the required ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub price: i64,
    pub description: String,
    pub in_stock: bool,
    pub image_base64: String,
    pub additional_images: Vec<SecondaryImage>,
    pub product_code: String,
    pub origin: String,
    pub size: String,
    pub color: String,
    pub material: String,
    pub weight: String,
    pub warranty: String,
    pub brand: String,
}

impl Default for ProductInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            category: String::new(),
            price: 0,
            description: String::new(),
            in_stock: true,
            image_base64: String::new(),
            additional_images: Vec::new(),
            product_code: String::new(),
            origin: String::new(),
            size: String::new(),
            color: String::new(),
            material: String::new(),
            weight: String::new(),
            warranty: String::new(),
            brand: String::new(),
        }
    }
}

impl ProductInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".to_string());
        }
        if self.price < 0 {
            return Err("Price must be zero or positive".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub description: Option<String>,
    pub in_stock: Option<bool>,
    pub image_base64: Option<String>,
    pub additional_images: Option<Vec<SecondaryImage>>,
    pub product_code: Option<String>,
    pub origin: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub weight: Option<String>,
    pub warranty: Option<String>,
    pub brand: Option<String>,
}

impl UpdateProductPayload {
    /// Overlay the patch on an existing product, used for the record-size
    /// guard before the update is sent.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(v) = &self.name {
            product.name = v.clone();
        }
        if let Some(v) = &self.category {
            product.category = v.clone();
        }
        if let Some(v) = self.price {
            product.price = v;
        }
        if let Some(v) = &self.description {
            product.description = v.clone();
        }
        if let Some(v) = self.in_stock {
            product.in_stock = v;
        }
        if let Some(v) = &self.image_base64 {
            product.image_base64 = v.clone();
        }
        if let Some(v) = &self.additional_images {
            product.additional_images = v.clone();
        }
        if let Some(v) = &self.product_code {
            product.product_code = v.clone();
        }
        if let Some(v) = &self.origin {
            product.origin = v.clone();
        }
        if let Some(v) = &self.size {
            product.size = v.clone();
        }
        if let Some(v) = &self.color {
            product.color = v.clone();
        }
        if let Some(v) = &self.material {
            product.material = v.clone();
        }
        if let Some(v) = &self.weight {
            product.weight = v.clone();
        }
        if let Some(v) = &self.warranty {
            product.warranty = v.clone();
        }
        if let Some(v) = &self.brand {
            product.brand = v.clone();
        }
    }
}

/// Full-field patch, used when a submitted draft replaces an existing
/// record.
impl From<ProductInput> for UpdateProductPayload {
    fn from(input: ProductInput) -> Self {
        UpdateProductPayload {
            name: Some(input.name),
            category: Some(input.category),
            price: Some(input.price),
            description: Some(input.description),
            in_stock: Some(input.in_stock),
            image_base64: Some(input.image_base64),
            additional_images: Some(input.additional_images),
            product_code: Some(input.product_code),
            origin: Some(input.origin),
            size: Some(input.size),
            color: Some(input.color),
            material: Some(input.material),
            weight: Some(input.weight),
            warranty: Some(input.warranty),
            brand: Some(input.brand),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_item(id: &str, name: &str) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::new();
        item.insert("PK".to_string(), AttributeValue::S("PRODUCT".to_string()));
        item.insert(
            "SK".to_string(),
            AttributeValue::S(format!("PRODUCT#{}", id)),
        );
        item.insert("name".to_string(), AttributeValue::S(name.to_string()));
        item
    }

    #[test]
    fn from_item_requires_name() {
        let mut item = base_item("p1", "Teapot");
        item.remove("name");
        assert!(Product::from_item(&item).is_err());
    }

    #[test]
    fn from_item_defaults_optional_fields() {
        let item = base_item("p1", "Teapot");
        let product = Product::from_item(&item).unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(product.price, 0);
        assert!(product.in_stock);
        assert!(product.additional_images.is_empty());
    }

    #[test]
    fn from_item_reads_additional_images() {
        let mut item = base_item("p1", "Teapot");
        let mut entry = HashMap::new();
        entry.insert("base64".to_string(), AttributeValue::S("data-b".to_string()));
        entry.insert("name".to_string(), AttributeValue::S("b.jpg".to_string()));
        item.insert(
            "additional_images".to_string(),
            AttributeValue::L(vec![AttributeValue::M(entry)]),
        );
        item.insert("price".to_string(), AttributeValue::N("120000".to_string()));

        let product = Product::from_item(&item).unwrap();
        assert_eq!(product.price, 120000);
        assert_eq!(product.additional_images.len(), 1);
        assert_eq!(product.additional_images[0].name, "b.jpg");
    }

    #[test]
    fn input_validation_requires_name_and_sane_price() {
        let mut input = ProductInput::default();
        assert!(input.validate().unwrap_err().contains("name"));
        input.name = "Teapot".to_string();
        input.price = -5;
        assert!(input.validate().unwrap_err().contains("Price"));
        input.price = 120000;
        assert!(input.validate().is_ok());
    }

    #[test]
    fn update_overlay_touches_only_patched_fields() {
        let item = base_item("p1", "Teapot");
        let mut product = Product::from_item(&item).unwrap();
        let patch = UpdateProductPayload {
            price: Some(99000),
            in_stock: Some(false),
            ..Default::default()
        };
        patch.apply_to(&mut product);
        assert_eq!(product.price, 99000);
        assert!(!product.in_stock);
        assert_eq!(product.name, "Teapot");
    }

    #[test]
    fn wire_shape_is_camel_case() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name":"Teapot","inStock":false,"productCode":"TP-01"}"#)
                .unwrap();
        assert!(!input.in_stock);
        assert_eq!(input.product_code, "TP-01");
    }
}
