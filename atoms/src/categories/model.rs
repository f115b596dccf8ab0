use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde::{Deserialize, Serialize};

use crate::products::model::string_attr;

/// Id of the built-in bucket for products without a category.
pub const DEFAULT_CATEGORY_ID: &str = "other";

/// Category domain model
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub created_at: String,
    /// Email of the operator who created it; empty for the built-in default.
    pub created_by: String,
}

impl Category {
    /// The built-in default. Always part of listings, never persisted.
    pub fn default_bucket() -> Category {
        Category {
            id: DEFAULT_CATEGORY_ID.to_string(),
            name: "Other".to_string(),
            is_default: true,
            created_at: String::new(),
            created_by: String::new(),
        }
    }

    pub fn from_item(item: &HashMap<String, AttributeValue>) -> Result<Category, String> {
        let sk = item
            .get("SK")
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| "Category item has no sort key".to_string())?;
        let id = sk
            .strip_prefix("CATEGORY#")
            .ok_or_else(|| format!("Unexpected sort key: {}", sk))?;
        let name = item
            .get("name")
            .and_then(|v| v.as_s().ok())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| format!("Category {} has no name", id))?;

        Ok(Category {
            id: id.to_string(),
            name: name.to_string(),
            is_default: item
                .get("is_default")
                .and_then(|v| v.as_bool().ok())
                .copied()
                .unwrap_or(false),
            created_at: string_attr(item, "created_at"),
            created_by: string_attr(item, "created_by"),
        })
    }
}

/// Append the default bucket when no stored category claims it.
pub fn with_default_bucket(mut categories: Vec<Category>) -> Vec<Category> {
    let has_default = categories
        .iter()
        .any(|c| c.is_default || c.id == DEFAULT_CATEGORY_ID);
    if !has_default {
        categories.push(Category::default_bucket());
    }
    categories
}

/// Case-insensitive duplicate-name check, optionally excluding one id
/// (the category being renamed).
pub fn name_taken(categories: &[Category], name: &str, exclude_id: Option<&str>) -> bool {
    let wanted = name.trim().to_lowercase();
    categories
        .iter()
        .filter(|c| exclude_id != Some(c.id.as_str()))
        .any(|c| c.name.trim().to_lowercase() == wanted)
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryPayload {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryPayload {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            is_default: false,
            created_at: String::new(),
            created_by: String::new(),
        }
    }

    #[test]
    fn default_bucket_is_appended_once() {
        let listed = with_default_bucket(vec![category("c1", "Ceramics")]);
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].id, DEFAULT_CATEGORY_ID);

        let again = with_default_bucket(listed);
        assert_eq!(again.len(), 2);
    }

    #[test]
    fn duplicate_names_match_case_insensitively() {
        let categories = vec![category("c1", "Ceramics")];
        assert!(name_taken(&categories, "ceramics", None));
        assert!(name_taken(&categories, "  CERAMICS ", None));
        assert!(!name_taken(&categories, "Glassware", None));
    }

    #[test]
    fn rename_excludes_own_id() {
        let categories = vec![category("c1", "Ceramics"), category("c2", "Glassware")];
        assert!(!name_taken(&categories, "Ceramics", Some("c1")));
        assert!(name_taken(&categories, "Glassware", Some("c1")));
    }

    #[test]
    fn from_item_requires_id_and_name() {
        let mut item = HashMap::new();
        item.insert(
            "SK".to_string(),
            AttributeValue::S("CATEGORY#c1".to_string()),
        );
        assert!(Category::from_item(&item).is_err());

        item.insert("name".to_string(), AttributeValue::S("Ceramics".to_string()));
        let parsed = Category::from_item(&item).unwrap();
        assert_eq!(parsed.id, "c1");
        assert!(!parsed.is_default);
    }
}
