use std::collections::HashMap;

use aws_sdk_dynamodb::Client as DynamoClient;
use lambda_http::{http::StatusCode, Body, Error, Response};

use shopfront_atoms::categories::{self, Category, DEFAULT_CATEGORY_ID};
use shopfront_atoms::products::{self, Product};

use crate::types::{BrowsePage, CategorySection, HomePage, ProductFilter};

pub const PRODUCTS_PER_SLIDE: usize = 3;

/// Category a product files under: unknown and empty ids go to the
/// default bucket.
pub fn category_key(product: &Product) -> &str {
    if product.category.is_empty() {
        DEFAULT_CATEGORY_ID
    } else {
        &product.category
    }
}

/// Chunk a product group into carousel slides.
pub fn slides(products: Vec<Product>) -> Vec<Vec<Product>> {
    products
        .chunks(PRODUCTS_PER_SLIDE)
        .map(|chunk| chunk.to_vec())
        .collect()
}

/// Wrap-around carousel navigation.
pub fn next_slide(current: usize, slide_count: usize) -> usize {
    if slide_count == 0 {
        0
    } else {
        (current + 1) % slide_count
    }
}

pub fn prev_slide(current: usize, slide_count: usize) -> usize {
    if slide_count == 0 {
        0
    } else {
        (current + slide_count - 1) % slide_count
    }
}

/// Group products into per-category home page sections.
///
/// Sections follow the category listing order. Products whose category id
/// no longer exists land in the default bucket, same as uncategorized
/// ones. Categories without products get no section.
pub fn group_by_category(
    products: Vec<Product>,
    categories: Vec<Category>,
) -> Vec<CategorySection> {
    let mut by_category: HashMap<String, Vec<Product>> = HashMap::new();
    for product in products {
        let mut key = category_key(&product).to_string();
        if !categories.iter().any(|c| c.id == key) {
            key = DEFAULT_CATEGORY_ID.to_string();
        }
        by_category.entry(key).or_default().push(product);
    }

    categories
        .into_iter()
        .filter_map(|category| {
            let group = by_category.remove(&category.id)?;
            let slides = slides(group);
            Some(CategorySection {
                slide_count: slides.len(),
                slides,
                category,
            })
        })
        .collect()
}

/// Parse a `min-max` price filter. Either side may be left open; returns
/// None when the field is empty or malformed.
pub fn parse_price_range(raw: &str) -> Option<(Option<i64>, Option<i64>)> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (low, high) = raw.split_once('-')?;
    let bound = |side: &str| -> Result<Option<i64>, ()> {
        let side = side.trim();
        if side.is_empty() {
            return Ok(None);
        }
        side.parse::<i64>().map(Some).map_err(|_| ())
    };
    let min = bound(low).ok()?;
    let max = bound(high).ok()?;
    if min.is_none() && max.is_none() {
        return None;
    }
    Some((min, max))
}

/// Narrow and order a product listing.
pub fn apply_filters(mut products: Vec<Product>, filter: &ProductFilter) -> Vec<Product> {
    let search = filter.search.trim().to_lowercase();
    if !search.is_empty() {
        products.retain(|p| p.name.to_lowercase().contains(&search));
    }
    if !filter.category.is_empty() {
        products.retain(|p| category_key(p) == filter.category);
    }
    if let Some((min, max)) = parse_price_range(&filter.price_range) {
        products.retain(|p| {
            min.map_or(true, |m| p.price >= m) && max.map_or(true, |m| p.price <= m)
        });
    }

    match filter.sort.as_str() {
        "name-asc" => products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase())),
        "name-desc" => products.sort_by(|a, b| b.name.to_lowercase().cmp(&a.name.to_lowercase())),
        "price-asc" => products.sort_by(|a, b| a.price.cmp(&b.price)),
        "price-desc" => products.sort_by(|a, b| b.price.cmp(&a.price)),
        "newest" => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        "oldest" => products.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        _ => {}
    }
    products
}

/// HTTP Handler: GET /catalog/home
pub async fn home_page_handler(
    client: &DynamoClient,
    table_name: &str,
) -> Result<Response<Body>, Error> {
    let (products, categories) = tokio::join!(
        products::list_products(client, table_name),
        categories::list_categories(client, table_name),
    );
    let (products, categories) = match (products, categories) {
        (Ok(products), Ok(categories)) => (products, categories),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to load home page: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?);
        }
    };

    let page = HomePage {
        sections: group_by_category(products, categories),
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&page)?.into())
        .map_err(Box::new)?)
}

/// HTTP Handler: GET /catalog/browse
pub async fn browse_page_handler(
    client: &DynamoClient,
    table_name: &str,
    filter: &ProductFilter,
) -> Result<Response<Body>, Error> {
    let (products, categories) = tokio::join!(
        products::list_products(client, table_name),
        categories::list_categories(client, table_name),
    );
    let (products, categories) = match (products, categories) {
        (Ok(products), Ok(categories)) => (products, categories),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to load browse page: {}", e);
            return Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .header("Content-Type", "application/json")
                .header("Access-Control-Allow-Origin", "*")
                .body(serde_json::json!({"error": e}).to_string().into())
                .map_err(Box::new)?);
        }
    };

    let filtered = apply_filters(products, filter);
    let page = BrowsePage {
        total: filtered.len(),
        products: filtered,
        categories,
    };

    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&page)?.into())
        .map_err(Box::new)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(name: &str, category: &str, price: i64, created_at: &str) -> Product {
        Product {
            id: format!("id-{}", name),
            name: name.to_string(),
            category: category.to_string(),
            price,
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
            created_at: created_at.to_string(),
            updated_at: String::new(),
        }
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            is_default: false,
            created_at: String::new(),
            created_by: String::new(),
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn seven_products_make_three_slides() {
        let products = (0..7)
            .map(|i| product(&format!("p{}", i), "tea", 10, ""))
            .collect();
        let slides = slides(products);
        assert_eq!(slides.len(), 3);
        assert_eq!(slides[0].len(), 3);
        assert_eq!(slides[2].len(), 1);
    }

    #[test]
    fn slide_navigation_wraps_both_ways() {
        assert_eq!(next_slide(2, 3), 0);
        assert_eq!(next_slide(0, 3), 1);
        assert_eq!(prev_slide(0, 3), 2);
        assert_eq!(prev_slide(2, 3), 1);
        assert_eq!(next_slide(0, 0), 0);
        assert_eq!(prev_slide(0, 0), 0);
    }

    #[test]
    fn groups_products_under_their_categories() {
        let categories = vec![
            category("tea", "Tea"),
            category("pots", "Pots"),
            Category::default_bucket(),
        ];
        let products = vec![
            product("sencha", "tea", 12, ""),
            product("kyusu", "pots", 80, ""),
            product("gift card", "", 25, ""),
            product("mystery", "deleted-category", 5, ""),
        ];

        let sections = group_by_category(products, categories);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].category.id, "tea");
        assert_eq!(names(&sections[0].slides[0]), vec!["sencha"]);
        // uncategorized and orphaned products share the default bucket
        assert_eq!(sections[2].category.id, DEFAULT_CATEGORY_ID);
        assert_eq!(names(&sections[2].slides[0]), vec!["gift card", "mystery"]);
    }

    #[test]
    fn categories_without_products_get_no_section() {
        let categories = vec![category("tea", "Tea"), Category::default_bucket()];
        let sections = group_by_category(vec![product("sencha", "tea", 12, "")], categories);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].category.id, "tea");
    }

    #[test]
    fn price_range_parsing() {
        assert_eq!(parse_price_range("10-50"), Some((Some(10), Some(50))));
        assert_eq!(parse_price_range("100-"), Some((Some(100), None)));
        assert_eq!(parse_price_range("-500"), Some((None, Some(500))));
        assert_eq!(parse_price_range(""), None);
        assert_eq!(parse_price_range("-"), None);
        assert_eq!(parse_price_range("cheap-50"), None);
        assert_eq!(parse_price_range("50"), None);
    }

    #[test]
    fn search_filters_by_name_substring() {
        let products = vec![
            product("Sencha Green", "tea", 12, ""),
            product("Matcha", "tea", 20, ""),
        ];
        let filter = ProductFilter {
            search: "sencha".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(products, &filter)), vec!["Sencha Green"]);
    }

    #[test]
    fn category_filter_includes_uncategorized_under_default() {
        let products = vec![
            product("sencha", "tea", 12, ""),
            product("gift card", "", 25, ""),
        ];
        let filter = ProductFilter {
            category: DEFAULT_CATEGORY_ID.to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(products, &filter)), vec!["gift card"]);
    }

    #[test]
    fn price_filter_bounds_are_inclusive() {
        let products = vec![
            product("a", "tea", 10, ""),
            product("b", "tea", 50, ""),
            product("c", "tea", 51, ""),
        ];
        let filter = ProductFilter {
            price_range: "10-50".to_string(),
            ..Default::default()
        };
        assert_eq!(names(&apply_filters(products, &filter)), vec!["a", "b"]);
    }

    #[test]
    fn sorts_cover_name_price_and_age() {
        let products = || {
            vec![
                product("banana", "tea", 30, "2024-02-01T00:00:00Z"),
                product("Apple", "tea", 10, "2024-03-01T00:00:00Z"),
                product("cherry", "tea", 20, "2024-01-01T00:00:00Z"),
            ]
        };
        let sorted = |sort: &str| {
            let filter = ProductFilter {
                sort: sort.to_string(),
                ..Default::default()
            };
            apply_filters(products(), &filter)
        };

        assert_eq!(names(&sorted("name-asc")), vec!["Apple", "banana", "cherry"]);
        assert_eq!(names(&sorted("name-desc")), vec!["cherry", "banana", "Apple"]);
        assert_eq!(names(&sorted("price-asc")), vec!["Apple", "cherry", "banana"]);
        assert_eq!(names(&sorted("price-desc")), vec!["banana", "cherry", "Apple"]);
        assert_eq!(names(&sorted("newest")), vec!["Apple", "banana", "cherry"]);
        assert_eq!(names(&sorted("oldest")), vec!["cherry", "banana", "Apple"]);
        // unknown sort keeps listing order
        assert_eq!(names(&sorted("")), vec!["banana", "Apple", "cherry"]);
    }
}
